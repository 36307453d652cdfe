//! Cart and checkout commands.
//!
//! The cart is persisted between invocations under `AIOKO_CART_DIR`.

#![allow(clippy::print_stdout)]

use aioko_core::{ProductId, format_price};
use aioko_storefront::cart::CartLine;
use aioko_storefront::error::{
    ADDED_TO_CART_NOTICE, EMPTY_CART_NOTICE, REMOVED_FROM_CART_NOTICE, Result,
};
use aioko_storefront::state::Storefront;

fn print_line(line: &CartLine) {
    println!(
        "{:>3}x {:<36} {:<10} {:>12}",
        line.quantity,
        line.name,
        line.size,
        format_price(line.line_total())
    );
}

/// Print cart lines and totals.
pub fn show(store: &Storefront) {
    let summary = store.cart().summary();
    if summary.is_empty() {
        println!("{EMPTY_CART_NOTICE}");
        return;
    }

    for line in &summary.lines {
        print_line(line);
    }
    println!();
    println!("Items:    {}", summary.item_count);
    println!("Subtotal: {}", format_price(summary.subtotal));
    if summary.ships_free() {
        println!("Shipping: Free");
    } else {
        println!("Shipping: {}", format_price(summary.shipping));
    }
    println!("Total:    {}", format_price(summary.total));
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the product is unknown or the cart cannot be saved.
pub fn add(store: &Storefront, id: &str) -> Result<()> {
    let line = store.cart().add(&ProductId::new(id))?;
    println!("{ADDED_TO_CART_NOTICE}");
    print_line(&line);
    Ok(())
}

/// Remove a product's line.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn remove(store: &Storefront, id: &str) -> Result<()> {
    if store.cart().remove(&ProductId::new(id))? {
        println!("{REMOVED_FROM_CART_NOTICE}");
    } else {
        println!("{id} is not in the cart");
    }
    Ok(())
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn set(store: &Storefront, id: &str, quantity: i64) -> Result<()> {
    match store.cart().set_quantity(&ProductId::new(id), quantity)? {
        Some(line) => print_line(&line),
        None if quantity < 1 => println!("{REMOVED_FROM_CART_NOTICE}"),
        None => println!("{id} is not in the cart"),
    }
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn clear(store: &Storefront) -> Result<()> {
    store.cart().clear()?;
    println!("Cart cleared");
    Ok(())
}

/// Print the order message and the link that opens it.
///
/// # Errors
///
/// Returns an error if the cart is empty or the link cannot be built.
pub fn checkout(store: &Storefront) -> Result<()> {
    let handoff = store.checkout().begin(&store.cart())?;
    println!("{}", handoff.message);
    println!();
    println!("{}", handoff.url);
    Ok(())
}
