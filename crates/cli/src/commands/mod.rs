//! CLI command implementations.

pub mod cart;
pub mod catalog;

use aioko_core::format_price;
use aioko_storefront::catalog::Product;

/// One listing row: id, name, size and price.
fn product_row(product: &Product) -> String {
    format!(
        "{:<16} {:<36} {:<10} {:>12}",
        product.id.as_str(),
        product.name,
        product.size_or_default(),
        format_price(product.price)
    )
}
