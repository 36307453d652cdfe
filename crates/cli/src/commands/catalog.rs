//! Catalog commands: categories, facets, browse, search and featured.

#![allow(clippy::print_stdout)]

use aioko_storefront::browse::{BrowseSession, SortKey};
use aioko_storefront::catalog::{MIN_SEARCH_LENGTH, Product};
use aioko_storefront::colors;
use aioko_storefront::state::Storefront;

use super::product_row;
use crate::CliError;

/// Options for the `browse` command.
pub struct BrowseArgs {
    pub category: Option<String>,
    pub search: Option<String>,
    pub color: Option<String>,
    pub sort: Option<SortKey>,
    pub pages: usize,
}

/// List categories with their product counts.
pub fn categories(store: &Storefront) {
    for category in store.catalog().categories() {
        println!("{:<20} {:>4} products", category.name, category.products.len());
    }
    let featured = store.catalog().featured().len();
    if featured > 0 {
        println!("{:<20} {featured:>4} products", "(featured)");
    }
}

/// List color facets for a category, or for the whole catalog.
///
/// # Errors
///
/// Returns `CliError::UnknownCategory` if the category does not exist.
pub fn facets(store: &Storefront, category: Option<&str>) -> Result<(), CliError> {
    let facets = match category {
        Some(name) => colors::derive_facets(category_products(store, name)?),
        None => colors::derive_facets(store.catalog().all_products()),
    };

    for facet in facets {
        println!(
            "{:<20} {:<24} {:>4}  {}",
            facet.id,
            facet.display_name,
            facet.count,
            facet.swatch()
        );
    }
    Ok(())
}

/// Filter, sort and print one or more pages of products.
///
/// # Errors
///
/// Returns `CliError::UnknownCategory` if the category does not exist.
pub fn browse(store: &Storefront, args: &BrowseArgs) -> Result<(), CliError> {
    let mut session = open_session(store, args)?;

    if let Some(color) = &args.color {
        session.set_facet(color);
    }
    if let Some(sort) = args.sort {
        session.set_sort(sort);
    }

    for _ in 0..args.pages {
        let page = session.next_page();
        if page.is_empty() {
            break;
        }
        for product in page {
            println!("{}", product_row(product));
        }
    }

    if session.total_count() == 0 {
        println!("No products found");
    }
    println!(
        "Showing {} of {} (color: {}, sort: {})",
        session.visible_count(),
        session.total_count(),
        session.active_facet(),
        session.sort_key()
    );
    if session.has_more() {
        println!("More available: --pages {}", session.pages_loaded() + 1);
    }
    Ok(())
}

/// Quick search, capped like the header dropdown.
pub fn search(store: &Storefront, term: &str) {
    if term.trim().chars().count() < MIN_SEARCH_LENGTH {
        println!("Type at least {MIN_SEARCH_LENGTH} characters to search");
        return;
    }

    let results = store.catalog().search(term);
    if results.is_empty() {
        println!("No products found");
        return;
    }
    for product in results {
        println!("{:<12} {}", product.category, product_row(product));
    }
}

/// List featured products.
pub fn featured(store: &Storefront) {
    for product in store.catalog().featured() {
        println!("{}", product_row(product));
    }
}

fn category_products<'a>(store: &'a Storefront, name: &str) -> Result<&'a [Product], CliError> {
    store
        .catalog()
        .category(name)
        .ok_or_else(|| CliError::UnknownCategory(name.to_owned()))
}

fn open_session(store: &Storefront, args: &BrowseArgs) -> Result<BrowseSession, CliError> {
    if let Some(name) = &args.category {
        return store
            .browse_category(name)
            .ok_or_else(|| CliError::UnknownCategory(name.clone()));
    }
    if let Some(term) = &args.search {
        return Ok(store.browse_search(term));
    }

    let mut session = store.browse();
    session.set_category(store.catalog().all_products().cloned());
    Ok(session)
}
