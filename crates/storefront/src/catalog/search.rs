//! Substring search across the whole catalog.

use super::{Catalog, Product};

/// Shortest term that triggers a search.
pub const MIN_SEARCH_LENGTH: usize = 2;

/// Cap on results returned for the search dropdown.
pub const MAX_SEARCH_RESULTS: usize = 10;

impl Catalog {
    /// Quick search for the header dropdown.
    ///
    /// Returns at most [`MAX_SEARCH_RESULTS`] products in catalog order.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&Product> {
        self.search_all(term).into_iter().take(MAX_SEARCH_RESULTS).collect()
    }

    /// Every product matching `term`, used to scope a browse session.
    ///
    /// The term is trimmed and lowercased; anything shorter than
    /// [`MIN_SEARCH_LENGTH`] matches nothing. A product matches when its
    /// name, category, or description contains the term.
    #[must_use]
    pub fn search_all(&self, term: &str) -> Vec<&Product> {
        let term = term.trim().to_lowercase();
        if term.chars().count() < MIN_SEARCH_LENGTH {
            return Vec::new();
        }

        self.all_products()
            .filter(|product| matches_term(product, &term))
            .collect()
    }
}

fn matches_term(product: &Product, term: &str) -> bool {
    [&product.name, &product.category, &product.description]
        .iter()
        .any(|field| field.to_lowercase().contains(term))
}
