//! Filter, sort, and paginate one catalog view.
//!
//! A [`BrowseSession`] is created per catalog view and handed to whatever
//! renders it. Each user intent (pick a category, pick a color, change the
//! sort, scroll near the bottom) maps onto one method. Pages are handed out
//! incrementally for infinite scroll; asking for a page past the end returns
//! an empty page and changes nothing, so repeated scroll triggers are safe.

use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::catalog::Product;
use crate::colors::{self, ALL_FACET_ID, ColorFacet};

/// Products handed out per page.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(12).expect("non-zero page size");

/// Product ordering choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Alphabetical by name, ignoring case.
    #[default]
    Name,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
}

impl SortKey {
    /// The value used by the sort selector.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Name => compare_names(&a.name, &b.name),
            Self::PriceLow => a.price.cmp(&b.price),
            Self::PriceHigh => b.price.cmp(&a.price),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised sort selector value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key: {0} (expected name, price-low or price-high)")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            other => Err(ParseSortKeyError(other.to_owned())),
        }
    }
}

/// Case-insensitive name order, falling back to exact order for ties.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// State for one catalog view.
#[derive(Debug, Clone)]
pub struct BrowseSession {
    source: Vec<Arc<Product>>,
    visible: Vec<Arc<Product>>,
    active_facet: String,
    sort: Option<SortKey>,
    page_size: NonZeroUsize,
    pages_loaded: usize,
}

impl Default for BrowseSession {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl BrowseSession {
    /// Create an empty session.
    #[must_use]
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            source: Vec::new(),
            visible: Vec::new(),
            active_facet: ALL_FACET_ID.to_owned(),
            sort: None,
            page_size,
            pages_loaded: 0,
        }
    }

    /// Create a session already showing `collection`.
    #[must_use]
    pub fn with_collection(
        collection: impl IntoIterator<Item = Product>,
        page_size: NonZeroUsize,
    ) -> Self {
        let mut session = Self::new(page_size);
        session.set_category(collection);
        session
    }

    /// Switch to a new source collection (a category or search results).
    ///
    /// Resets the color filter to `all`, clears any chosen sort and starts
    /// again from the first page, showing the collection in its own order.
    #[instrument(skip_all)]
    pub fn set_category(&mut self, collection: impl IntoIterator<Item = Product>) {
        self.source = collection.into_iter().map(Arc::new).collect();
        self.visible.clone_from(&self.source);
        ALL_FACET_ID.clone_into(&mut self.active_facet);
        self.sort = None;
        self.pages_loaded = 0;
        tracing::debug!(products = self.source.len(), "Browse collection set");
    }

    /// Filter the source collection by a color facet and restart paging.
    ///
    /// A previously chosen sort is applied to the new result. A facet with
    /// no matches yields an empty view.
    #[instrument(skip(self))]
    pub fn set_facet(&mut self, facet_id: &str) {
        facet_id.clone_into(&mut self.active_facet);
        self.visible = self
            .source
            .iter()
            .filter(|product| colors::matches(product, facet_id))
            .cloned()
            .collect();
        self.apply_sort();
        self.pages_loaded = 0;
        tracing::debug!(visible = self.visible.len(), "Color filter applied");
    }

    /// Reorder the filtered products and restart paging.
    #[instrument(skip(self))]
    pub fn set_sort(&mut self, key: SortKey) {
        self.sort = Some(key);
        self.apply_sort();
        self.pages_loaded = 0;
    }

    fn apply_sort(&mut self) {
        if let Some(key) = self.sort {
            // Stable: equal keys keep their filtered order.
            self.visible.sort_by(|a, b| key.compare(a, b));
        }
    }

    /// Hand out the next page, or an empty page once everything is shown.
    pub fn next_page(&mut self) -> Vec<&Product> {
        let size = self.page_size.get();
        let start = self.pages_loaded.saturating_mul(size);
        if start >= self.visible.len() {
            tracing::trace!(start, "No more products to load");
            return Vec::new();
        }

        self.pages_loaded += 1;
        self.visible
            .iter()
            .skip(start)
            .take(size)
            .map(|product| &**product)
            .collect()
    }

    /// Products handed out so far ("showing N").
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible
            .len()
            .min(self.pages_loaded.saturating_mul(self.page_size.get()))
    }

    /// Products matching the current filter ("of M").
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.visible.len()
    }

    /// Products in the source collection before filtering.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.source.len()
    }

    /// Whether another call to [`Self::next_page`] would return products.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.visible_count() < self.total_count()
    }

    /// Color facets for the source collection.
    #[must_use]
    pub fn facets(&self) -> Vec<ColorFacet> {
        colors::derive_facets(self.source.iter().map(|product| &**product))
    }

    /// Currently selected color facet id.
    #[must_use]
    pub fn active_facet(&self) -> &str {
        &self.active_facet
    }

    /// Ordering in effect; [`SortKey::Name`] until one is chosen.
    #[must_use]
    pub fn sort_key(&self) -> SortKey {
        self.sort.unwrap_or_default()
    }

    /// Products per page.
    #[must_use]
    pub const fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Pages handed out since the last reset.
    #[must_use]
    pub const fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }
}
