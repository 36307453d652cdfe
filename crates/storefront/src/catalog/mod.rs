//! Static product catalog.
//!
//! The catalog is supplied as a JSON object mapping a category name to an
//! array of product records. Document order is preserved so listings and
//! search results follow the order the merchandiser wrote them in.
//!
//! The reserved `featured` key holds display copies of products promoted on
//! the store landing page. It is not a category: featured records are not
//! part of the id-uniqueness check and are never returned by [`Catalog::find`].

mod search;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use aioko_core::ProductId;
use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

pub use search::{MAX_SEARCH_RESULTS, MIN_SEARCH_LENGTH};

/// Size shown and stored when a product does not declare one.
pub const DEFAULT_SIZE: &str = "Standard";

/// Catalog key holding the featured-products list.
pub const FEATURED_KEY: &str = "featured";

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog document is not valid JSON or a product record is malformed.
    #[error("Invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two products across the catalog share an id.
    #[error("Duplicate product id: {0}")]
    DuplicateProductId(ProductId),

    /// A product has a price below zero.
    #[error("Negative price for product {0}")]
    NegativePrice(ProductId),
}

/// A product record as supplied by the catalog data.
///
/// Color information may arrive in one of three shapes (`colorTags`,
/// `colors`, or a separator-delimited `color` string) or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub color_tags: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub colors: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
}

// Color fields come from hand-edited data. A value of the wrong shape is
// treated as absent so extraction falls through to the next source.

fn lenient_string_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl Product {
    /// Declared size, or [`DEFAULT_SIZE`] when absent.
    #[must_use]
    pub fn size_or_default(&self) -> &str {
        self.size.as_deref().unwrap_or(DEFAULT_SIZE)
    }
}

/// A named collection of products.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub products: Vec<Product>,
}

/// The full product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    featured: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from `(category, products)` collections.
    ///
    /// A collection named [`FEATURED_KEY`] becomes the featured list. Every
    /// other product gets its `category` set to the collection name.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateProductId` if an id appears twice
    /// across categories, or `CatalogError::NegativePrice` for a price below
    /// zero.
    pub fn new(
        collections: impl IntoIterator<Item = (String, Vec<Product>)>,
    ) -> Result<Self, CatalogError> {
        let mut categories = Vec::new();
        let mut featured = Vec::new();
        let mut seen = HashSet::new();

        for (name, mut products) in collections {
            if name == FEATURED_KEY {
                featured = products;
                continue;
            }

            for product in &mut products {
                if !seen.insert(product.id.clone()) {
                    return Err(CatalogError::DuplicateProductId(product.id.clone()));
                }
                if product.price.is_sign_negative() && !product.price.is_zero() {
                    return Err(CatalogError::NegativePrice(product.id.clone()));
                }
                product.category.clone_from(&name);
            }

            categories.push(Category { name, products });
        }

        Ok(Self {
            categories,
            featured,
        })
    }

    /// Parse a catalog from its JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        Self::new(raw.0)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!(
            categories = catalog.categories.len(),
            products = catalog.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// All categories in document order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Products in a single category.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&[Product]> {
        self.categories
            .iter()
            .find(|category| category.name == name)
            .map(|category| category.products.as_slice())
    }

    /// Every product across all categories, in document order.
    pub fn all_products(&self) -> impl Iterator<Item = &Product> {
        self.categories
            .iter()
            .flat_map(|category| category.products.iter())
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.all_products().find(|product| &product.id == id)
    }

    /// Featured products for the landing page.
    #[must_use]
    pub fn featured(&self) -> &[Product] {
        &self.featured
    }

    /// Total number of products across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.products.len())
            .sum()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Catalog document in key order; non-array values are skipped.
struct RawCatalog(Vec<(String, Vec<Product>)>);

impl<'de> Deserialize<'de> for RawCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawCatalogVisitor)
    }
}

struct RawCatalogVisitor;

impl<'de> Visitor<'de> for RawCatalogVisitor {
    type Value = RawCatalog;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping category names to product arrays")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut collections = Vec::new();
        while let Some((name, value)) = map.next_entry::<String, Value>()? {
            if !value.is_array() {
                tracing::debug!(key = %name, "Skipping non-collection catalog entry");
                continue;
            }
            let products: Vec<Product> =
                serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            collections.push((name, products));
        }
        Ok(RawCatalog(collections))
    }
}
