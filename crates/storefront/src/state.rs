//! Storefront state shared by every operation.

use std::sync::Arc;

use tracing::instrument;

use crate::browse::BrowseSession;
use crate::cart::CartStore;
use crate::catalog::{Catalog, CatalogError};
use crate::checkout::Checkout;
use crate::config::StorefrontConfig;
use crate::storage::{CartStorage, FileStorage};

/// Loaded catalog plus configuration.
///
/// This struct is cheaply cloneable via `Arc` and hands out the per-use
/// pieces (cart, browse session, checkout) already configured.
#[derive(Debug, Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

#[derive(Debug)]
struct StorefrontInner {
    config: StorefrontConfig,
    catalog: Arc<Catalog>,
}

impl Storefront {
    /// Create storefront state around an already loaded catalog.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(StorefrontInner {
                config,
                catalog: Arc::new(catalog),
            }),
        }
    }

    /// Load the catalog named by `config`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the catalog file cannot be read or parsed.
    #[instrument(skip_all)]
    pub fn load(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let catalog = Catalog::load(&config.catalog_path)?;
        Ok(Self::new(config, catalog))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Cart persisted under the configured directory and key.
    #[must_use]
    pub fn cart(&self) -> CartStore<FileStorage> {
        self.cart_with(FileStorage::new(self.inner.config.cart_dir.clone()))
    }

    /// Cart persisted in `storage`, using the configured key and shipping.
    #[must_use]
    pub fn cart_with<S: CartStorage>(&self, storage: S) -> CartStore<S> {
        CartStore::new(storage, Arc::clone(&self.inner.catalog))
            .with_key(self.inner.config.cart_key.clone())
            .with_shipping(self.inner.config.shipping)
    }

    /// Empty browse session using the configured page size.
    #[must_use]
    pub fn browse(&self) -> BrowseSession {
        BrowseSession::new(self.inner.config.page_size)
    }

    /// Browse session showing one category, if it exists.
    #[must_use]
    pub fn browse_category(&self, name: &str) -> Option<BrowseSession> {
        let products = self.catalog().category(name)?;
        Some(BrowseSession::with_collection(
            products.iter().cloned(),
            self.inner.config.page_size,
        ))
    }

    /// Browse session showing every search match.
    #[must_use]
    pub fn browse_search(&self, term: &str) -> BrowseSession {
        BrowseSession::with_collection(
            self.catalog().search_all(term).into_iter().cloned(),
            self.inner.config.page_size,
        )
    }

    /// Checkout using the configured hand-off settings.
    #[must_use]
    pub fn checkout(&self) -> Checkout {
        Checkout::new(self.inner.config.checkout.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroUsize;

    use aioko_core::ProductId;

    use super::*;
    use crate::storage::MemoryStorage;

    fn storefront() -> Storefront {
        let json = r#"{
            "lace": [
                {"id": "l1", "name": "Gold Lace", "price": 20000},
                {"id": "l2", "name": "Red Lace", "price": 15000},
                {"id": "l3", "name": "Blue Lace", "price": 18000}
            ],
            "ankara": [
                {"id": "a1", "name": "Blue Ankara", "price": 4000}
            ]
        }"#;
        let config = StorefrontConfig {
            cart_key: "test-cart".to_owned(),
            page_size: NonZeroUsize::new(2).unwrap(),
            ..StorefrontConfig::default()
        };
        Storefront::new(config, Catalog::from_json_str(json).unwrap())
    }

    #[test]
    fn test_cart_uses_configured_key() {
        let store = storefront();
        let mut cart = store.cart_with(MemoryStorage::new());
        cart.add(&ProductId::new("a1")).unwrap();

        assert_eq!(cart.key(), "test-cart");
        assert!(cart.storage().get_item("test-cart").unwrap().is_some());
    }

    #[test]
    fn test_browse_category_uses_page_size() {
        let store = storefront();
        let mut session = store.browse_category("lace").unwrap();

        assert_eq!(session.next_page().len(), 2);
        assert_eq!(session.next_page().len(), 1);
        assert!(store.browse_category("missing").is_none());
    }

    #[test]
    fn test_browse_search_spans_categories() {
        let session = storefront().browse_search("blue");
        assert_eq!(session.total_count(), 2);
    }

    #[test]
    fn test_load_missing_catalog() {
        let config = StorefrontConfig {
            catalog_path: "does/not/exist.json".into(),
            ..StorefrontConfig::default()
        };
        assert!(matches!(
            Storefront::load(config).unwrap_err(),
            CatalogError::Io(_)
        ));
    }
}
