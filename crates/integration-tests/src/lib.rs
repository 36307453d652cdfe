//! Integration tests for the Ai-oko storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aioko-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `browse_flow` - Category, color filter, sort and paging together
//! - `cart_flow` - File-backed cart, shipping and checkout hand-off
//!
//! Every test writes its catalog and cart into a fresh temporary directory.

use std::path::{Path, PathBuf};

use aioko_storefront::config::StorefrontConfig;
use aioko_storefront::state::Storefront;
use tempfile::TempDir;

/// Fourteen lace products (one page and a bit), three ankara, one featured.
///
/// Lace color facets: blue 3, blue & white 3, gold 2, other 2, and one each
/// of blue & navy, purple, red and white.
pub const SAMPLE_CATALOG: &str = r#"{
    "featured": [
        {"id": "l02", "name": "Cord Lace", "price": 40000, "colors": ["Gold"]}
    ],
    "lace": [
        {"id": "l01", "name": "Royal Lace", "price": 25000, "colorTags": ["Blue"]},
        {"id": "l02", "name": "Cord Lace", "price": 40000, "colors": ["Gold"], "size": "5 yards"},
        {"id": "l03", "name": "Swiss Lace", "price": 30000, "color": "Blue & White"},
        {"id": "l04", "name": "Voile Lace", "price": 18000, "color": "White / Blue"},
        {"id": "l05", "name": "Beaded Lace", "price": 52000, "colorTags": ["Red"]},
        {"id": "l06", "name": "Sequin Lace", "price": 22000},
        {"id": "l07", "name": "Guipure Lace", "price": 27000, "colorTags": ["Blue"]},
        {"id": "l08", "name": "Net Lace", "price": 15000, "colorTags": ["Gold"]},
        {"id": "l09", "name": "Tulle Lace", "price": 16000},
        {"id": "l10", "name": "Chantilly Lace", "price": 33000, "colorTags": ["Blue"]},
        {"id": "l11", "name": "Dry Lace", "price": 21000, "colors": ["Purple"]},
        {"id": "l12", "name": "Corded Lace", "price": 29000, "color": "blue,white"},
        {"id": "l13", "name": "Bridal Lace", "price": 45000, "colorTags": ["White"]},
        {"id": "l14", "name": "Navy Blue Lace", "price": 19000}
    ],
    "ankara": [
        {"id": "a01", "name": "Green Ankara", "price": 4500},
        {"id": "a02", "name": "Blue Ankara", "price": 4000, "description": "Bold print, six yards"},
        {"id": "a03", "name": "Kente Print", "price": 6000, "colorTags": ["Orange", "Black"]}
    ]
}"#;

/// A temporary storefront: catalog file and cart directory under one `TempDir`.
pub struct TestStore {
    pub store: Storefront,
    dir: TempDir,
}

impl TestStore {
    /// Storefront over [`SAMPLE_CATALOG`] with default settings.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or catalog cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(SAMPLE_CATALOG)
    }

    /// Storefront over the given catalog JSON.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or catalog cannot be created.
    #[must_use]
    pub fn with_catalog(json: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let catalog_path = write_catalog(dir.path(), json);
        let config = StorefrontConfig {
            catalog_path,
            cart_dir: dir.path().join("state"),
            ..StorefrontConfig::default()
        };
        let store = Storefront::load(config).expect("Failed to load test catalog");
        Self { store, dir }
    }

    /// Reload the storefront with a different catalog, keeping the cart directory.
    ///
    /// # Panics
    ///
    /// Panics if the catalog cannot be written or loaded.
    #[must_use]
    pub fn reload_with(&self, json: &str) -> Storefront {
        let catalog_path = write_catalog(self.dir.path(), json);
        let config = StorefrontConfig {
            catalog_path,
            ..self.store.config().clone()
        };
        Storefront::load(config).expect("Failed to reload test catalog")
    }

    /// Directory the cart is persisted into.
    #[must_use]
    pub fn cart_dir(&self) -> &Path {
        &self.store.config().cart_dir
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

fn write_catalog(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("products.json");
    std::fs::write(&path, json).expect("Failed to write test catalog");
    path
}
