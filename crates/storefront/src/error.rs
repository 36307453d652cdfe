//! Unified error handling.
//!
//! Each module owns its error enum. `StoreError` wraps them so callers
//! driving several operations can use a single `Result<T>`, and maps each
//! failure onto the short notice shown to the shopper.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Notice shown when a product id cannot be resolved.
pub const PRODUCT_NOT_FOUND_NOTICE: &str = "Product not found!";

/// Notice shown when checkout is attempted with an empty cart.
pub const EMPTY_CART_NOTICE: &str = "Your cart is empty!";

/// Notice shown after a product is added to the cart.
pub const ADDED_TO_CART_NOTICE: &str = "Added to cart!";

/// Notice shown after a line is removed from the cart.
pub const REMOVED_FROM_CART_NOTICE: &str = "Removed from cart";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout could not be prepared.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Configuration was invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persistent storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// User-facing notice for this error.
    ///
    /// Internal details are not exposed; storage and catalog failures map
    /// to a generic message.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Cart(CartError::ProductNotFound(_)) => PRODUCT_NOT_FOUND_NOTICE.to_owned(),
            Self::Checkout(CheckoutError::EmptyCartCheckout) => EMPTY_CART_NOTICE.to_owned(),
            Self::Cart(CartError::Storage(_) | CartError::Encode(_)) | Self::Storage(_) => {
                "Your cart could not be saved".to_owned()
            }
            Self::Cart(CartError::AmountOverflow(_)) => "That quantity is too large".to_owned(),
            Self::Cart(CartError::MalformedPersistedState(_)) => {
                "Your saved cart could not be read".to_owned()
            }
            Self::Catalog(_) => "Products are unavailable right now".to_owned(),
            Self::Checkout(CheckoutError::InvalidLink(_)) => {
                "Checkout is unavailable right now".to_owned()
            }
            Self::Config(err) => err.to_string(),
        }
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
