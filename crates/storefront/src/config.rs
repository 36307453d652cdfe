//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `AIOKO_CATALOG_PATH` - Catalog JSON file (default: data/products.json)
//! - `AIOKO_CART_DIR` - Directory the cart file is written to (default: .aioko)
//! - `AIOKO_CART_KEY` - Storage key for the cart (default: aioko-cart)
//! - `AIOKO_FREE_SHIPPING_OVER` - Subtotal above which shipping is free (default: 50000)
//! - `AIOKO_SHIPPING_FEE` - Flat shipping fee (default: 2000)
//! - `AIOKO_PAGE_SIZE` - Products per page when browsing (default: 12)
//! - `AIOKO_WHATSAPP_NUMBER` - Number orders are sent to, digits only
//! - `AIOKO_ORDER_GREETING` - Paragraph placed before the order lines
//! - `AIOKO_ORDER_SIGN_OFF` - Paragraph placed after the order total

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::browse::DEFAULT_PAGE_SIZE;
use crate::cart::{DEFAULT_CART_KEY, ShippingPolicy};
use crate::checkout::{CheckoutConfig, DEFAULT_WHATSAPP_NUMBER};

const DEFAULT_CATALOG_PATH: &str = "data/products.json";
const DEFAULT_CART_DIR: &str = ".aioko";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog JSON file
    pub catalog_path: PathBuf,
    /// Directory holding persisted client state
    pub cart_dir: PathBuf,
    /// Storage key for the cart
    pub cart_key: String,
    /// Shipping threshold and fee
    pub shipping: ShippingPolicy,
    /// Products per page when browsing
    pub page_size: NonZeroUsize,
    /// Checkout hand-off settings
    pub checkout: CheckoutConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            cart_dir: PathBuf::from(DEFAULT_CART_DIR),
            cart_key: DEFAULT_CART_KEY.to_owned(),
            shipping: ShippingPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            checkout: CheckoutConfig::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);
        let defaults = ShippingPolicy::default();

        let free_shipping_over =
            env.parsed("AIOKO_FREE_SHIPPING_OVER", defaults.free_shipping_over)?;
        let flat_fee = env.parsed("AIOKO_SHIPPING_FEE", defaults.flat_fee)?;
        validate_amount("AIOKO_FREE_SHIPPING_OVER", free_shipping_over)?;
        validate_amount("AIOKO_SHIPPING_FEE", flat_fee)?;

        let whatsapp_number = env.or_default("AIOKO_WHATSAPP_NUMBER", DEFAULT_WHATSAPP_NUMBER);
        validate_phone_number("AIOKO_WHATSAPP_NUMBER", &whatsapp_number)?;

        Ok(Self {
            catalog_path: PathBuf::from(env.or_default("AIOKO_CATALOG_PATH", DEFAULT_CATALOG_PATH)),
            cart_dir: PathBuf::from(env.or_default("AIOKO_CART_DIR", DEFAULT_CART_DIR)),
            cart_key: env.or_default("AIOKO_CART_KEY", DEFAULT_CART_KEY),
            shipping: ShippingPolicy::new(free_shipping_over, flat_fee),
            page_size: env.parsed("AIOKO_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            checkout: CheckoutConfig {
                whatsapp_number,
                greeting: env.optional("AIOKO_ORDER_GREETING"),
                sign_off: env.optional("AIOKO_ORDER_SIGN_OFF"),
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_owned())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
        })
    }
}

fn validate_amount(key: &str, amount: Decimal) -> Result<(), ConfigError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            "must not be negative".to_owned(),
        ));
    }
    Ok(())
}

fn validate_phone_number(key: &str, number: &str) -> Result<(), ConfigError> {
    if !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            "must contain digits only (international format without '+')".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.cart_key, DEFAULT_CART_KEY);
        assert_eq!(config.shipping, ShippingPolicy::default());
        assert_eq!(config.page_size.get(), 12);
        assert_eq!(config.checkout, CheckoutConfig::default());
        assert_eq!(config.catalog_path, PathBuf::from(DEFAULT_CATALOG_PATH));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("AIOKO_CART_KEY", "test-cart"),
            ("AIOKO_FREE_SHIPPING_OVER", "75000"),
            ("AIOKO_SHIPPING_FEE", " 3500 "),
            ("AIOKO_PAGE_SIZE", "24"),
            ("AIOKO_WHATSAPP_NUMBER", "2348000000000"),
            ("AIOKO_ORDER_GREETING", "New order"),
        ])
        .unwrap();

        assert_eq!(config.cart_key, "test-cart");
        assert_eq!(config.shipping.free_shipping_over, Decimal::new(75_000, 0));
        assert_eq!(config.shipping.flat_fee, Decimal::new(3_500, 0));
        assert_eq!(config.page_size.get(), 24);
        assert_eq!(config.checkout.whatsapp_number, "2348000000000");
        assert_eq!(config.checkout.greeting.as_deref(), Some("New order"));
        assert!(config.checkout.sign_off.is_none());
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("AIOKO_CART_KEY", "  "), ("AIOKO_ORDER_SIGN_OFF", "")]).unwrap();
        assert_eq!(config.cart_key, DEFAULT_CART_KEY);
        assert!(config.checkout.sign_off.is_none());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = load(&[("AIOKO_PAGE_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "AIOKO_PAGE_SIZE"));
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        assert!(load(&[("AIOKO_SHIPPING_FEE", "two thousand")]).is_err());
        assert!(load(&[("AIOKO_FREE_SHIPPING_OVER", "-1")]).is_err());
    }

    #[test]
    fn test_phone_number_must_be_digits() {
        assert!(load(&[("AIOKO_WHATSAPP_NUMBER", "+234 906")]).is_err());
    }
}
