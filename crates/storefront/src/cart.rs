//! Shopping cart persisted in local storage.
//!
//! The whole cart is stored as one JSON array under a single key and is
//! rewritten in full after every mutation. Reads never fail: an absent,
//! unreadable, or malformed value is an empty cart.
//!
//! Line prices are captured from the catalog when a product is first added
//! and are not refreshed if the catalog price later changes.

use std::collections::HashSet;
use std::sync::Arc;

use aioko_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::catalog::{Catalog, DEFAULT_SIZE, Product};
use crate::storage::{CartStorage, StorageError};

/// Storage key the cart is persisted under.
pub const DEFAULT_CART_KEY: &str = "aioko-cart";

/// Cart operation errors.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The persisted cart could not be decoded.
    ///
    /// Recovered internally as an empty cart; never returned from a public
    /// operation.
    #[error("Malformed persisted cart: {0}")]
    MalformedPersistedState(String),

    /// The change would push the cart total past what can be represented.
    #[error("Cart total too large after changing {0}")]
    AmountOverflow(ProductId),

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The cart could not be encoded for storage.
    #[error("Failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One row in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
    #[serde(default = "default_size")]
    pub size: String,
}

fn default_size() -> String {
    DEFAULT_SIZE.to_owned()
}

impl CartLine {
    /// Snapshot a product into a new line with quantity 1.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
            size: product.size_or_default().to_owned(),
        }
    }

    /// `price * quantity`.
    ///
    /// Saturates instead of overflowing; carts read from or written to
    /// storage are checked so this never happens in practice.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    fn checked_line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Flat-rate shipping waived above a subtotal threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Subtotals strictly above this ship free.
    pub free_shipping_over: Decimal,
    /// Fee charged otherwise.
    pub flat_fee: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_over: Decimal::new(50_000, 0),
            flat_fee: Decimal::new(2_000, 0),
        }
    }
}

impl ShippingPolicy {
    /// Create a policy from a threshold and a flat fee.
    #[must_use]
    pub const fn new(free_shipping_over: Decimal, flat_fee: Decimal) -> Self {
        Self {
            free_shipping_over,
            flat_fee,
        }
    }

    /// Shipping charged for `subtotal`.
    #[must_use]
    pub fn fee_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_shipping_over {
            Decimal::ZERO
        } else {
            self.flat_fee
        }
    }
}

/// Cart contents and totals, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    /// Sum of quantities, shown on the cart badge.
    pub item_count: u64,
}

impl CartSummary {
    /// Compute totals for `lines` under `policy`.
    #[must_use]
    pub fn new(lines: Vec<CartLine>, policy: &ShippingPolicy) -> Self {
        let subtotal = subtotal_of(&lines);
        let shipping = policy.fee_for(subtotal);
        let item_count = item_count_of(&lines);
        Self {
            lines,
            subtotal,
            shipping,
            total: subtotal.saturating_add(shipping),
            item_count,
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether shipping was waived.
    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }
}

fn subtotal_of(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.line_total()))
}

fn checked_subtotal(lines: &[CartLine]) -> Option<Decimal> {
    lines.iter().try_fold(Decimal::ZERO, |acc, line| {
        acc.checked_add(line.checked_line_total()?)
    })
}

fn item_count_of(lines: &[CartLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity)).sum()
}

/// The cart, bound to a storage backend and the catalog it sells from.
///
/// Assumes a single writer: concurrent writers to the same key race with
/// last-write-wins semantics.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    catalog: Arc<Catalog>,
    key: String,
    shipping: ShippingPolicy,
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store using [`DEFAULT_CART_KEY`] and the default shipping policy.
    #[must_use]
    pub fn new(storage: S, catalog: Arc<Catalog>) -> Self {
        Self {
            storage,
            catalog,
            key: DEFAULT_CART_KEY.to_owned(),
            shipping: ShippingPolicy::default(),
        }
    }

    /// Persist under a different storage key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Use a different shipping policy.
    #[must_use]
    pub const fn with_shipping(mut self, shipping: ShippingPolicy) -> Self {
        self.shipping = shipping;
        self
    }

    /// Storage key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Shipping policy in use.
    #[must_use]
    pub const fn shipping_policy(&self) -> &ShippingPolicy {
        &self.shipping
    }

    /// Underlying storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing line, or appends a new line priced at the
    /// product's current catalog price. Returns the updated line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if the id is not in the catalog,
    /// `CartError::AmountOverflow` if the cart total would no longer fit, or
    /// a storage error if the cart cannot be written.
    #[instrument(skip(self))]
    pub fn add(&mut self, product_id: &ProductId) -> Result<CartLine, CartError> {
        let snapshot = self
            .catalog
            .find(product_id)
            .map(CartLine::from_product)
            .ok_or_else(|| CartError::ProductNotFound(product_id.clone()))?;

        let mut lines = self.read_all();
        let line = match lines.iter_mut().find(|line| &line.id == product_id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1);
                line.clone()
            }
            None => {
                lines.push(snapshot.clone());
                snapshot
            }
        };

        self.ensure_totals_fit(&lines, product_id)?;
        self.persist(&lines)?;
        tracing::debug!(quantity = line.quantity, "Added to cart");
        Ok(line)
    }

    /// Remove a product's line. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cart cannot be written.
    #[instrument(skip(self))]
    pub fn remove(&mut self, product_id: &ProductId) -> Result<bool, CartError> {
        let mut lines = self.read_all();
        let before = lines.len();
        lines.retain(|line| &line.id != product_id);
        let removed = lines.len() != before;

        self.persist(&lines)?;
        tracing::debug!(removed, "Removed from cart");
        Ok(removed)
    }

    /// Set a line's quantity; anything below 1 removes the line.
    ///
    /// Returns the updated line, or `None` when the line was removed or was
    /// not in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::AmountOverflow` if the cart total would no longer
    /// fit, or a storage error if the cart cannot be written. The cart is
    /// unchanged on error.
    #[instrument(skip(self))]
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Option<CartLine>, CartError> {
        if quantity < 1 {
            self.remove(product_id)?;
            return Ok(None);
        }

        let mut lines = self.read_all();
        let Some(line) = lines.iter_mut().find(|line| &line.id == product_id) else {
            tracing::debug!("Quantity change for product not in cart");
            return Ok(None);
        };
        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let updated = line.clone();

        self.ensure_totals_fit(&lines, product_id)?;
        self.persist(&lines)?;
        tracing::debug!(quantity = updated.quantity, "Updated cart quantity");
        Ok(Some(updated))
    }

    /// Current cart lines in insertion order.
    ///
    /// An absent, unreadable, or malformed persisted cart reads as empty.
    #[must_use]
    pub fn read_all(&self) -> Vec<CartLine> {
        match self.load() {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Discarding unreadable cart");
                Vec::new()
            }
        }
    }

    /// Remove the persisted cart entirely.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the key cannot be removed.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.storage.remove_item(&self.key)?;
        tracing::debug!("Cart cleared");
        Ok(())
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        subtotal_of(&self.read_all())
    }

    /// Shipping for the current subtotal under the configured policy.
    #[must_use]
    pub fn shipping_fee(&self) -> Decimal {
        self.shipping.fee_for(self.subtotal())
    }

    /// `subtotal() + shipping_fee()`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        let subtotal = self.subtotal();
        subtotal.saturating_add(self.shipping.fee_for(subtotal))
    }

    /// Sum of quantities across lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        item_count_of(&self.read_all())
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.read_all().len()
    }

    /// Lines plus totals from a single read.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::new(self.read_all(), &self.shipping)
    }

    fn load(&self) -> Result<Vec<CartLine>, CartError> {
        match self.storage.get_item(&self.key)? {
            Some(raw) => decode_cart(&raw),
            None => Ok(Vec::new()),
        }
    }

    /// Subtotal plus the largest possible shipping fee must be representable.
    fn ensure_totals_fit(&self, lines: &[CartLine], product_id: &ProductId) -> Result<(), CartError> {
        checked_subtotal(lines)
            .and_then(|subtotal| subtotal.checked_add(self.shipping.flat_fee))
            .map(|_| ())
            .ok_or_else(|| CartError::AmountOverflow(product_id.clone()))
    }

    fn persist(&mut self, lines: &[CartLine]) -> Result<(), CartError> {
        let json = serde_json::to_string(lines)?;
        self.storage.set_item(&self.key, &json)?;
        Ok(())
    }
}

/// Decode a persisted cart, enforcing the shape contract.
fn decode_cart(raw: &str) -> Result<Vec<CartLine>, CartError> {
    let lines: Vec<CartLine> = serde_json::from_str(raw)
        .map_err(|e| CartError::MalformedPersistedState(e.to_string()))?;

    let mut seen = HashSet::with_capacity(lines.len());
    for line in &lines {
        if line.quantity == 0 {
            return Err(CartError::MalformedPersistedState(format!(
                "zero quantity for {}",
                line.id
            )));
        }
        if line.price.is_sign_negative() && !line.price.is_zero() {
            return Err(CartError::MalformedPersistedState(format!(
                "negative price for {}",
                line.id
            )));
        }
        if !seen.insert(&line.id) {
            return Err(CartError::MalformedPersistedState(format!(
                "duplicate line for {}",
                line.id
            )));
        }
    }

    if checked_subtotal(&lines).is_none() {
        return Err(CartError::MalformedPersistedState(
            "cart total out of range".to_owned(),
        ));
    }

    Ok(lines)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn catalog() -> Arc<Catalog> {
        let json = r#"{
            "scarves": [
                {"id": "a", "name": "Red Scarf", "price": 1000, "image": "img/a.jpg"},
                {"id": "b", "name": "Blue Scarf", "price": 2000, "colors": ["blue"], "size": "Large"}
            ],
            "lace": [
                {"id": "lace", "name": "Gold Lace", "price": 45000},
                {"id": "big", "name": "Bridal Lace", "price": 60000}
            ]
        }"#;
        Arc::new(Catalog::from_json_str(json).unwrap())
    }

    fn store() -> CartStore<MemoryStorage> {
        CartStore::new(MemoryStorage::new(), catalog())
    }

    fn id(s: &str) -> ProductId {
        ProductId::new(s)
    }

    #[test]
    fn test_add_twice_increments_single_line() {
        let mut cart = store();
        cart.add(&id("a")).unwrap();
        let line = cart.add(&id("a")).unwrap();

        assert_eq!(line.quantity, 2);
        let lines = cart.read_all();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn test_add_snapshots_product() {
        let mut cart = store();
        let a = cart.add(&id("a")).unwrap();
        let b = cart.add(&id("b")).unwrap();

        assert_eq!(a.name, "Red Scarf");
        assert_eq!(a.price, Decimal::new(1000, 0));
        assert_eq!(a.image, "img/a.jpg");
        assert_eq!(a.size, DEFAULT_SIZE);
        assert_eq!(b.size, "Large");
    }

    #[test]
    fn test_add_unknown_product_fails_without_writing() {
        let mut cart = store();
        let err = cart.add(&id("missing")).unwrap_err();

        assert!(matches!(err, CartError::ProductNotFound(p) if p.as_str() == "missing"));
        assert_eq!(cart.storage().get_item(DEFAULT_CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = store();
        cart.add(&id("b")).unwrap();
        cart.add(&id("a")).unwrap();
        cart.add(&id("b")).unwrap();

        let ids: Vec<_> = cart.read_all().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, [id("b"), id("a")]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = store();
        cart.add(&id("a")).unwrap();
        let before = cart.read_all();

        assert!(!cart.remove(&id("b")).unwrap());
        assert_eq!(cart.read_all(), before);
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = store();
        cart.add(&id("a")).unwrap();

        let line = cart.set_quantity(&id("a"), 3).unwrap().unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(cart.read_all()[0].quantity, 3);

        assert!(cart.set_quantity(&id("a"), 0).unwrap().is_none());
        assert!(cart.read_all().is_empty());

        cart.add(&id("a")).unwrap();
        cart.set_quantity(&id("a"), -5).unwrap();
        assert!(cart.read_all().is_empty());
    }

    #[test]
    fn test_set_quantity_absent_is_noop() {
        let mut cart = store();
        assert!(cart.set_quantity(&id("a"), 4).unwrap().is_none());
        assert!(cart.read_all().is_empty());
    }

    #[test]
    fn test_add_add_set_remove_ends_empty() {
        let mut cart = store();
        cart.add(&id("a")).unwrap();
        cart.add(&id("a")).unwrap();
        cart.set_quantity(&id("a"), 1).unwrap();
        cart.remove(&id("a")).unwrap();
        assert!(cart.read_all().is_empty());
    }

    #[test]
    fn test_price_is_frozen_at_add_time() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                DEFAULT_CART_KEY,
                r#"[{"id":"a","name":"Red Scarf","price":750,"image":"","quantity":1,"size":"Standard"}]"#,
            )
            .unwrap();
        let mut cart = CartStore::new(storage, catalog());

        let line = cart.add(&id("a")).unwrap();
        assert_eq!(line.price, Decimal::new(750, 0));
        assert_eq!(cart.subtotal(), Decimal::new(1500, 0));
    }

    #[test]
    fn test_persisted_cart_reads_back_equal() {
        let mut cart = store();
        cart.add(&id("a")).unwrap();
        cart.add(&id("b")).unwrap();
        cart.set_quantity(&id("b"), 4).unwrap();
        let lines = cart.read_all();

        let raw = cart.storage().get_item(DEFAULT_CART_KEY).unwrap().unwrap();
        assert_eq!(decode_cart(&raw).unwrap(), lines);
    }

    #[test]
    fn test_malformed_state_reads_as_empty() {
        for raw in [
            "not json",
            "null",
            r#"{"id":"a"}"#,
            r#"[{"id":"a","name":"x","price":1,"quantity":0}]"#,
            r#"[{"id":"a","name":"x","price":1,"quantity":-1}]"#,
            r#"[{"id":"a","name":"x","price":1,"quantity":1},{"id":"a","name":"x","price":1,"quantity":2}]"#,
            r#"[{"id":"a","name":"x","price":-5,"quantity":1}]"#,
            r#"[{"id":"a","name":"x","price":70000000000000000000000000000,"quantity":2}]"#,
        ] {
            let mut storage = MemoryStorage::new();
            storage.set_item(DEFAULT_CART_KEY, raw).unwrap();
            let cart = CartStore::new(storage, catalog());
            assert!(cart.read_all().is_empty(), "expected empty cart for {raw}");
        }
    }

    #[test]
    fn test_out_of_range_totals_are_malformed() {
        let line_overflow = r#"[{"id":"a","name":"x","price":70000000000000000000000000000,"quantity":2}]"#;
        let subtotal_overflow = r#"[
            {"id":"a","name":"x","price":40000000000000000000000000000,"quantity":1},
            {"id":"b","name":"y","price":40000000000000000000000000000,"quantity":1}
        ]"#;
        for raw in [line_overflow, subtotal_overflow] {
            assert!(matches!(
                decode_cart(raw),
                Err(CartError::MalformedPersistedState(msg)) if msg.contains("out of range")
            ));

            let mut storage = MemoryStorage::new();
            storage.set_item(DEFAULT_CART_KEY, raw).unwrap();
            let cart = CartStore::new(storage, catalog());
            assert_eq!(cart.subtotal(), Decimal::ZERO);
            assert_eq!(cart.summary().total, Decimal::new(2_000, 0));
        }
    }

    #[test]
    fn test_overflowing_quantity_is_rejected() {
        let json = r#"{"vault": [
            {"id": "rare", "name": "Heirloom Lace", "price": 10000000000000000000000000000},
            {"id": "huge", "name": "Museum Lace", "price": 50000000000000000000000000000}
        ]}"#;
        let catalog = Arc::new(Catalog::from_json_str(json).unwrap());
        let mut cart = CartStore::new(MemoryStorage::new(), catalog);

        cart.add(&id("rare")).unwrap();
        let err = cart.set_quantity(&id("rare"), 100).unwrap_err();
        assert!(matches!(err, CartError::AmountOverflow(ref p) if p.as_str() == "rare"));
        assert_eq!(cart.read_all()[0].quantity, 1);

        cart.remove(&id("rare")).unwrap();
        cart.add(&id("huge")).unwrap();
        let err = cart.add(&id("huge")).unwrap_err();
        assert!(matches!(err, CartError::AmountOverflow(_)));
        assert_eq!(cart.item_count(), 1);

        let summary = cart.summary();
        assert_eq!(summary.total, summary.subtotal + summary.shipping);
    }

    #[test]
    fn test_line_total_saturates() {
        let line = CartLine {
            id: id("a"),
            name: "x".to_owned(),
            price: Decimal::MAX,
            image: String::new(),
            quantity: 3,
            size: DEFAULT_SIZE.to_owned(),
        };
        assert_eq!(line.line_total(), Decimal::MAX);
        let summary = CartSummary::new(vec![line], &ShippingPolicy::default());
        assert_eq!(summary.total, Decimal::MAX);
    }

    #[test]
    fn test_mutation_recovers_from_malformed_state() {
        let mut storage = MemoryStorage::new();
        storage.set_item(DEFAULT_CART_KEY, "{{{").unwrap();
        let mut cart = CartStore::new(storage, catalog());

        cart.add(&id("a")).unwrap();
        assert_eq!(cart.read_all().len(), 1);
    }

    #[test]
    fn test_missing_size_defaults_to_standard() {
        let lines = decode_cart(r#"[{"id":"a","name":"x","price":1,"quantity":1}]"#).unwrap();
        assert_eq!(lines[0].size, DEFAULT_SIZE);
        assert!(lines[0].image.is_empty());
    }

    #[test]
    fn test_shipping_below_threshold() {
        let mut cart = store();
        cart.add(&id("lace")).unwrap();

        assert_eq!(cart.subtotal(), Decimal::new(45_000, 0));
        assert_eq!(cart.shipping_fee(), Decimal::new(2_000, 0));
        assert_eq!(cart.total(), Decimal::new(47_000, 0));
    }

    #[test]
    fn test_shipping_waived_above_threshold() {
        let mut cart = store();
        cart.add(&id("big")).unwrap();

        assert_eq!(cart.shipping_fee(), Decimal::ZERO);
        assert_eq!(cart.total(), Decimal::new(60_000, 0));
    }

    #[test]
    fn test_shipping_at_threshold_is_charged() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.fee_for(Decimal::new(50_000, 0)), policy.flat_fee);
        assert_eq!(policy.fee_for(Decimal::new(50_001, 0)), Decimal::ZERO);
    }

    #[test]
    fn test_custom_policy_and_key() {
        let policy = ShippingPolicy::new(Decimal::new(500, 0), Decimal::new(99, 0));
        let mut cart = store().with_key("test-cart").with_shipping(policy);
        cart.add(&id("a")).unwrap();

        assert_eq!(cart.shipping_fee(), Decimal::ZERO);
        assert!(cart.storage().get_item("test-cart").unwrap().is_some());
        assert!(cart.storage().get_item(DEFAULT_CART_KEY).unwrap().is_none());
    }

    #[test]
    fn test_counts_and_summary() {
        let mut cart = store();
        cart.add(&id("a")).unwrap();
        cart.add(&id("a")).unwrap();
        cart.add(&id("b")).unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.line_count(), 2);

        let summary = cart.summary();
        assert_eq!(summary.subtotal, Decimal::new(4_000, 0));
        assert_eq!(summary.total, summary.subtotal + summary.shipping);
        assert_eq!(summary.item_count, 3);
        assert!(!summary.ships_free());
    }

    #[test]
    fn test_clear() {
        let mut cart = store();
        cart.add(&id("a")).unwrap();
        cart.clear().unwrap();

        assert!(cart.read_all().is_empty());
        assert_eq!(cart.storage().get_item(DEFAULT_CART_KEY).unwrap(), None);
    }
}
