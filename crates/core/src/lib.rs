//! Ai-oko Core - Shared types library.
//!
//! This crate provides common types used across the Ai-oko storefront:
//! - `storefront` - Catalog, cart, color facets and checkout hand-off
//! - `cli` - Command-line surface for browsing and managing the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
