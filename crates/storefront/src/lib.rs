//! Ai-oko Storefront library.
//!
//! Client-side storefront logic with no server behind it:
//!
//! - [`catalog`] - Static product catalog, lookups and search
//! - [`storage`] - Local key/value storage the cart is persisted into
//! - [`cart`] - Cart store with shipping and totals
//! - [`colors`] - Color facet derivation and matching
//! - [`browse`] - Filter/sort/paginate session for one catalog view
//! - [`checkout`] - Order message and messaging deep link
//! - [`config`] - Environment-driven settings
//! - [`error`] - Unified error type and shopper-facing notices
//! - [`state`] - Loaded catalog plus configuration, shared by every operation
//!
//! Rendering is left to the caller: every user intent maps onto a method
//! call and every view is plain data.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod browse;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod colors;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
