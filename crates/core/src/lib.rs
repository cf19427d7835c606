//! Cart Store Core - Shared cart domain types.
//!
//! This crate provides the types used by the cart store and its consumers:
//! - `store` - The cart state container, catalog client and storage backends
//! - `cli` - Command-line driver for a local cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere,
//! including UI code that only renders a cart snapshot.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, line items, stock records and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
