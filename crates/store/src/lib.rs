//! Cart Store - Persistent shopping cart state container.
//!
//! This crate holds a customer's cart, validates quantity changes against the
//! catalog's stock service and mirrors every committed change to local storage.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the in-memory cart and is the only writer of the
//!   persisted copy
//! - [`catalog::CatalogApi`] is the remote stock/product source;
//!   [`catalog::HttpCatalogClient`] is the `reqwest` implementation
//! - [`storage::CartStorage`] is the key-value persistence seam;
//!   [`storage::FileStorage`] and [`storage::MemoryStorage`] implement it
//!
//! Operations return [`Outcome`] or [`CartError`]; presenting the warning is
//! left to the caller via [`CartError::user_message`].
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_store::{CartStore, UpdateProductAmount};
//! use cart_store::catalog::HttpCatalogClient;
//! use cart_store::storage::FileStorage;
//!
//! let api = HttpCatalogClient::new(&config.api)?;
//! let storage = FileStorage::new(&config.storage.dir);
//! let store = CartStore::open(api, storage, &config.storage.key)?;
//!
//! if let Err(e) = store.add_product(ProductId::new(1)).await {
//!     show_warning(e.user_message());
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;
pub mod store;

pub use config::{CartConfig, CatalogApiConfig, ConfigError, StorageConfig};
pub use error::{CartError, ErrorKind, FailureCause, Operation};
pub use store::{CartStore, Outcome, UpdateProductAmount};
