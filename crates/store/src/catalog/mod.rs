//! Remote catalog: stock availability and product details.
//!
//! # Endpoints
//!
//! - `GET /stock/{id}` - `{ "amount": 3 }` (an `id`, if present, must match)
//! - `GET /products/{id}` - `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//!
//! The cart store only depends on [`CatalogApi`]; [`HttpCatalogClient`] is the
//! production implementation.

mod client;

pub use client::HttpCatalogClient;

use std::future::Future;

use cart_store_core::{ProductDetails, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog has no such resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success status other than 404/429.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog answered for a different product than requested.
    #[error("requested product {requested}, catalog returned {returned}")]
    ProductMismatch {
        requested: ProductId,
        returned: ProductId,
    },
}

/// Source of stock and product data.
pub trait CatalogApi: Send + Sync {
    /// Fetch the stock record for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, ApiError>> + Send;

    /// Fetch a product's display attributes.
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<ProductDetails, ApiError>> + Send;
}
