//! `reqwest` implementation of [`CatalogApi`].
//!
//! Product details are cached using `moka`; stock is always fetched fresh
//! because it is the value being validated against.

use std::sync::Arc;

use cart_store_core::{ProductDetails, ProductId, Stock};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{ApiError, CatalogApi};
use crate::config::CatalogApiConfig;

const PRODUCT_CACHE_CAPACITY: u64 = 1000;

/// Client for the catalog REST API.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct HttpCatalogClient {
    inner: Arc<HttpCatalogClientInner>,
}

struct HttpCatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
    products: Cache<ProductId, ProductDetails>,
}

impl HttpCatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &CatalogApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpCatalogClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                token: config.token.clone(),
                products,
            }),
        })
    }

    /// GET `{base_url}/{path}` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}/{path}", self.inner.base_url);

        let mut request = self.inner.client.get(&url);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            ApiError::Parse(e)
        })
    }
}

impl CatalogApi for HttpCatalogClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        let stock: Stock = self.get_json(&format!("stock/{id}")).await?;
        if let Some(returned) = stock.id
            && returned != id
        {
            return Err(ApiError::ProductMismatch {
                requested: id,
                returned,
            });
        }
        debug!(available = stock.amount, "Fetched stock");
        Ok(stock)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<ProductDetails, ApiError> {
        if let Some(cached) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(cached);
        }

        let details: ProductDetails = self.get_json(&format!("products/{id}")).await?;
        if details.id != id {
            return Err(ApiError::ProductMismatch {
                requested: id,
                returned: details.id,
            });
        }

        self.inner.products.insert(id, details.clone()).await;
        Ok(details)
    }
}
