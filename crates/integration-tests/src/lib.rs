//! Integration test support for the cart store.
//!
//! [`StubCatalog`] serves `GET /stock/{id}` and `GET /products/{id}` from an
//! in-memory table on a random local port, so tests can drive the real
//! `HttpCatalogClient` and `FileStorage` end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cart-store-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};
use url::Url;

/// In-memory catalog served over HTTP.
#[derive(Clone, Default)]
pub struct StubCatalog {
    inner: Arc<StubCatalogInner>,
}

#[derive(Default)]
struct StubCatalogInner {
    stock: Mutex<HashMap<i32, Value>>,
    products: Mutex<HashMap<i32, Value>>,
    failing: AtomicBool,
    product_requests: AtomicUsize,
}

impl StubCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product with the given stock level.
    #[must_use]
    pub fn with_product(self, id: i32, title: &str, price: f64, stock: u32) -> Self {
        self.set_product(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://cdn.example.com/{id}.jpg"),
            }),
        );
        self.set_stock(id, stock);
        self
    }

    /// Replace the product record served for `id`.
    pub fn set_product(&self, id: i32, body: Value) {
        self.inner
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, body);
    }

    /// Replace the stock level served for `id`.
    pub fn set_stock(&self, id: i32, amount: u32) {
        self.set_stock_body(id, json!({ "id": id, "amount": amount }));
    }

    /// Replace the raw stock record served for `id`.
    pub fn set_stock_body(&self, id: i32, body: Value) {
        self.inner
            .stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, body);
    }

    /// Make every endpoint answer 500.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `GET /products/{id}` requests served.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.inner.product_requests.load(Ordering::SeqCst)
    }

    /// Serve the catalog on a random local port and return its base URL.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listener cannot be bound.
    pub async fn spawn(&self) -> std::io::Result<Url> {
        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Url::parse(&format!("http://{addr}"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    }

    fn failing(&self) -> bool {
        self.inner.failing.load(Ordering::SeqCst)
    }
}

async fn stock(State(catalog): State<StubCatalog>, Path(id): Path<i32>) -> Response {
    if catalog.failing() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "catalog down").into_response();
    }

    let body = catalog
        .inner
        .stock
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .cloned();

    match body {
        Some(body) => axum::Json(body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn product(State(catalog): State<StubCatalog>, Path(id): Path<i32>) -> Response {
    catalog.inner.product_requests.fetch_add(1, Ordering::SeqCst);

    if catalog.failing() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "catalog down").into_response();
    }

    let body = catalog
        .inner
        .products
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .cloned();

    match body {
        Some(body) => axum::Json(body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
