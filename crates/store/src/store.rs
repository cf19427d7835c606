//! The cart state container.
//!
//! [`CartStore`] holds the current [`Cart`], validates changes against the
//! catalog's stock and writes every committed cart to storage before
//! publishing it to subscribers.
//!
//! # Commit
//!
//! A commit serializes the whole new cart, writes it under the store's key and
//! then replaces the in-memory cart. If the write fails neither copy changes,
//! so the in-memory cart and the persisted JSON always match.
//!
//! # Concurrency
//!
//! `add_product` and `update_product_amount` run one at a time: each holds an
//! async lock from its first read until its commit, so two adds of the same
//! product both count. `remove_product` never suspends and does not take that
//! lock; every commit applies its change to the latest cart rather than to the
//! snapshot read before the stock check.

use std::sync::Arc;

use cart_store_core::{Cart, Product, ProductId, Stock};
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use crate::catalog::CatalogApi;
use crate::error::{CartError, Operation};
use crate::storage::{CartStorage, StorageError};

/// Result of an operation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The cart changed and was persisted.
    Committed,
    /// The request was a no-op; nothing changed.
    Ignored,
}

impl Outcome {
    /// Whether the cart changed.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Request to set a line item's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// New absolute quantity. Values of zero or below are ignored.
    pub amount: i64,
}

/// Shopping cart state container.
///
/// Cheap to clone; clones share the same cart, storage and catalog client.
pub struct CartStore<A, S> {
    inner: Arc<CartStoreInner<A, S>>,
}

struct CartStoreInner<A, S> {
    api: A,
    storage: S,
    key: String,
    state: watch::Sender<Cart>,
    ops: Mutex<()>,
}

impl<A, S> Clone for CartStore<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: CatalogApi, S: CartStorage> CartStore<A, S> {
    /// Open a store, loading the cart persisted under `key`.
    ///
    /// A missing or blank value starts an empty cart. A value that does not
    /// parse as a valid cart is logged and also starts an empty cart; it is
    /// overwritten by the next commit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be read.
    #[instrument(skip(api, storage, key), fields(key = %key.as_ref()))]
    pub fn open(api: A, storage: S, key: impl AsRef<str>) -> Result<Self, StorageError> {
        let key = key.as_ref().to_string();
        let cart = load_cart(&storage, &key)?;
        debug!(items = cart.len(), "Opened cart store");

        let (state, _) = watch::channel(cart);

        Ok(Self {
            inner: Arc::new(CartStoreInner {
                api,
                storage,
                key,
                state,
                ops: Mutex::new(()),
            }),
        })
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every committed cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.state.subscribe()
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Add one unit of a product.
    ///
    /// Increments an existing line item, or fetches the product and appends
    /// it with an amount of 1. The resulting amount must be covered by stock.
    ///
    /// # Errors
    ///
    /// - `CartError::OutOfStock` if stock cannot cover the new amount
    /// - `CartError::Failed` on catalog or storage failure
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Outcome, CartError> {
        self.add(product_id)
            .await
            .inspect_err(|e| warn!(error = %e, "Add to cart rejected"))
    }

    async fn add(&self, product_id: ProductId) -> Result<Outcome, CartError> {
        const OP: Operation = Operation::Add;

        let _guard = self.inner.ops.lock().await;
        let existing = self.inner.state.borrow().get(product_id).map(|item| item.amount);

        let stock = self
            .inner
            .api
            .stock(product_id)
            .await
            .map_err(|e| CartError::failed(OP, e))?;

        let requested = existing.map_or(1, |amount| u64::from(amount) + 1);
        let amount = check_stock(product_id, requested, &stock)?;

        if existing.is_some() {
            return self.commit(OP, |cart| {
                cart.set_amount(product_id, amount)
                    .map_err(|e| CartError::failed(OP, e))
            });
        }

        let details = self
            .inner
            .api
            .product(product_id)
            .await
            .map_err(|e| CartError::failed(OP, e))?;

        self.commit(OP, |cart| {
            cart.push(Product::from_details(details, 1))
                .map_err(|e| CartError::failed(OP, e))
        })
    }

    /// Remove a product's line item.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if the product is not in the cart
    /// - `CartError::Failed` on storage failure
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) -> Result<Outcome, CartError> {
        self.commit(Operation::Remove, |cart| {
            cart.remove(product_id)
                .map(drop)
                .map_err(|_| CartError::NotFound {
                    operation: Operation::Remove,
                    product_id,
                })
        })
        .inspect_err(|e| warn!(error = %e, "Remove from cart rejected"))
    }

    /// Set a line item's amount to exactly `request.amount`.
    ///
    /// Amounts of zero or below return `Outcome::Ignored` without contacting
    /// the catalog.
    ///
    /// # Errors
    ///
    /// - `CartError::OutOfStock` if stock cannot cover the amount
    /// - `CartError::NotFound` if the product is not in the cart
    /// - `CartError::Failed` on catalog or storage failure
    #[instrument(skip(self), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(
        &self,
        request: UpdateProductAmount,
    ) -> Result<Outcome, CartError> {
        self.update_amount(request)
            .await
            .inspect_err(|e| warn!(error = %e, "Quantity update rejected"))
    }

    async fn update_amount(&self, request: UpdateProductAmount) -> Result<Outcome, CartError> {
        const OP: Operation = Operation::UpdateAmount;
        let UpdateProductAmount { product_id, amount } = request;

        if amount <= 0 {
            debug!("Ignoring non-positive amount");
            return Ok(Outcome::Ignored);
        }

        let _guard = self.inner.ops.lock().await;

        let stock = self
            .inner
            .api
            .stock(product_id)
            .await
            .map_err(|e| CartError::failed(OP, e))?;

        let amount = check_stock(product_id, amount.unsigned_abs(), &stock)?;

        self.commit(OP, |cart| {
            cart.set_amount(product_id, amount).map_err(|_| CartError::NotFound {
                operation: OP,
                product_id,
            })
        })
    }

    /// Apply `change` to the latest cart, persist it, then publish it.
    ///
    /// Runs under the watch channel's write lock, so readers never observe a
    /// cart that has not been persisted.
    fn commit<F>(&self, operation: Operation, change: F) -> Result<Outcome, CartError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CartError>,
    {
        let mut result = Ok(Outcome::Committed);

        self.inner.state.send_if_modified(|current| {
            let mut next = current.clone();
            if let Err(e) = change(&mut next).and_then(|()| self.persist(operation, &next)) {
                result = Err(e);
                return false;
            }
            debug!(
                %operation,
                items = next.len(),
                quantity = next.total_quantity(),
                "Committed cart"
            );
            *current = next;
            true
        });

        result
    }

    fn persist(&self, operation: Operation, cart: &Cart) -> Result<(), CartError> {
        let json = serde_json::to_string(cart).map_err(|e| CartError::failed(operation, e))?;
        self.inner
            .storage
            .set(&self.inner.key, &json)
            .map_err(|e| CartError::failed(operation, e))
    }
}

/// Read the persisted cart, falling back to an empty cart on bad content.
fn load_cart<S: CartStorage>(storage: &S, key: &str) -> Result<Cart, StorageError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(Cart::new());
    };

    if raw.trim().is_empty() {
        return Ok(Cart::new());
    }

    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(error = %e, key, "Discarding unreadable persisted cart");
        Cart::new()
    }))
}

/// Convert `requested` to a line item amount if stock covers it.
fn check_stock(product_id: ProductId, requested: u64, stock: &Stock) -> Result<u32, CartError> {
    u32::try_from(requested)
        .ok()
        .filter(|amount| stock.covers(*amount))
        .ok_or(CartError::OutOfStock {
            product_id,
            requested,
            available: stock.amount,
        })
}
