//! Cart commands.
//!
//! Each command opens the store configured by `CART_*` environment variables,
//! runs one operation and leaves rendering to the caller.

use std::fmt::Write as _;

use cart_store::catalog::{ApiError, HttpCatalogClient};
use cart_store::storage::{FileStorage, StorageError};
use cart_store::{CartConfig, CartError, CartStore, ConfigError, Outcome, UpdateProductAmount};
use cart_store_core::{Cart, ProductId};
use thiserror::Error;

/// Store type used by the CLI.
pub type LocalStore = CartStore<HttpCatalogClient, FileStorage>;

/// Errors that abort a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("catalog client error: {0}")]
    Api(#[from] ApiError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Open the store described by the environment.
pub fn open_store() -> Result<LocalStore, CommandError> {
    let config = CartConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let api = HttpCatalogClient::new(&config.api)?;
    let storage = FileStorage::new(&config.storage.dir);
    Ok(CartStore::open(api, storage, &config.storage.key)?)
}

pub async fn add(store: &LocalStore, product_id: ProductId) -> Result<(), CommandError> {
    store.add_product(product_id).await?;
    tracing::info!(%product_id, "Added product");
    Ok(())
}

pub fn remove(store: &LocalStore, product_id: ProductId) -> Result<(), CommandError> {
    store.remove_product(product_id)?;
    tracing::info!(%product_id, "Removed product");
    Ok(())
}

pub async fn update(
    store: &LocalStore,
    product_id: ProductId,
    amount: i64,
) -> Result<(), CommandError> {
    let outcome = store
        .update_product_amount(UpdateProductAmount { product_id, amount })
        .await?;
    match outcome {
        Outcome::Committed => tracing::info!(%product_id, amount, "Updated quantity"),
        Outcome::Ignored => tracing::info!(%product_id, amount, "Quantity must be positive, nothing changed"),
    }
    Ok(())
}

/// Format the cart as a table with totals.
pub fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}  {:>5}  {:>10}  {:>10}  TITLE",
        "ID", "QTY", "PRICE", "SUBTOTAL"
    );
    for item in cart {
        let _ = writeln!(
            out,
            "{:>6}  {:>5}  {:>10}  {:>10}  {}",
            item.id,
            item.amount,
            item.price.map_or_else(|| "-".to_string(), |p| p.to_string()),
            item.line_price()
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            item.display_name().unwrap_or("-")
        );
    }
    let _ = writeln!(
        out,
        "Items: {}  Quantity: {}  Subtotal: {}",
        cart.len(),
        cart.total_quantity(),
        cart.subtotal()
    );
    out
}
