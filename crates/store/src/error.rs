//! Cart operation errors.
//!
//! Every rejected operation produces a [`CartError`]. Callers branch on
//! [`CartError::kind`] and show [`CartError::user_message`] to the customer;
//! the underlying cause stays reachable through `source()` for logging.

use std::fmt;

use cart_store_core::{LineItemError, ProductId};
use thiserror::Error;

use crate::catalog::ApiError;
use crate::storage::StorageError;

/// Warning shown when the requested quantity exceeds available stock.
pub const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is out of stock";

/// The cart operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    UpdateAmount,
}

impl Operation {
    /// Generic warning for a failure of this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => "Failed to add product",
            Self::Remove => "Failed to remove product",
            Self::UpdateAmount => "Failed to update product quantity",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::UpdateAmount => "update amount",
        })
    }
}

/// Coarse error classification for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutOfStock,
    NotFound,
    Failure,
}

/// Underlying cause of a [`CartError::Failed`].
#[derive(Debug, Error)]
pub enum FailureCause {
    /// Catalog request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persisting the cart failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),

    /// The change would break a cart invariant.
    #[error(transparent)]
    LineItem(#[from] LineItemError),
}

/// Errors returned by cart operations.
///
/// None of these are fatal: the cart is left exactly as it was.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity exceeds the stock.
    #[error("product {product_id}: requested {requested}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// The product has no line item in the cart.
    #[error("{operation} failed: product {product_id} is not in the cart")]
    NotFound {
        operation: Operation,
        product_id: ProductId,
    },

    /// Transport, decoding or storage failure.
    #[error("{operation} failed: {cause}")]
    Failed {
        operation: Operation,
        #[source]
        cause: FailureCause,
    },
}

impl CartError {
    /// Wrap a lower-level error as a failure of `operation`.
    pub fn failed(operation: Operation, cause: impl Into<FailureCause>) -> Self {
        Self::Failed {
            operation,
            cause: cause.into(),
        }
    }

    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfStock { .. } => ErrorKind::OutOfStock,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Failed { .. } => ErrorKind::Failure,
        }
    }

    /// The warning to show the customer.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::OutOfStock { .. } => OUT_OF_STOCK_MESSAGE,
            Self::NotFound { operation, .. } | Self::Failed { operation, .. } => {
                operation.failure_message()
            }
        }
    }
}
