//! The cart: an ordered collection of line items, unique by product ID.
//!
//! [`Cart`] enforces its invariants on every mutation and on deserialization:
//! - every line item has an amount of at least 1
//! - no two line items share a product ID
//!
//! Line items keep insertion order, which is the display order.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Errors raised when a mutation would break a cart invariant.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemError {
    /// A line item would end up with an amount of zero.
    #[error("product {0} must have an amount of at least 1")]
    ZeroAmount(ProductId),
    /// The product is already in the cart.
    #[error("product {0} is already in the cart")]
    Duplicate(ProductId),
    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    Missing(ProductId),
}

/// An ordered cart of line items.
///
/// Serializes as a plain JSON array of [`Product`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of line items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Iterate over line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.items.iter()
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the product has a line item.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Sum of all line item amounts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line prices. Lines without a price count as zero.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().filter_map(Product::line_price).sum()
    }

    /// Append a new line item at the end of the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is already in the cart or its amount is zero.
    pub fn push(&mut self, product: Product) -> Result<(), LineItemError> {
        if product.amount == 0 {
            return Err(LineItemError::ZeroAmount(product.id));
        }
        if self.contains(product.id) {
            return Err(LineItemError::Duplicate(product.id));
        }
        self.items.push(product);
        Ok(())
    }

    /// Set the amount of an existing line item.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart or `amount` is zero.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> Result<(), LineItemError> {
        if amount == 0 {
            return Err(LineItemError::ZeroAmount(id));
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(LineItemError::Missing(id))?;
        item.amount = amount;
        Ok(())
    }

    /// Remove a line item, keeping the order of the others.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart.
    pub fn remove(&mut self, id: ProductId) -> Result<Product, LineItemError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(LineItemError::Missing(id))?;
        Ok(self.items.remove(index))
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = LineItemError;

    fn try_from(items: Vec<Product>) -> Result<Self, Self::Error> {
        let mut cart = Self::new();
        for item in items {
            cart.push(item)?;
        }
        Ok(cart)
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
