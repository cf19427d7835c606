//! Catalog products, cart line items and stock records.
//!
//! Only the product `id` (and a line item's `amount`) are interpreted by the
//! cart. Display attributes are optional, and anything else the catalog sends
//! is kept in `extra` and written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;
use super::price::Price;

/// A product as returned by the catalog (`GET /products/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A cart line item: a product plus the quantity in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Quantity in the cart. Always at least 1 inside a [`Cart`](super::Cart).
    pub amount: u32,
}

impl Product {
    /// Build a line item from catalog details.
    ///
    /// A stray `amount` attribute in the details is dropped so it cannot
    /// collide with the line item quantity.
    #[must_use]
    pub fn from_details(details: ProductDetails, amount: u32) -> Self {
        let ProductDetails {
            id,
            title,
            price,
            image,
            mut extra,
        } = details;
        extra.remove("amount");

        Self {
            id,
            title,
            price,
            image,
            extra,
            amount,
        }
    }

    /// Name to show for this line: `title`, else a string `name` attribute.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or_else(|| self.extra.get("name").and_then(Value::as_str))
    }

    /// Price of this line (unit price times amount), if the price is known.
    #[must_use]
    pub fn line_price(&self) -> Option<Price> {
        self.price.map(|price| price.times(self.amount))
    }
}

/// Stock availability for a product (`GET /stock/{id}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    /// Units available.
    pub amount: u32,
}

impl Stock {
    /// Whether `requested` units can be served from this stock.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_details_keeps_unknown_fields() {
        let json = r#"{"id":1,"title":"Sneaker","price":139.9,"image":"https://img/1.jpg","brand":"Acme"}"#;
        let details: ProductDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.extra.get("brand"), Some(&Value::from("Acme")));

        let product = Product::from_details(details, 1);
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["brand"], "Acme");
        assert_eq!(value["amount"], 1);
    }

    #[test]
    fn test_product_details_with_name_instead_of_title() {
        let json = r#"{"id":2,"name":"Boot","price":100}"#;
        let details: ProductDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.title, None);
        assert_eq!(details.image, None);

        let product = Product::from_details(details, 1);
        assert_eq!(product.display_name(), Some("Boot"));
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["name"], "Boot");
        assert!(value.get("title").is_none());
        assert!(value.get("image").is_none());
    }

    #[test]
    fn test_line_item_without_display_attributes() {
        let product: Product = serde_json::from_str(r#"{"id":3,"amount":2}"#).unwrap();
        assert_eq!(product.display_name(), None);
        assert_eq!(product.line_price(), None);
        assert_eq!(serde_json::to_string(&product).unwrap(), r#"{"id":3,"amount":2}"#);
    }

    #[test]
    fn test_line_price() {
        let product = Product {
            id: ProductId::new(1),
            title: Some("Sneaker".to_string()),
            price: Some(Price::from_cents(1050)),
            image: None,
            extra: Map::new(),
            amount: 3,
        };
        assert_eq!(product.line_price(), Some(Price::from_cents(3150)));
    }

    #[test]
    fn test_stock_without_id() {
        let stock: Stock = serde_json::from_str(r#"{"amount":3}"#).unwrap();
        assert_eq!(stock.id, None);
        assert!(stock.covers(3));
        assert!(!stock.covers(4));
    }

    #[test]
    fn test_stock_with_id() {
        let stock: Stock = serde_json::from_str(r#"{"id":1,"amount":0}"#).unwrap();
        assert_eq!(stock.id, Some(ProductId::new(1)));
        assert!(!stock.covers(1));
    }
}
