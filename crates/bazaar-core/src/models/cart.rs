use serde::{Deserialize, Serialize};

use super::catalog::ProductRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: ProductRef,
    pub quantity: u32,
    /// Unit price captured when the item was added; zero when the server
    /// omits it.
    #[serde(default)]
    pub price: f64,
}

impl CartItem {
    /// Unit price, falling back to the populated product's current price.
    pub fn unit_price(&self) -> f64 {
        if self.price > 0.0 {
            self.price
        } else {
            self.product.product().map(|p| p.price).unwrap_or(0.0)
        }
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price() * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default, alias = "totalPrice", alias = "total")]
    pub total_amount: Option<f64>,
}

impl Cart {
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Server total when given, otherwise the computed subtotal.
    pub fn total(&self) -> f64 {
        self.total_amount.unwrap_or_else(|| self.subtotal())
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `data` of cart endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub cart: Cart,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_totals() {
        let json = r#"{
            "_id": "cart1",
            "items": [
                {"product": {"_id":"p1","name":"Mug","price":250}, "quantity": 2},
                {"product": "p2", "quantity": 1, "price": 99.5}
            ]
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), 599.5);
        assert_eq!(cart.total(), 599.5);
        assert_eq!(cart.items[1].product.id(), "p2");
    }

    #[test]
    fn test_server_total_wins() {
        let cart: Cart = serde_json::from_str(r#"{"items":[],"totalPrice":120}"#).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 120.0);
    }

    #[test]
    fn test_null_cart_is_empty() {
        let response: CartResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(response.cart.is_empty());
    }
}
