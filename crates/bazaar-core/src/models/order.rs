use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::ProductRef;
use super::common::{deserialize_ref, Pagination};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    #[serde(alias = "canceled")]
    Cancelled,
    Returned,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Returned => "Returned",
            OrderStatus::Unknown => "Unknown",
        }
    }

    /// Buyers may cancel until the order ships.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }

    pub fn is_final(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Returned
        )
    }

    pub fn parse(s: &str) -> Option<Self> {
        match serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase())) {
            Ok(OrderStatus::Unknown) | Err(_) => None,
            Ok(status) => Some(status),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    #[serde(alias = "completed", alias = "captured")]
    Paid,
    Failed,
    Refunded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    #[serde(alias = "address", alias = "addressLine1")]
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(alias = "postalCode", alias = "zipCode")]
    pub pincode: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "India".to_string()
}

impl ShippingAddress {
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.street, self.city, self.state, self.pincode, self.country
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ProductRef,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default, deserialize_with = "deserialize_ref")]
    pub seller: Option<String>,
}

impl OrderItem {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.product.product().map(|p| p.name.as_str()))
            .unwrap_or("Unnamed item")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default, alias = "orderItems")]
    pub items: Vec<OrderItem>,
    #[serde(default, alias = "totalPrice")]
    pub total_amount: f64,
    #[serde(alias = "orderStatus")]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Human-facing reference: the order number, else the id.
    pub fn reference(&self) -> &str {
        self.order_number.as_deref().unwrap_or(&self.id)
    }
}

/// `data` of order list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// `data` of single order endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub status: OrderStatus,
    #[serde(default, alias = "comment")]
    pub note: Option<String>,
    #[serde(default, alias = "updatedAt", alias = "date")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// `data` of `GET /orders/:id/track`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default, alias = "statusHistory")]
    pub timeline: Vec<TrackingEvent>,
}

impl Tracking {
    pub fn latest(&self) -> Option<&TrackingEvent> {
        self.timeline
            .iter()
            .max_by_key(|e| e.timestamp.unwrap_or(DateTime::<Utc>::MIN_UTC))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
}

/// Order id issued by the payment gateway for the hosted checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Smallest currency unit (paise)
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

pub(crate) fn default_currency() -> String {
    "INR".to_string()
}

/// `data` of `POST /checkout/create-order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    #[serde(default)]
    pub order: Option<Order>,
    #[serde(default, alias = "razorpayOrder")]
    pub gateway_order: Option<GatewayOrder>,
}

/// Body of `PUT /orders/:id/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parse() {
        assert_eq!(OrderStatus::parse("Shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("canceled"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse("lost"), None);
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(OrderStatus::Delivered.is_final());
    }

    #[test]
    fn test_parse_order_with_aliases() {
        let json = r#"{
            "_id": "o1",
            "orderNumber": "ORD-1001",
            "orderItems": [{"product": "p1", "name": "Mug", "quantity": 2, "price": 250}],
            "totalPrice": 500,
            "orderStatus": "processing",
            "paymentStatus": "completed",
            "shippingAddress": {"fullName":"Asha","phone":"9999999999","address":"12 MG Road","city":"Pune","state":"MH","postalCode":"411001"},
            "createdAt": "2024-06-01T08:30:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.reference(), "ORD-1001");
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.items[0].display_name(), "Mug");
        assert_eq!(
            order.shipping_address.unwrap().one_line(),
            "12 MG Road, Pune, MH 411001, India"
        );
    }

    #[test]
    fn test_tracking_latest() {
        let json = r#"{
            "status": "shipped",
            "courier": "BlueDart",
            "statusHistory": [
                {"status": "confirmed", "timestamp": "2024-06-01T09:00:00Z"},
                {"status": "shipped", "timestamp": "2024-06-02T09:00:00Z", "note": "Dispatched"},
                {"status": "pending"}
            ]
        }"#;
        let tracking: Tracking = serde_json::from_str(json).unwrap();
        let latest = tracking.latest().unwrap();
        assert_eq!(latest.status, OrderStatus::Shipped);
        assert_eq!(latest.note.as_deref(), Some("Dispatched"));
    }

    #[test]
    fn test_checkout_order_gateway() {
        let json = r#"{"order":null,"razorpayOrder":{"id":"order_Abc","amount":59950}}"#;
        let checkout: CheckoutOrder = serde_json::from_str(json).unwrap();
        let gateway = checkout.gateway_order.unwrap();
        assert_eq!(gateway.id, "order_Abc");
        assert_eq!(gateway.currency, "INR");
    }
}
