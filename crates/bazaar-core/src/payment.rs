//! Options for the hosted checkout widget and the confirmation it hands
//! back.
//!
//! The widget takes a JSON options object naming the merchant key and an
//! order (one-time payment) or subscription (recurring). On success it
//! returns payment id, order or subscription id, and an HMAC signature which
//! the server verifies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::models::{GatewayOrder, Order, RegistrationOrder, SubscriptionOrder, User};

/// Merchant name shown in the widget header.
pub const MERCHANT_NAME: &str = "Bazaar Marketplace";

/// Widget accent colour.
pub const THEME_COLOR: &str = "#4f46e5";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Prefill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub color: String,
}

/// Options object passed to the hosted checkout widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutOptions {
    pub key: String,
    /// Smallest currency unit. Omitted for subscriptions, where the plan
    /// decides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefill: Option<Prefill>,
    pub theme: Theme,
}

impl CheckoutOptions {
    fn base(key: &str, description: &str) -> Self {
        Self {
            key: key.to_string(),
            amount: None,
            currency: None,
            name: MERCHANT_NAME.to_string(),
            description: description.to_string(),
            order_id: None,
            subscription_id: None,
            prefill: None,
            theme: Theme {
                color: THEME_COLOR.to_string(),
            },
        }
    }

    /// Cart checkout.
    pub fn for_order(key: &str, order: &GatewayOrder) -> Self {
        Self {
            amount: Some(order.amount),
            currency: Some(order.currency.clone()),
            order_id: Some(order.id.clone()),
            ..Self::base(key, "Order payment")
        }
    }

    /// One-time seller registration fee. A key id issued with the order
    /// wins over the configured one.
    pub fn for_registration(key: &str, order: &RegistrationOrder) -> Self {
        let key = order.key_id.as_deref().unwrap_or(key);
        Self {
            amount: Some(order.amount),
            currency: Some(order.currency.clone()),
            order_id: Some(order.order_id.clone()),
            ..Self::base(key, "Seller registration fee")
        }
    }

    pub fn for_subscription(key: &str, subscription: &SubscriptionOrder) -> Self {
        let key = subscription.key_id.as_deref().unwrap_or(key);
        Self {
            subscription_id: Some(subscription.subscription_id.clone()),
            ..Self::base(key, "Seller subscription")
        }
    }

    pub fn with_prefill(mut self, user: &User) -> Self {
        self.prefill = Some(Prefill {
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            contact: user.phone.clone(),
        });
        self
    }
}

/// Success payload of the widget, forwarded to the verify endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub razorpay_payment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub razorpay_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub razorpay_subscription_id: Option<String>,
    pub razorpay_signature: String,
}

impl PaymentConfirmation {
    /// Parse the widget's handler argument.
    pub fn from_gateway_response(response: &Value) -> Result<Self, ApiError> {
        let confirmation: PaymentConfirmation = serde_json::from_value(response.clone())
            .map_err(|e| ApiError::InvalidResponse(format!("Invalid payment response: {}", e)))?;

        if confirmation.razorpay_payment_id.is_empty() || confirmation.razorpay_signature.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Payment response is missing the payment id or signature".to_string(),
            ));
        }
        if confirmation.razorpay_order_id.is_none() && confirmation.razorpay_subscription_id.is_none() {
            return Err(ApiError::InvalidResponse(
                "Payment response names neither an order nor a subscription".to_string(),
            ));
        }
        Ok(confirmation)
    }
}

/// `data` of the verify endpoints. Servers answer with the paid order, a
/// message, or nothing at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    #[serde(default)]
    pub order: Option<Order>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_options_json() {
        let order = GatewayOrder {
            id: "order_N1".to_string(),
            amount: 129900,
            currency: "INR".to_string(),
        };
        let value = serde_json::to_value(CheckoutOptions::for_order("rzp_test_key", &order)).unwrap();

        assert_eq!(
            value,
            json!({
                "key": "rzp_test_key",
                "amount": 129900,
                "currency": "INR",
                "name": "Bazaar Marketplace",
                "description": "Order payment",
                "order_id": "order_N1",
                "theme": {"color": "#4f46e5"}
            })
        );
    }

    #[test]
    fn test_subscription_options_prefer_server_key() {
        let subscription = SubscriptionOrder {
            subscription_id: "sub_42".to_string(),
            plan_id: None,
            short_url: None,
            key_id: Some("rzp_live_server".to_string()),
        };
        let options = CheckoutOptions::for_subscription("rzp_configured", &subscription);

        assert_eq!(options.key, "rzp_live_server");
        assert_eq!(options.subscription_id.as_deref(), Some("sub_42"));
        assert_eq!(options.amount, None);
        let value = serde_json::to_value(&options).unwrap();
        assert!(value.get("order_id").is_none());
        assert!(value.get("amount").is_none());
    }

    #[test]
    fn test_prefill_from_user() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1", "name": "Asha", "email": "asha@example.com", "phone": "9999999999"
        }))
        .unwrap();
        let order = RegistrationOrder {
            order_id: "order_reg".to_string(),
            amount: 99900,
            currency: "INR".to_string(),
            key_id: None,
        };
        let options = CheckoutOptions::for_registration("rzp_test", &order).with_prefill(&user);
        let prefill = options.prefill.unwrap();
        assert_eq!(prefill.email.as_deref(), Some("asha@example.com"));
        assert_eq!(prefill.contact.as_deref(), Some("9999999999"));
        assert_eq!(options.key, "rzp_test");
    }

    #[test]
    fn test_confirmation_from_gateway() {
        let confirmation = PaymentConfirmation::from_gateway_response(&json!({
            "razorpay_payment_id": "pay_1",
            "razorpay_order_id": "order_1",
            "razorpay_signature": "sig"
        }))
        .unwrap();
        assert_eq!(
            serde_json::to_value(&confirmation).unwrap(),
            json!({"razorpay_payment_id": "pay_1", "razorpay_order_id": "order_1", "razorpay_signature": "sig"})
        );

        assert!(PaymentConfirmation::from_gateway_response(&json!({
            "razorpay_payment_id": "pay_1",
            "razorpay_signature": "sig"
        }))
        .is_err());
        assert!(PaymentConfirmation::from_gateway_response(&json!({"error": "cancelled"})).is_err());
    }
}
