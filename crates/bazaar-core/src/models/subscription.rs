use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::default_currency;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub razorpay_plan_id: Option<String>,
}

fn default_interval() -> String {
    "monthly".to_string()
}

/// `data` of `GET /subscription/plans`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanList {
    pub plans: Vec<Plan>,
}

/// `data` of `POST /subscription/registration/create`: a one-time gateway
/// order for the seller registration fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOrder {
    #[serde(alias = "id", alias = "razorpayOrderId")]
    pub order_id: String,
    /// Smallest currency unit (paise)
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Public key id, when the server hands one out
    #[serde(default)]
    pub key_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub plan_id: String,
}

/// `data` of `POST /subscription/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionOrder {
    #[serde(alias = "id", alias = "razorpaySubscriptionId")]
    pub subscription_id: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    /// Hosted payment page, for clients without the widget
    #[serde(default)]
    pub short_url: Option<String>,
    #[serde(default)]
    pub key_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    #[default]
    Created,
    Authenticated,
    Active,
    Pending,
    Halted,
    #[serde(alias = "canceled")]
    Cancelled,
    Completed,
    Expired,
    #[serde(other)]
    Unknown,
}

/// `data` of `GET /subscription/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    #[serde(default)]
    pub status: Option<SubscriptionState>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub registration_paid: bool,
}

impl SubscriptionStatus {
    /// Active or authenticated (mandate set up, first charge pending).
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            Some(SubscriptionState::Active) | Some(SubscriptionState::Authenticated)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order_aliases() {
        let order: RegistrationOrder =
            serde_json::from_str(r#"{"razorpayOrderId":"order_1","amount":99900}"#).unwrap();
        assert_eq!(order.order_id, "order_1");
        assert_eq!(order.currency, "INR");
    }

    #[test]
    fn test_subscription_status() {
        let status: SubscriptionStatus =
            serde_json::from_str(r#"{"status":"authenticated","registrationPaid":true}"#).unwrap();
        assert!(status.is_active());
        assert!(status.registration_paid);

        let status: SubscriptionStatus = serde_json::from_str(r#"{"status":"halted"}"#).unwrap();
        assert!(!status.is_active());

        assert!(!SubscriptionStatus::default().is_active());
    }
}
