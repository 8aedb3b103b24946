use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::Order;

/// Category used when the applicant leaves business category empty.
pub const DEFAULT_BUSINESS_CATEGORY: &str = "general";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(alias = "postalCode", alias = "zipCode")]
    pub pincode: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_holder_name: String,
    pub account_number: String,
    #[serde(alias = "ifsc")]
    pub ifsc_code: String,
    pub bank_name: String,
}

impl BankDetails {
    /// Account number with all but the last four digits hidden.
    pub fn masked_account(&self) -> String {
        let digits: Vec<char> = self.account_number.chars().collect();
        if digits.len() <= 4 {
            return self.account_number.clone();
        }
        let visible: String = digits[digits.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(digits.len() - 4), visible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pan,
    Gst,
    AddressProof,
    CancelledCheque,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerDocument {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    /// Hosted URL returned by the media upload endpoint
    pub url: String,
}

/// Body of `POST /seller/apply`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerApplication {
    pub business_name: String,
    pub business_type: String,
    #[serde(default)]
    pub business_category: String,
    pub business_description: String,
    #[serde(alias = "phoneNumber")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    pub pan_number: String,
    pub business_address: BusinessAddress,
    pub bank_details: BankDetails,
    #[serde(default)]
    pub documents: Vec<SellerDocument>,
}

impl SellerApplication {
    /// Required fields left blank, by wire name.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required = [
            ("businessName", &self.business_name),
            ("businessType", &self.business_type),
            ("businessDescription", &self.business_description),
            ("phone", &self.phone),
            ("panNumber", &self.pan_number),
            ("businessAddress.street", &self.business_address.street),
            ("businessAddress.city", &self.business_address.city),
            ("businessAddress.state", &self.business_address.state),
            ("businessAddress.pincode", &self.business_address.pincode),
            ("bankDetails.accountHolderName", &self.bank_details.account_holder_name),
            ("bankDetails.accountNumber", &self.bank_details.account_number),
            ("bankDetails.ifscCode", &self.bank_details.ifsc_code),
            ("bankDetails.bankName", &self.bank_details.bank_name),
        ];

        required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Fill defaults the server expects: business category and country.
    pub fn normalized(mut self) -> Self {
        if self.business_category.trim().is_empty() {
            self.business_category = DEFAULT_BUSINESS_CATEGORY.to_string();
        }
        if self.business_address.country.trim().is_empty() {
            self.business_address.country = "India".to_string();
        }
        self.pan_number = self.pan_number.trim().to_ascii_uppercase();
        self.bank_details.ifsc_code = self.bank_details.ifsc_code.trim().to_ascii_uppercase();
        self.gst_number = self
            .gst_number
            .map(|g| g.trim().to_ascii_uppercase())
            .filter(|g| !g.is_empty());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationState {
    #[default]
    #[serde(alias = "none")]
    NotSubmitted,
    Pending,
    #[serde(alias = "in_review")]
    UnderReview,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApplicationState::NotSubmitted => "Not submitted",
            ApplicationState::Pending => "Pending",
            ApplicationState::UnderReview => "Under review",
            ApplicationState::Approved => "Approved",
            ApplicationState::Rejected => "Rejected",
            ApplicationState::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// `data` of `GET /seller/application/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    #[serde(default)]
    pub status: Option<ApplicationState>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub registration_paid: bool,
    #[serde(default)]
    pub subscription_active: bool,
}

impl ApplicationStatus {
    pub fn state(&self) -> ApplicationState {
        self.status.unwrap_or_default()
    }
}

/// `data` of `GET /seller/dashboard`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellerDashboard {
    pub total_products: u64,
    pub active_products: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub total_revenue: f64,
    pub recent_orders: Vec<Order>,
}
