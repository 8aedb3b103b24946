use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::ProductStatus;
use super::common::{deserialize_ref, Pagination};
use super::order::Order;
use super::seller::ApplicationState;
use super::user::User;

/// `data` of `GET /admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Body of `PUT /admin/users/:id/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusUpdate {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_ref")]
    pub user: Option<String>,
    pub business_name: String,
    #[serde(default)]
    pub business_category: Option<String>,
    #[serde(default)]
    pub status: ApplicationState,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// `data` of `GET /admin/sellers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerList {
    pub sellers: Vec<SellerProfile>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerApplicationRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_ref")]
    pub user: Option<String>,
    pub business_name: String,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub business_category: Option<String>,
    #[serde(default)]
    pub status: ApplicationState,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// `data` of `GET /admin/sellers/applications`. The server has returned
/// both `{applications: [...]}` and a bare array here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "ApplicationListRepr")]
pub struct ApplicationList {
    pub applications: Vec<SellerApplicationRecord>,
    pub pagination: Option<Pagination>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApplicationListRepr {
    Bare(Vec<SellerApplicationRecord>),
    Wrapped {
        #[serde(default)]
        applications: Vec<SellerApplicationRecord>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
}

impl From<ApplicationListRepr> for ApplicationList {
    fn from(repr: ApplicationListRepr) -> Self {
        match repr {
            ApplicationListRepr::Wrapped {
                applications,
                pagination,
            } => ApplicationList {
                applications,
                pagination,
            },
            ApplicationListRepr::Bare(applications) => ApplicationList {
                applications,
                pagination: None,
            },
        }
    }
}

/// Body of `PUT /admin/sellers/applications/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDecision {
    pub status: ApplicationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ReviewDecision {
    pub fn approve() -> Self {
        Self {
            status: ApplicationState::Approved,
            rejection_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            status: ApplicationState::Rejected,
            rejection_reason: Some(reason.into()),
        }
    }
}

/// Body of `PUT /admin/products/:id/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationDecision {
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `data` of `GET /admin/dashboard/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_sellers: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub pending_applications: u64,
    pub pending_products: u64,
}

/// `data` of `GET /admin/dashboard/recent-orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentOrders {
    #[serde(default)]
    pub orders: Vec<Order>,
}
