use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::segment;
use crate::api::{ApiClient, ApiError};
use crate::models::{
    ApplicationList, DashboardStats, ListQuery, ModerationDecision, Order, Product, ProductList,
    ProductResponse, RecentOrders, ReviewDecision, SellerList, User, UserList, UserResponse,
    UserStatusUpdate,
};

/// Dashboard stats plus the latest orders, fetched together.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub stats: DashboardStats,
    pub recent_orders: Vec<Order>,
}

/// Admin console endpoints.
pub struct AdminService<'a> {
    pub(crate) client: &'a ApiClient,
}

impl AdminService<'_> {
    pub async fn users(&self, query: &ListQuery) -> Result<UserList, ApiError> {
        self.client.get_query("/admin/users", query).await
    }

    pub async fn update_user_status(&self, id: &str, is_active: bool) -> Result<User, ApiError> {
        let path = format!("/admin/users/{}/status", segment(id)?);
        let response: UserResponse = self
            .client
            .put(&path, &UserStatusUpdate { is_active })
            .await?;
        Ok(response.user)
    }

    pub async fn sellers(&self, query: &ListQuery) -> Result<SellerList, ApiError> {
        self.client.get_query("/admin/sellers", query).await
    }

    pub async fn seller_applications(&self, query: &ListQuery) -> Result<ApplicationList, ApiError> {
        self.client.get_query("/admin/sellers/applications", query).await
    }

    pub async fn review_application(&self, id: &str, decision: &ReviewDecision) -> Result<(), ApiError> {
        let path = format!("/admin/sellers/applications/{}", segment(id)?);
        self.client.put::<Value, _>(&path, decision).await?;
        info!(application = id, status = ?decision.status, "Seller application reviewed");
        Ok(())
    }

    pub async fn products(&self, query: &ListQuery) -> Result<ProductList, ApiError> {
        self.client.get_query("/admin/products", query).await
    }

    pub async fn moderate_product(
        &self,
        id: &str,
        decision: &ModerationDecision,
    ) -> Result<Product, ApiError> {
        let path = format!("/admin/products/{}/status", segment(id)?);
        let response: ProductResponse = self.client.put(&path, decision).await?;
        Ok(response.product)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.client.get("/admin/dashboard/stats").await
    }

    pub async fn recent_orders(&self) -> Result<Vec<Order>, ApiError> {
        let recent: RecentOrders = self.client.get("/admin/dashboard/recent-orders").await?;
        Ok(recent.orders)
    }

    /// Fetch stats and recent orders concurrently.
    pub async fn overview(&self) -> Result<AdminOverview, ApiError> {
        let (stats, recent_orders) = tokio::join!(self.dashboard_stats(), self.recent_orders());
        Ok(AdminOverview {
            stats: stats?,
            recent_orders: recent_orders?,
        })
    }
}
