use serde::Serialize;

use super::segment;
use crate::api::{ApiClient, ApiError};
use crate::models::{ListQuery, Order, OrderList, OrderResponse, StatusUpdate, Tracking};

#[derive(Serialize)]
struct CancelRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

/// Order history and lifecycle.
pub struct OrderService<'a> {
    pub(crate) client: &'a ApiClient,
}

impl OrderService<'_> {
    pub async fn my_orders(&self, query: &ListQuery) -> Result<OrderList, ApiError> {
        self.client.get_query("/orders/my-orders", query).await
    }

    pub async fn order(&self, id: &str) -> Result<Order, ApiError> {
        let path = format!("/orders/{}", segment(id)?);
        let response: OrderResponse = self.client.get(&path).await?;
        Ok(response.order)
    }

    /// Seller/admin status change.
    pub async fn update_status(&self, id: &str, update: &StatusUpdate) -> Result<Order, ApiError> {
        let path = format!("/orders/{}/status", segment(id)?);
        let response: OrderResponse = self.client.put(&path, update).await?;
        Ok(response.order)
    }

    pub async fn track(&self, id: &str) -> Result<Tracking, ApiError> {
        let path = format!("/orders/{}/track", segment(id)?);
        self.client.get(&path).await
    }

    pub async fn cancel(&self, id: &str, reason: Option<&str>) -> Result<Order, ApiError> {
        let path = format!("/orders/{}/cancel", segment(id)?);
        let response: OrderResponse = self.client.put(&path, &CancelRequest { reason }).await?;
        Ok(response.order)
    }
}
