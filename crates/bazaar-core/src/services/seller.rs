use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::segment;
use crate::api::{ApiClient, ApiError};
use crate::models::{
    ApplicationStatus, ListQuery, NewProduct, OrderList, Product, ProductList, ProductResponse,
    SellerApplication, SellerApplicationRecord, SellerDashboard,
};

#[derive(Deserialize)]
struct Submitted {
    #[serde(default)]
    application: Option<SellerApplicationRecord>,
}

/// Seller console: application, catalog management, dashboard.
pub struct SellerService<'a> {
    pub(crate) client: &'a ApiClient,
}

impl SellerService<'_> {
    /// Submit the onboarding application. Returns the stored record when
    /// the server echoes it back.
    pub async fn apply(
        &self,
        application: &SellerApplication,
    ) -> Result<Option<SellerApplicationRecord>, ApiError> {
        let submitted: Option<Submitted> = self.client.post("/seller/apply", application).await?;
        info!(business = %application.business_name, "Seller application submitted");
        Ok(submitted.and_then(|s| s.application))
    }

    pub async fn application_status(&self) -> Result<ApplicationStatus, ApiError> {
        let status: Option<ApplicationStatus> = self.client.get("/seller/application/status").await?;
        Ok(status.unwrap_or_default())
    }

    pub async fn products(&self, query: &ListQuery) -> Result<ProductList, ApiError> {
        self.client.get_query("/seller/products", query).await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let response: ProductResponse = self.client.post("/seller/products", product).await?;
        Ok(response.product)
    }

    pub async fn update_product(&self, id: &str, product: &NewProduct) -> Result<Product, ApiError> {
        let path = format!("/seller/products/{}", segment(id)?);
        let response: ProductResponse = self.client.put(&path, product).await?;
        Ok(response.product)
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/seller/products/{}", segment(id)?);
        self.client.delete::<Value>(&path).await?;
        Ok(())
    }

    pub async fn dashboard(&self) -> Result<SellerDashboard, ApiError> {
        self.client.get("/seller/dashboard").await
    }

    pub async fn orders(&self, query: &ListQuery) -> Result<OrderList, ApiError> {
        self.client.get_query("/seller/orders", query).await
    }
}
