use crate::api::{ApiClient, ApiError};
use crate::models::{
    CreateSubscriptionRequest, Plan, PlanList, RegistrationOrder, SubscriptionOrder,
    SubscriptionStatus,
};
use crate::payment::{PaymentConfirmation, PaymentReceipt};

/// Seller registration fee and recurring plan billing.
pub struct SubscriptionService<'a> {
    pub(crate) client: &'a ApiClient,
}

impl SubscriptionService<'_> {
    pub async fn plans(&self) -> Result<Vec<Plan>, ApiError> {
        let list: PlanList = self.client.get("/subscription/plans").await?;
        Ok(list.plans)
    }

    pub async fn create_registration(&self) -> Result<RegistrationOrder, ApiError> {
        self.client
            .post("/subscription/registration/create", &serde_json::json!({}))
            .await
    }

    pub async fn verify_registration(
        &self,
        confirmation: &PaymentConfirmation,
    ) -> Result<PaymentReceipt, ApiError> {
        let receipt: Option<PaymentReceipt> = self
            .client
            .post("/subscription/registration/verify", confirmation)
            .await?;
        Ok(receipt.unwrap_or_default())
    }

    pub async fn create(&self, plan_id: &str) -> Result<SubscriptionOrder, ApiError> {
        let body = CreateSubscriptionRequest {
            plan_id: plan_id.to_string(),
        };
        self.client.post("/subscription/create", &body).await
    }

    pub async fn verify(&self, confirmation: &PaymentConfirmation) -> Result<PaymentReceipt, ApiError> {
        let receipt: Option<PaymentReceipt> =
            self.client.post("/subscription/verify", confirmation).await?;
        Ok(receipt.unwrap_or_default())
    }

    pub async fn status(&self) -> Result<SubscriptionStatus, ApiError> {
        let status: Option<SubscriptionStatus> = self.client.get("/subscription/status").await?;
        Ok(status.unwrap_or_default())
    }
}
