use serde_json::Value;

use super::segment;
use crate::api::{ApiClient, ApiError};
use crate::models::{
    AddToCartRequest, Cart, CartResponse, CheckoutOrder, CreateOrderRequest, UpdateCartRequest,
};
use crate::payment::{PaymentConfirmation, PaymentReceipt};

/// Shopping cart and checkout.
pub struct CartService<'a> {
    pub(crate) client: &'a ApiClient,
}

impl CartService<'_> {
    pub async fn cart(&self) -> Result<Cart, ApiError> {
        let response: CartResponse = self.client.get("/cart").await?;
        Ok(response.cart)
    }

    pub async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<Cart, ApiError> {
        let body = AddToCartRequest {
            product_id: segment(product_id)?.to_string(),
            quantity: quantity.max(1),
        };
        let response: CartResponse = self.client.post("/cart/add", &body).await?;
        Ok(response.cart)
    }

    /// Set the quantity of a line. Zero removes the line.
    pub async fn update_cart_item(&self, product_id: &str, quantity: u32) -> Result<Cart, ApiError> {
        if quantity == 0 {
            return self.remove_from_cart(product_id).await;
        }
        let body = UpdateCartRequest {
            product_id: segment(product_id)?.to_string(),
            quantity,
        };
        let response: CartResponse = self.client.put("/cart/update", &body).await?;
        Ok(response.cart)
    }

    pub async fn remove_from_cart(&self, product_id: &str) -> Result<Cart, ApiError> {
        let path = format!("/cart/remove/{}", segment(product_id)?);
        let response: CartResponse = self.client.delete(&path).await?;
        Ok(response.cart)
    }

    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        self.client.delete::<Value>("/cart/clear").await?;
        Ok(())
    }

    /// Create the order and its gateway order for the hosted checkout.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<CheckoutOrder, ApiError> {
        self.client.post("/checkout/create-order", request).await
    }

    pub async fn verify_payment(
        &self,
        confirmation: &PaymentConfirmation,
    ) -> Result<PaymentReceipt, ApiError> {
        let receipt: Option<PaymentReceipt> = self
            .client
            .post("/checkout/verify-payment", confirmation)
            .await?;
        Ok(receipt.unwrap_or_default())
    }
}
