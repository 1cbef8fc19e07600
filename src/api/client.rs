//! HTTP implementation of the checkout core's API seam

use async_trait::async_trait;

use super::{CreateOrderRequest, OrderCreatedResponse, VerifyPaymentRequest, VerifyPaymentResponse};
use crate::checkout::submission::StorefrontApi;

pub struct HttpStorefrontApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStorefrontApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), base_url }
    }
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn create_order(&self, order: &CreateOrderRequest) -> anyhow::Result<OrderCreatedResponse> {
        let response = self.http
            .post(format!("{}/orders", self.base_url))
            .json(order)
            .send()
            .await?;
        anyhow::ensure!(response.status().is_success(), "order submission rejected: HTTP {}", response.status());
        Ok(response.json().await?)
    }

    async fn verify_payment(&self, payload: &VerifyPaymentRequest) -> anyhow::Result<VerifyPaymentResponse> {
        let response = self.http
            .post(format!("{}/verify-payment", self.base_url))
            .json(payload)
            .send()
            .await?;
        anyhow::ensure!(response.status().is_success(), "verification rejected: HTTP {}", response.status());
        Ok(response.json().await?)
    }
}
