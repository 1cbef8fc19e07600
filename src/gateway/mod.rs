//! Payment gateway client
//!
//! `POST /orders` creates a gateway order alongside the persisted one, so
//! the storefront widget can collect payment against the gateway's opaque
//! order reference.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GatewayConfig;

pub mod signature;

/// Order handle issued by the gateway for one payment attempt.
#[derive(Clone, Debug, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in minor units, echoed back by the gateway.
    pub amount: i64,
    pub currency: String,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Gateway rejected order creation: HTTP {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, amount_minor: i64, currency: &str, receipt: &str) -> Result<GatewayOrder, GatewayError>;
}

/// Razorpay Orders API client.
pub struct RazorpayGateway {
    http: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

impl RazorpayGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, amount_minor: i64, currency: &str, receipt: &str) -> Result<GatewayOrder, GatewayError> {
        let response = self.http
            .post(format!("{}/v1/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody { amount: amount_minor, currency, receipt })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GatewayError::Rejected(response.status().as_u16()));
        }
        Ok(response.json::<GatewayOrder>().await?)
    }
}
