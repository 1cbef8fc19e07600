//! REST surface
//!
//! Wire types are shared between the axum handlers and the client-core
//! [`client::HttpStorefrontApi`], so both ends of every endpoint agree on
//! shape by construction.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::domain::aggregates::cart::{CartLine, CartSnapshot};
use crate::domain::aggregates::order::{Buyer, OrderStatus};
use crate::events::EventPublisher;
use crate::gateway::PaymentGateway;

pub mod categories;
pub mod client;
pub mod dashboard;
pub mod orders;
pub mod payments;
pub mod products;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub gateway: Arc<dyn PaymentGateway>,
    pub events: EventPublisher,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

/// Body of `POST /orders`: buyer fields plus the snapshotted cart lines.
/// The total is recomputed server-side and never accepted from the client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub zip_code: String,
    #[serde(default)]
    pub additional_notes: Option<String>,
    #[validate(length(min = 1))]
    pub cart_items: Vec<CartLine>,
}

impl CreateOrderRequest {
    pub fn from_parts(buyer: &Buyer, snapshot: &CartSnapshot) -> Self {
        Self {
            first_name: buyer.first_name.clone(),
            last_name: buyer.last_name.clone(),
            email: buyer.email.clone(),
            phone: buyer.phone.clone(),
            address: buyer.address.clone(),
            city: buyer.city.clone(),
            zip_code: buyer.zip_code.clone(),
            additional_notes: buyer.additional_notes.clone(),
            cart_items: snapshot.lines.clone(),
        }
    }

    pub fn buyer(&self) -> Buyer {
        Buyer {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            zip_code: self.zip_code.clone(),
            additional_notes: self.additional_notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedResponse {
    pub order_id: Uuid,
    /// Opaque reference issued by the payment gateway. Absence is fatal to
    /// the checkout attempt: the widget must not open without it.
    #[serde(default)]
    pub gateway_order_id: Option<String>,
    pub gateway_amount: i64,
    pub currency: String,
}

/// Raw gateway callback payload, forwarded verbatim for verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub pending_orders: i64,
}
