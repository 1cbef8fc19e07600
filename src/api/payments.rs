//! Payment verification handler
//!
//! The only code path that can move an order to `paid`. The client-side
//! widget callback is treated as a claim, never as proof.

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use super::{AppState, VerifyPaymentRequest, VerifyPaymentResponse};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::gateway::signature::verify_payment_signature;

pub async fn verify_payment(State(s): State<AppState>, Json(r): Json<VerifyPaymentRequest>) -> Result<Json<VerifyPaymentResponse>, (StatusCode, String)> {
    let valid = verify_payment_signature(
        &r.razorpay_order_id,
        &r.razorpay_payment_id,
        &r.razorpay_signature,
        &s.config.gateway.key_secret,
    );

    if !valid {
        tracing::warn!(gateway_order_id = %r.razorpay_order_id, "payment signature mismatch");
        let failed: Option<(Uuid,)> = sqlx::query_as(
            "UPDATE orders SET status = 'failed', updated_at = NOW() WHERE gateway_order_id = $1 AND status = 'pending' RETURNING id")
            .bind(&r.razorpay_order_id)
            .fetch_optional(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        if let Some((order_id,)) = failed {
            s.events.publish(&DomainEvent::Order(OrderEvent::Failed { order_id })).await;
        }
        return Ok(Json(VerifyPaymentResponse { success: false }));
    }

    let paid: Option<(Uuid,)> = sqlx::query_as(
        "UPDATE orders SET status = 'paid', updated_at = NOW() WHERE gateway_order_id = $1 AND status = 'pending' RETURNING id")
        .bind(&r.razorpay_order_id)
        .fetch_optional(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match paid {
        Some((order_id,)) => {
            tracing::info!(%order_id, gateway_order_id = %r.razorpay_order_id, "payment verified");
            s.events.publish(&DomainEvent::Order(OrderEvent::Paid { order_id })).await;
            Ok(Json(VerifyPaymentResponse { success: true }))
        }
        None => {
            // Valid signature but no pending order: duplicate callback on an
            // already-paid order is fine, anything else is not.
            let status: Option<(String,)> = sqlx::query_as("SELECT status FROM orders WHERE gateway_order_id = $1")
                .bind(&r.razorpay_order_id)
                .fetch_optional(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
            let success = matches!(status, Some((ref st,)) if st == "paid");
            Ok(Json(VerifyPaymentResponse { success }))
        }
    }
}
