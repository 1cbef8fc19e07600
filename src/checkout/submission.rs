//! Order submission
//!
//! Converts a cart snapshot plus buyer details into a persisted pending
//! order with a gateway-ready payment handle. The cart itself is never
//! touched here; on any failure the buyer keeps their lines and can retry.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{CreateOrderRequest, OrderCreatedResponse, VerifyPaymentRequest, VerifyPaymentResponse};
use crate::domain::aggregates::cart::CartSnapshot;
use crate::domain::aggregates::order::Buyer;
use crate::CheckoutError;

/// The persistence API as seen from the checkout core. Implemented over
/// HTTP by [`crate::api::client::HttpStorefrontApi`]; tests substitute
/// their own.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    async fn create_order(&self, order: &CreateOrderRequest) -> anyhow::Result<OrderCreatedResponse>;
    async fn verify_payment(&self, payload: &VerifyPaymentRequest) -> anyhow::Result<VerifyPaymentResponse>;
}

/// A successfully submitted order. Unlike the wire response, the gateway
/// reference here is not optional: holding a `SubmittedOrder` means the
/// widget has everything it needs.
#[derive(Clone, Debug)]
pub struct SubmittedOrder {
    pub order_id: uuid::Uuid,
    pub gateway_order_id: String,
    pub amount_minor: i64,
    pub currency: String,
}

pub struct OrderSubmission {
    api: Arc<dyn StorefrontApi>,
}

impl OrderSubmission {
    pub fn new(api: Arc<dyn StorefrontApi>) -> Self { Self { api } }

    /// Submits the snapshot. Guarantees: an empty snapshot never reaches the
    /// network, and a response without a gateway reference never reaches the
    /// widget.
    pub async fn submit(&self, buyer: &Buyer, snapshot: &CartSnapshot) -> crate::Result<SubmittedOrder> {
        if snapshot.lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let request = CreateOrderRequest::from_parts(buyer, snapshot);
        let response = self.api.create_order(&request).await
            .map_err(|e| CheckoutError::SubmissionFailed(e.to_string()))?;
        match response.gateway_order_id {
            Some(reference) if !reference.is_empty() => Ok(SubmittedOrder {
                order_id: response.order_id,
                gateway_order_id: reference,
                amount_minor: response.gateway_amount,
                currency: response.currency,
            }),
            _ => Err(CheckoutError::GatewayReferenceMissing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::{Cart, CartLine};
    use crate::domain::value_objects::Money;
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use uuid::Uuid;

    fn buyer() -> Buyer {
        Buyer {
            first_name: "Asha".into(), last_name: "Rao".into(),
            email: "asha@example.com".into(), phone: "9999999999".into(),
            address: "12 MG Road".into(), city: "Pune".into(), zip_code: "411001".into(),
            additional_notes: None,
        }
    }

    fn line() -> CartLine {
        CartLine {
            product_id: "A".into(), name: "Mug".into(),
            unit_price: Money::inr(Decimal::new(500, 0)), quantity: 1,
            image: "/img/mug.png".into(), color: None, size: Some("M".into()),
            custom_text: None, custom_image: None,
        }
    }

    /// Scripted API double that records every call it receives.
    struct ScriptedApi {
        pub create_response: Mutex<Option<anyhow::Result<OrderCreatedResponse>>>,
        pub verify_response: Mutex<Option<anyhow::Result<VerifyPaymentResponse>>>,
        pub create_calls: Mutex<Vec<CreateOrderRequest>>,
        pub verify_calls: Mutex<Vec<VerifyPaymentRequest>>,
    }

    impl ScriptedApi {
        pub fn new(
            create: Option<anyhow::Result<OrderCreatedResponse>>,
            verify: Option<anyhow::Result<VerifyPaymentResponse>>,
        ) -> Self {
            Self {
                create_response: Mutex::new(create),
                verify_response: Mutex::new(verify),
                create_calls: Mutex::new(vec![]),
                verify_calls: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl StorefrontApi for ScriptedApi {
        async fn create_order(&self, order: &CreateOrderRequest) -> anyhow::Result<OrderCreatedResponse> {
            self.create_calls.lock().unwrap().push(order.clone());
            self.create_response.lock().unwrap().take().unwrap_or_else(|| anyhow::bail!("unscripted"))
        }
        async fn verify_payment(&self, payload: &VerifyPaymentRequest) -> anyhow::Result<VerifyPaymentResponse> {
            self.verify_calls.lock().unwrap().push(payload.clone());
            self.verify_response.lock().unwrap().take().unwrap_or_else(|| anyhow::bail!("unscripted"))
        }
    }

    fn created(reference: Option<&str>) -> OrderCreatedResponse {
        OrderCreatedResponse {
            order_id: Uuid::now_v7(),
            gateway_order_id: reference.map(Into::into),
            gateway_amount: 50000,
            currency: "INR".into(),
        }
    }

    #[tokio::test]
    async fn test_empty_cart_never_calls_api() {
        let api = Arc::new(ScriptedApi::new(Some(Ok(created(Some("order_123")))), None));
        let submission = OrderSubmission::new(api.clone());
        let snapshot = Cart::new("INR").snapshot();
        assert!(matches!(submission.submit(&buyer(), &snapshot).await, Err(CheckoutError::EmptyCart)));
        assert!(api.create_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_returns_gateway_reference() {
        let api = Arc::new(ScriptedApi::new(Some(Ok(created(Some("order_123")))), None));
        let submission = OrderSubmission::new(api.clone());
        let mut cart = Cart::new("INR");
        cart.add(line());
        let submitted = submission.submit(&buyer(), &cart.snapshot()).await.unwrap();
        assert_eq!(submitted.gateway_order_id, "order_123");
        assert_eq!(submitted.amount_minor, 50000);
        assert_eq!(api.create_calls.lock().unwrap()[0].cart_items.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_reference_is_fatal() {
        let api = Arc::new(ScriptedApi::new(Some(Ok(created(None))), None));
        let submission = OrderSubmission::new(api);
        let mut cart = Cart::new("INR");
        cart.add(line());
        assert!(matches!(
            submission.submit(&buyer(), &cart.snapshot()).await,
            Err(CheckoutError::GatewayReferenceMissing)
        ));
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_submission_failed() {
        let api = Arc::new(ScriptedApi::new(Some(Err(anyhow::anyhow!("connection refused"))), None));
        let submission = OrderSubmission::new(api);
        let mut cart = Cart::new("INR");
        cart.add(line());
        assert!(matches!(
            submission.submit(&buyer(), &cart.snapshot()).await,
            Err(CheckoutError::SubmissionFailed(_))
        ));
    }
}
