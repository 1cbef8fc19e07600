//! Payment handshake
//!
//! Drives the three-phase payment lifecycle: submit the order, collect
//! payment in the gateway widget, verify server-side. The cart is cleared
//! and the order marked paid only after the verification endpoint confirms
//! the signature; the widget's own success callback is never trusted.
//!
//! State machine:
//!
//! ```text
//! Idle -> AwaitingGatewayReference -> WidgetOpen -> Verifying -> Confirmed
//!                                         |             |
//!                                     (dismiss)     (reject/error)
//!                                         v             v
//!                                       Failed        Failed
//! ```
//!
//! The widget is closed on every terminal path; it must never remain
//! interactive after the handshake settles.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::api::VerifyPaymentRequest;
use crate::checkout::submission::{OrderSubmission, StorefrontApi};
use crate::domain::aggregates::order::Buyer;
use crate::store::CartStore;
use crate::CheckoutError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeState {
    Idle,
    AwaitingGatewayReference,
    WidgetOpen,
    Verifying,
    Confirmed,
    Failed,
}

/// Parameters handed to the gateway widget when it opens.
#[derive(Clone, Debug)]
pub struct WidgetOptions {
    pub key_id: String,
    pub gateway_order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub shop_name: String,
    pub description: String,
    pub prefill_name: String,
    pub prefill_email: String,
    pub prefill_contact: String,
}

/// What the widget reported when it settled.
#[derive(Clone, Debug)]
pub enum WidgetOutcome {
    /// The buyer completed payment; the payload is the gateway callback to
    /// be verified server-side.
    Completed(VerifyPaymentRequest),
    /// The buyer dismissed the widget.
    Dismissed,
}

#[async_trait]
pub trait PaymentWidget: Send {
    /// Waits for the buyer to settle the widget, however long that takes.
    async fn collect(&mut self) -> WidgetOutcome;
    fn close(&mut self);
}

pub trait WidgetFactory: Send + Sync {
    fn create(&self, options: WidgetOptions) -> Box<dyn PaymentWidget>;
}

/// Terminal result of a handshake that got as far as opening the widget.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Route to the success view, keyed by the gateway order reference.
    Confirmed { gateway_order_id: String },
    /// Route to the failure view; the cart keeps its lines.
    Failed { reason: CheckoutError },
}

pub struct PaymentHandshake {
    api: Arc<dyn StorefrontApi>,
    widgets: Arc<dyn WidgetFactory>,
    key_id: String,
    shop_name: String,
    state: HandshakeState,
}

impl PaymentHandshake {
    pub fn new(api: Arc<dyn StorefrontApi>, widgets: Arc<dyn WidgetFactory>, key_id: impl Into<String>, shop_name: impl Into<String>) -> Self {
        Self {
            api,
            widgets,
            key_id: key_id.into(),
            shop_name: shop_name.into(),
            state: HandshakeState::Idle,
        }
    }

    pub fn state(&self) -> HandshakeState { self.state }

    /// Runs one checkout attempt end to end.
    ///
    /// Pre-widget failures (empty cart, submission failure, missing gateway
    /// reference) come back as `Err` and reset the handshake to `Idle`: the
    /// buyer stays on the checkout page with the cart intact. Once the
    /// widget has opened, the attempt always settles into a terminal
    /// [`CheckoutOutcome`].
    pub async fn run(&mut self, cart: &mut CartStore, buyer: &Buyer) -> crate::Result<CheckoutOutcome> {
        self.state = HandshakeState::Idle;
        let snapshot = cart.snapshot();

        self.state = HandshakeState::AwaitingGatewayReference;
        let submission = OrderSubmission::new(self.api.clone());
        let submitted = match submission.submit(buyer, &snapshot).await {
            Ok(submitted) => submitted,
            Err(e) => {
                self.state = HandshakeState::Idle;
                return Err(e);
            }
        };
        let gateway_order_id = submitted.gateway_order_id;

        let mut widget = self.widgets.create(WidgetOptions {
            key_id: self.key_id.clone(),
            gateway_order_id: gateway_order_id.clone(),
            amount_minor: submitted.amount_minor,
            currency: submitted.currency,
            shop_name: self.shop_name.clone(),
            description: "Order Payment".to_string(),
            prefill_name: buyer.full_name(),
            prefill_email: buyer.email.clone(),
            prefill_contact: buyer.phone.clone(),
        });
        self.state = HandshakeState::WidgetOpen;

        match widget.collect().await {
            WidgetOutcome::Dismissed => {
                widget.close();
                self.state = HandshakeState::Failed;
                info!(%gateway_order_id, "payment widget dismissed");
                Ok(CheckoutOutcome::Failed { reason: CheckoutError::WidgetCancelled })
            }
            WidgetOutcome::Completed(payload) => {
                self.state = HandshakeState::Verifying;
                // A transport error during verification is indistinguishable
                // from a rejection for the buyer; the order stays on the
                // server for manual reconciliation.
                let verified = match self.api.verify_payment(&payload).await {
                    Ok(response) => response.success,
                    Err(e) => {
                        warn!(%gateway_order_id, "verification call failed: {e}");
                        false
                    }
                };
                widget.close();
                if verified {
                    cart.clear();
                    self.state = HandshakeState::Confirmed;
                    info!(%gateway_order_id, "payment confirmed");
                    Ok(CheckoutOutcome::Confirmed { gateway_order_id })
                } else {
                    self.state = HandshakeState::Failed;
                    Ok(CheckoutOutcome::Failed { reason: CheckoutError::VerificationFailed })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CreateOrderRequest, OrderCreatedResponse, VerifyPaymentResponse};
    use crate::domain::aggregates::cart::CartLine;
    use crate::domain::value_objects::Money;
    use crate::store::{CartStore, MemoryStorage};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, Ordering};
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

    fn cart_with_line() -> CartStore {
        let mut cart = CartStore::open(Box::new(MemoryStorage::default()), "INR");
        cart.add(CartLine {
            product_id: "A".into(), name: "Mug".into(),
            unit_price: Money::inr(Decimal::new(500, 0)), quantity: 1,
            image: "/img/mug.png".into(), color: None, size: Some("M".into()),
            custom_text: None, custom_image: None,
        });
        cart
    }

    fn callback(order_id: &str) -> VerifyPaymentRequest {
        VerifyPaymentRequest {
            razorpay_order_id: order_id.into(),
            razorpay_payment_id: "pay_456".into(),
            razorpay_signature: "sig".into(),
        }
    }

    struct ScriptedApi {
        create_response: Mutex<Option<anyhow::Result<OrderCreatedResponse>>>,
        verify_response: Mutex<Option<anyhow::Result<VerifyPaymentResponse>>>,
        create_calls: Mutex<Vec<CreateOrderRequest>>,
        verify_calls: Mutex<Vec<VerifyPaymentRequest>>,
    }

    impl ScriptedApi {
        fn new(
            create: Option<anyhow::Result<OrderCreatedResponse>>,
            verify: Option<anyhow::Result<VerifyPaymentResponse>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                create_response: Mutex::new(create),
                verify_response: Mutex::new(verify),
                create_calls: Mutex::new(vec![]),
                verify_calls: Mutex::new(vec![]),
            })
        }

        fn creating(reference: &str) -> Option<anyhow::Result<OrderCreatedResponse>> {
            Some(Ok(OrderCreatedResponse {
                order_id: Uuid::now_v7(),
                gateway_order_id: Some(reference.into()),
                gateway_amount: 50000,
                currency: "INR".into(),
            }))
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

    struct ScriptedWidget {
        outcome: Option<WidgetOutcome>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl PaymentWidget for ScriptedWidget {
        async fn collect(&mut self) -> WidgetOutcome {
            self.outcome.take().expect("widget settled twice")
        }
        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    struct ScriptedFactory {
        outcome: Mutex<Option<WidgetOutcome>>,
        closed: Arc<AtomicBool>,
        options_seen: Mutex<Vec<WidgetOptions>>,
    }

    impl ScriptedFactory {
        fn new(outcome: WidgetOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Some(outcome)),
                closed: Arc::new(AtomicBool::new(false)),
                options_seen: Mutex::new(vec![]),
            })
        }
    }

    impl WidgetFactory for ScriptedFactory {
        fn create(&self, options: WidgetOptions) -> Box<dyn PaymentWidget> {
            self.options_seen.lock().unwrap().push(options);
            Box::new(ScriptedWidget {
                outcome: self.outcome.lock().unwrap().take(),
                closed: self.closed.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_confirmed_path_clears_cart() {
        let api = ScriptedApi::new(
            ScriptedApi::creating("order_123"),
            Some(Ok(VerifyPaymentResponse { success: true })),
        );
        let widgets = ScriptedFactory::new(WidgetOutcome::Completed(callback("order_123")));
        let mut handshake = PaymentHandshake::new(api.clone(), widgets.clone(), "rzp_test_key", "Print Studio");
        let mut cart = cart_with_line();

        let outcome = handshake.run(&mut cart, &buyer()).await.unwrap();
        match outcome {
            CheckoutOutcome::Confirmed { gateway_order_id } => assert_eq!(gateway_order_id, "order_123"),
            other => panic!("expected confirmation, got {other:?}"),
        }
        assert!(cart.is_empty());
        assert_eq!(handshake.state(), HandshakeState::Confirmed);
        assert!(widgets.closed.load(Ordering::SeqCst));
        assert_eq!(widgets.options_seen.lock().unwrap()[0].gateway_order_id, "order_123");
        assert_eq!(widgets.options_seen.lock().unwrap()[0].amount_minor, 50000);
    }

    #[tokio::test]
    async fn test_widget_success_alone_does_not_clear_cart() {
        // The widget reports completion but the server rejects the
        // signature. The cart must keep its lines.
        let api = ScriptedApi::new(
            ScriptedApi::creating("order_123"),
            Some(Ok(VerifyPaymentResponse { success: false })),
        );
        let widgets = ScriptedFactory::new(WidgetOutcome::Completed(callback("order_123")));
        let mut handshake = PaymentHandshake::new(api.clone(), widgets.clone(), "rzp_test_key", "Print Studio");
        let mut cart = cart_with_line();

        let outcome = handshake.run(&mut cart, &buyer()).await.unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Failed { reason: CheckoutError::VerificationFailed }));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(handshake.state(), HandshakeState::Failed);
        assert!(widgets.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_verification_transport_error_fails_closed() {
        let api = ScriptedApi::new(
            ScriptedApi::creating("order_123"),
            Some(Err(anyhow::anyhow!("timed out"))),
        );
        let widgets = ScriptedFactory::new(WidgetOutcome::Completed(callback("order_123")));
        let mut handshake = PaymentHandshake::new(api, widgets.clone(), "rzp_test_key", "Print Studio");
        let mut cart = cart_with_line();

        let outcome = handshake.run(&mut cart, &buyer()).await.unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Failed { reason: CheckoutError::VerificationFailed }));
        assert_eq!(cart.line_count(), 1);
        assert!(widgets.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dismissal_skips_verification() {
        let api = ScriptedApi::new(ScriptedApi::creating("order_123"), None);
        let widgets = ScriptedFactory::new(WidgetOutcome::Dismissed);
        let mut handshake = PaymentHandshake::new(api.clone(), widgets.clone(), "rzp_test_key", "Print Studio");
        let mut cart = cart_with_line();

        let outcome = handshake.run(&mut cart, &buyer()).await.unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Failed { reason: CheckoutError::WidgetCancelled }));
        assert!(api.verify_calls.lock().unwrap().is_empty());
        assert_eq!(cart.line_count(), 1);
        assert!(widgets.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_empty_cart_stops_before_widget() {
        let api = ScriptedApi::new(ScriptedApi::creating("order_123"), None);
        let widgets = ScriptedFactory::new(WidgetOutcome::Dismissed);
        let mut handshake = PaymentHandshake::new(api.clone(), widgets.clone(), "rzp_test_key", "Print Studio");
        let mut cart = CartStore::open(Box::new(MemoryStorage::default()), "INR");

        let result = handshake.run(&mut cart, &buyer()).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(api.create_calls.lock().unwrap().is_empty());
        assert!(widgets.options_seen.lock().unwrap().is_empty());
        assert_eq!(handshake.state(), HandshakeState::Idle);
    }

    #[tokio::test]
    async fn test_missing_reference_stops_before_widget() {
        let api = ScriptedApi::new(
            Some(Ok(OrderCreatedResponse {
                order_id: Uuid::now_v7(),
                gateway_order_id: None,
                gateway_amount: 50000,
                currency: "INR".into(),
            })),
            None,
        );
        let widgets = ScriptedFactory::new(WidgetOutcome::Dismissed);
        let mut handshake = PaymentHandshake::new(api, widgets.clone(), "rzp_test_key", "Print Studio");
        let mut cart = cart_with_line();

        let result = handshake.run(&mut cart, &buyer()).await;
        assert!(matches!(result, Err(CheckoutError::GatewayReferenceMissing)));
        assert_eq!(cart.line_count(), 1);
        assert!(widgets.options_seen.lock().unwrap().is_empty());
        assert_eq!(handshake.state(), HandshakeState::Idle);
    }

    #[tokio::test]
    async fn test_submission_failure_preserves_cart_for_retry() {
        let api = ScriptedApi::new(Some(Err(anyhow::anyhow!("backend down"))), None);
        let widgets = ScriptedFactory::new(WidgetOutcome::Dismissed);
        let mut handshake = PaymentHandshake::new(api, widgets.clone(), "rzp_test_key", "Print Studio");
        let mut cart = cart_with_line();

        let result = handshake.run(&mut cart, &buyer()).await;
        assert!(matches!(result, Err(CheckoutError::SubmissionFailed(_))));
        assert_eq!(cart.line_count(), 1);
        assert!(widgets.options_seen.lock().unwrap().is_empty());
        assert_eq!(handshake.state(), HandshakeState::Idle);
    }
}
