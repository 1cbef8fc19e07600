//! Checkout core
//!
//! Client-side half of the order lifecycle: turning a cart snapshot into a
//! pending order and driving the payment widget through verification.

pub mod handshake;
pub mod submission;

pub use handshake::{CheckoutOutcome, HandshakeState, PaymentHandshake, PaymentWidget, WidgetFactory, WidgetOptions, WidgetOutcome};
pub use submission::{OrderSubmission, StorefrontApi, SubmittedOrder};
