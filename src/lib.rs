//! Print Studio Storefront
//!
//! Backend and checkout core for a print-on-demand shop.
//!
//! ## Features
//! - Product and category catalog management
//! - Durable shopping cart with merge-by-identity-key semantics
//! - Order submission with payment-gateway order creation
//! - Server-verified payment handshake (HMAC signature check)
//! - Admin order views and dashboard statistics

use thiserror::Error;

pub mod api;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod events;
pub mod gateway;
pub mod store;

// =============================================================================
// Checkout Error Taxonomy
// =============================================================================

/// Errors surfaced by the checkout core. Everything here is caught at the
/// handshake boundary and turned into a route transition; nothing propagates
/// as an unhandled fault.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Checkout attempted with nothing in the cart. Recoverable; the
    /// persistence API is never called.
    #[error("Cart is empty")]
    EmptyCart,

    /// Network or backend failure while creating the order. Recoverable; the
    /// cart is left untouched so the buyer can retry.
    #[error("Order submission failed: {0}")]
    SubmissionFailed(String),

    /// The backend response carried no gateway order reference. Fatal for
    /// this attempt; the payment widget is never opened.
    #[error("Gateway order reference missing in response")]
    GatewayReferenceMissing,

    /// Server-side verification rejected the payment, or the verification
    /// call itself failed. Terminal for this order; the cart is preserved.
    #[error("Payment verification failed")]
    VerificationFailed,

    /// The buyer dismissed the payment widget. Terminal for this order but
    /// not a system fault.
    #[error("Payment widget dismissed")]
    WidgetCancelled,
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
