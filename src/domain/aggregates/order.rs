//! Order Aggregate
//!
//! Orders are created `Pending` with a snapshot of the cart lines and a
//! total recomputed from that snapshot. `Paid` and `Failed` are terminal;
//! no transition ever leaves them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::cart::CartLine;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Money;

/// Buyer contact and shipping details captured at checkout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Buyer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

impl Buyer {
    pub fn full_name(&self) -> String { format!("{} {}", self.first_name, self.last_name) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Paid, Failed }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Pending => "pending", Self::Paid => "paid", Self::Failed => "failed" }
    }
    pub fn is_terminal(&self) -> bool { !matches!(self, Self::Pending) }
}

#[derive(Clone, Debug)]
pub struct Order {
    id: Uuid,
    buyer: Buyer,
    lines: Vec<CartLine>,
    total: Money,
    status: OrderStatus,
    gateway_order_id: Option<String>,
    receipt: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Order {
    /// Creates a `Pending` order from a buyer and snapshotted cart lines.
    /// The total is always recomputed here; a client-supplied total is never
    /// trusted. Every line must be priced in the order currency, so the
    /// total always covers the full line list.
    pub fn place(buyer: Buyer, lines: Vec<CartLine>, currency: &str) -> Result<Self, OrderError> {
        if lines.is_empty() { return Err(OrderError::NoItems); }
        if lines.iter().any(|l| l.quantity == 0) { return Err(OrderError::InvalidQuantity); }
        let mut total = Money::zero(currency);
        for line in &lines {
            total = total.add(&line.line_total()).map_err(|_| OrderError::CurrencyMismatch)?;
        }
        let id = Uuid::now_v7();
        let now = Utc::now();
        let mut order = Self {
            id, buyer, lines, total,
            status: OrderStatus::Pending,
            gateway_order_id: None,
            receipt: format!("receipt#{}", now.timestamp_millis()),
            created_at: now, updated_at: now, events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed { order_id: id, total: order.total.amount() }));
        Ok(order)
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn buyer(&self) -> &Buyer { &self.buyer }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn total(&self) -> &Money { &self.total }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn receipt(&self) -> &str { &self.receipt }
    pub fn gateway_order_id(&self) -> Option<&str> { self.gateway_order_id.as_deref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Records the opaque reference issued by the payment gateway.
    pub fn attach_gateway_order(&mut self, reference: impl Into<String>) {
        self.gateway_order_id = Some(reference.into());
        self.touch();
    }

    /// Only server-side signature verification may call this.
    pub fn mark_paid(&mut self) -> Result<(), OrderError> {
        if self.status.is_terminal() { return Err(OrderError::TerminalState); }
        self.status = OrderStatus::Paid;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Paid { order_id: self.id }));
        Ok(())
    }

    pub fn mark_failed(&mut self) -> Result<(), OrderError> {
        if self.status.is_terminal() { return Err(OrderError::TerminalState); }
        self.status = OrderStatus::Failed;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Failed { order_id: self.id }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone)] pub enum OrderError { NoItems, InvalidQuantity, CurrencyMismatch, TerminalState }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoItems => write!(f, "Order has no items"),
            Self::InvalidQuantity => write!(f, "Line quantity must be at least 1"),
            Self::CurrencyMismatch => write!(f, "Line currency does not match order currency"),
            Self::TerminalState => write!(f, "Order is in a terminal state"),
        }
    }
}
