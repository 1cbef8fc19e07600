//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
pub enum DomainEvent {
    Order(OrderEvent),
}

#[derive(Clone, Debug, Serialize)]
pub enum OrderEvent {
    Placed { order_id: Uuid, total: Decimal },
    Paid { order_id: Uuid },
    Failed { order_id: Uuid },
}

impl DomainEvent {
    /// Message-bus subject the event is published under.
    pub fn subject(&self) -> &'static str {
        match self {
            DomainEvent::Order(OrderEvent::Placed { .. }) => "orders.placed",
            DomainEvent::Order(OrderEvent::Paid { .. }) => "orders.paid",
            DomainEvent::Order(OrderEvent::Failed { .. }) => "orders.failed",
        }
    }
}
