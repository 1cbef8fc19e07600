//! Order lifecycle event publishing
//!
//! Publishing is best-effort: a missing or unreachable broker downgrades to
//! a no-op and never blocks the request path.

use tracing::warn;

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    client: Option<async_nats::Client>,
}

impl EventPublisher {
    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::default() };
        match async_nats::connect(url).await {
            Ok(client) => Self { client: Some(client) },
            Err(e) => {
                warn!("event broker unavailable, publishing disabled: {e}");
                Self::default()
            }
        }
    }

    pub fn disabled() -> Self { Self::default() }

    pub async fn publish(&self, event: &DomainEvent) {
        let Some(client) = &self.client else { return };
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("unserializable event dropped: {e}");
                return;
            }
        };
        if let Err(e) = client.publish(event.subject(), payload.into()).await {
            warn!("event publish failed: {e}");
        }
    }
}
