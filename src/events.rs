//! Best-effort publication of domain events.
//!
//! Every event is logged. When a NATS client is configured the event is also
//! published on `storefront.<aggregate>.<kind>`; publish failures are logged
//! and never fail the request that raised the event.

use serde::Serialize;

use crate::domain::events::DomainEvent;

const SUBJECT_PREFIX: &str = "storefront";

#[derive(Serialize)]
struct Envelope<'a> {
    aggregate_id: &'a str,
    occurred_at: chrono::DateTime<chrono::Utc>,
    #[serde(flatten)]
    event: &'a DomainEvent,
}

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    pub async fn publish(&self, aggregate_id: &str, events: Vec<DomainEvent>) {
        for event in events {
            let subject = format!("{SUBJECT_PREFIX}.{}", event.subject());
            tracing::info!(%subject, aggregate_id, ?event, "domain event");
            let Some(nats) = &self.nats else { continue };
            let envelope = Envelope { aggregate_id, occurred_at: chrono::Utc::now(), event: &event };
            let payload = match serde_json::to_vec(&envelope) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(%subject, error = %e, "failed to encode event");
                    continue;
                }
            };
            if let Err(e) = nats.publish(subject.clone(), payload.into()).await {
                tracing::warn!(%subject, error = %e, "failed to publish event");
            }
        }
    }
}
