use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Immutable record of a state change, published after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub event_type: String,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub timestamp: DateTime<Utc>,
    pub version: u32,
    pub payload: Value,
}

type EventHandler = Arc<dyn Fn(EventEnvelope) -> BoxFuture<'static, ()> + Send + Sync>;

/// Explicitly constructed publish/subscribe bus: topic string to a list of
/// async handlers. Injected into gateways and use cases rather than reached
/// through a global.
///
/// When event versioning is enabled every topic is prefixed with the current
/// epoch (`v1.`). The prefix is applied uniformly to subscribe and publish,
/// so callers always work with base topic names; the toggle is set once at
/// construction from deployment config, never negotiated at runtime.
pub struct EventPublisher {
    handlers: RwLock<HashMap<String, Vec<EventHandler>>>,
    versioning_enabled: bool,
}

const EVENT_EPOCH: &str = "v1";
const SCHEMA_VERSION: u32 = 1;

impl EventPublisher {
    pub fn new(versioning_enabled: bool) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            versioning_enabled,
        }
    }

    /// Full topic name for a base event type, with the epoch prefix applied
    /// when versioning is on.
    pub fn topic_name(&self, base: &str) -> String {
        if self.versioning_enabled {
            format!("{EVENT_EPOCH}.{base}")
        } else {
            base.to_string()
        }
    }

    pub async fn subscribe<F, Fut>(&self, topic: &str, handler: F)
    where
        F: Fn(EventEnvelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: EventHandler = Arc::new(move |envelope| Box::pin(handler(envelope)));
        self.handlers
            .write()
            .await
            .entry(self.topic_name(topic))
            .or_default()
            .push(handler);
    }

    /// Builds the envelope and dispatches it to every handler subscribed to
    /// the topic, awaiting each in turn. Returns the published envelope.
    pub async fn publish(
        &self,
        event_type: &str,
        aggregate_type: &str,
        aggregate_id: &str,
        payload: Value,
    ) -> EventEnvelope {
        let envelope = EventEnvelope {
            event_id: Uuid::new_v4(),
            event_type: self.topic_name(event_type),
            aggregate_id: aggregate_id.to_string(),
            aggregate_type: aggregate_type.to_string(),
            timestamp: Utc::now(),
            version: SCHEMA_VERSION,
            payload,
        };

        debug!(
            event_type = %envelope.event_type,
            aggregate_id = %envelope.aggregate_id,
            "publishing domain event"
        );

        let handlers = self
            .handlers
            .read()
            .await
            .get(&envelope.event_type)
            .cloned();
        if let Some(handlers) = handlers {
            for handler in handlers {
                handler(envelope.clone()).await;
            }
        }

        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let publisher = EventPublisher::new(false);
        let seen: Arc<Mutex<Vec<EventEnvelope>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        publisher
            .subscribe("fantasy.bet.placed", move |envelope| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(envelope);
                }
            })
            .await;

        publisher
            .publish(
                "fantasy.bet.placed",
                "FantasyBet",
                "bet-1",
                serde_json::json!({"stake": 100}),
            )
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].event_type, "fantasy.bet.placed");
        assert_eq!(seen[0].aggregate_type, "FantasyBet");
        assert_eq!(seen[0].aggregate_id, "bet-1");
        assert_eq!(seen[0].version, 1);
    }

    #[tokio::test]
    async fn test_versioning_prefixes_event_type() {
        let publisher = EventPublisher::new(true);
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        publisher
            .subscribe("fantasy.bet.placed", move |envelope| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(envelope.event_type);
                }
            })
            .await;

        let envelope = publisher
            .publish(
                "fantasy.bet.placed",
                "FantasyBet",
                "bet-1",
                serde_json::json!({}),
            )
            .await;

        assert_eq!(envelope.event_type, "v1.fantasy.bet.placed");
        assert_eq!(seen.lock().unwrap().as_slice(), ["v1.fantasy.bet.placed"]);
    }

    #[tokio::test]
    async fn test_unsubscribed_topic_is_a_no_op() {
        let publisher = EventPublisher::new(false);
        let envelope = publisher
            .publish("fantasy.nobody.listens", "X", "1", serde_json::json!({}))
            .await;
        assert_eq!(envelope.event_type, "fantasy.nobody.listens");
    }
}
