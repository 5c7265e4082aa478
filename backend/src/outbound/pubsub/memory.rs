//! Publisher that keeps events in process memory.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{EventPublisher, EventPublisherError};

/// One recorded publish.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub topic: String,
    pub payload: Value,
    pub message_id: String,
}

/// [`EventPublisher`] recording every event instead of sending it.
#[derive(Debug, Default)]
pub struct InMemoryEventPublisher {
    events: Mutex<Vec<PublishedEvent>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, oldest first.
    pub fn published(&self) -> Vec<PublishedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, topic: &str, payload: &Value) -> Result<String, EventPublisherError> {
        let message_id = Uuid::new_v4().to_string();
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PublishedEvent {
                topic: topic.to_owned(),
                payload: payload.clone(),
                message_id: message_id.clone(),
            });
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn records_events_in_order() {
        let publisher = InMemoryEventPublisher::new();
        let first = publisher.publish("t", &json!({"n": 1})).await.expect("first");
        publisher.publish("t", &json!({"n": 2})).await.expect("second");

        let events = publisher.published();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message_id, first);
        assert_eq!(events[1].payload["n"], 2);
    }
}
