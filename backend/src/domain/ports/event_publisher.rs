//! Driven port publishing JSON events to a pub/sub topic.

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

define_port_error! {
    /// Errors raised by event publishers.
    pub enum EventPublisherError {
        /// The broker could not be reached.
        Transport { message: String } => "event publish transport failed: {message}",
        /// The broker refused the message.
        Rejected { message: String } => "event publish rejected: {message}",
        /// The broker reply could not be decoded.
        Decode { message: String } => "invalid publish response: {message}",
    }
}

/// Driven port for pub/sub publishing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `payload` to `topic`, returning the broker's message id.
    async fn publish(&self, topic: &str, payload: &Value) -> Result<String, EventPublisherError>;
}
