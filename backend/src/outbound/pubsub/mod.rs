//! Event publishing adapters: the Pub/Sub REST API and an in-memory recorder.

mod http;
mod memory;

pub use http::{PubSubConfig, PubSubPublisher};
pub use memory::{InMemoryEventPublisher, PublishedEvent};
