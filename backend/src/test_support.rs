//! Helpers shared by unit and integration tests.
//!
//! Compiled for `cfg(test)` and for the `test-support` feature, which the
//! crate's own dev-dependency enables for `tests/`.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Map, Value};
use zeroize::Zeroizing;

use crate::domain::ports::{AnalystAgent, PasswordHashError, PasswordHasher};
use crate::inbound::http::state::{HttpState, HttpStateOptions, HttpStatePorts};
use crate::outbound::agents::{
    SyntheticAnalystAgent, SyntheticChatbotAgent, SyntheticQuestionnaireAgent,
};
use crate::outbound::memory::InMemoryDocumentStore;
use crate::outbound::pubsub::InMemoryEventPublisher;
use crate::outbound::storage::{GcsSigner, GcsSignerConfig};

/// Bucket configured by [`TestPorts`].
pub const TEST_BUCKET: &str = "dealroom-test-uploads";
/// Topic configured by [`TestPorts`].
pub const TEST_TOPIC: &str = "dealroom-test-ingestion";

/// Clock that advances one millisecond on every read.
///
/// Documents written through the same clock get strictly increasing
/// `createdAt` values, which keeps "latest" lookups deterministic.
#[derive(Debug)]
pub struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    /// Start at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    /// Instant the next read will return.
    pub fn peek(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::starting_at(start)
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let now = *guard;
        *guard += TimeDelta::milliseconds(1);
        now
    }
}

/// Unwrap a JSON object literal, panicking on anything else.
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Reversible hasher for tests: `plain$<password>`.
///
/// Argon2 with production parameters is slow in debug builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPasswordHasher;

impl PasswordHasher for PlainPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        hash.strip_prefix("plain$")
            .map(|stored| stored == password)
            .ok_or_else(|| PasswordHashError::malformed_hash("missing plain$ prefix"))
    }
}

/// In-process adapters wired into an [`HttpState`], with handles kept for
/// assertions.
pub struct TestPorts {
    pub store: Arc<InMemoryDocumentStore>,
    pub publisher: Arc<InMemoryEventPublisher>,
    pub clock: Arc<SteppingClock>,
    analyst: Arc<dyn AnalystAgent>,
    bucket: Option<String>,
}

impl Default for TestPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPorts {
    /// Synthetic agents, a seeded analyst and a configured bucket.
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryDocumentStore::new()),
            publisher: Arc::new(InMemoryEventPublisher::new()),
            clock: Arc::new(SteppingClock::default()),
            analyst: Arc::new(SyntheticAnalystAgent::with_seed(7)),
            bucket: Some(TEST_BUCKET.to_owned()),
        }
    }

    /// Replace the analyst strategy.
    #[must_use]
    pub fn with_analyst(mut self, analyst: Arc<dyn AnalystAgent>) -> Self {
        self.analyst = analyst;
        self
    }

    /// Drop the upload bucket.
    #[must_use]
    pub fn without_bucket(mut self) -> Self {
        self.bucket = None;
        self
    }

    /// Build handler state over these adapters.
    pub fn state(&self) -> HttpState {
        let signer = GcsSigner::new(
            GcsSignerConfig {
                access_id: Some("GOOG1TEST".to_owned()),
                secret: Some(Zeroizing::new("test-secret".to_owned())),
                host: None,
            },
            self.clock.clone(),
        );
        HttpState::new(
            HttpStatePorts {
                store: self.store.clone(),
                storage: Arc::new(signer),
                publisher: self.publisher.clone(),
                hasher: Arc::new(PlainPasswordHasher),
                analyst: self.analyst.clone(),
                questionnaire: Arc::new(SyntheticQuestionnaireAgent),
                chatbot: Arc::new(SyntheticChatbotAgent),
                clock: self.clock.clone(),
            },
            HttpStateOptions {
                gcs_bucket: self.bucket.clone(),
                ingestion_topic: TEST_TOPIC.to_owned(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn stepping_clock_is_strictly_increasing() {
        let clock = SteppingClock::default();
        let first = clock.utc();
        let second = clock.utc();
        assert!(second > first);
        assert_eq!(clock.peek() - second, TimeDelta::milliseconds(1));
    }

    #[test]
    fn plain_hasher_round_trips() {
        let hash = PlainPasswordHasher.hash("pw").expect("hash");
        assert!(PlainPasswordHasher.verify("pw", &hash).expect("verify"));
        assert!(!PlainPasswordHasher.verify("other", &hash).expect("verify"));
    }
}
