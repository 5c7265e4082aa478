//! Pub/Sub push callbacks.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use mockable::Clock;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::domain::ports::{Collection, DocumentStore};
use crate::domain::service_support::{map_store_error, object, stamped};
use crate::domain::upload::PITCH_UPLOADED_EVENT;
use crate::domain::{Error, now_timestamp};

/// Push delivery envelope, `{message: {data: <base64 JSON>}}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PushEnvelope {
    #[serde(default)]
    pub message: Option<PushMessage>,
}

/// Pushed message.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PushMessage {
    #[serde(default)]
    pub data: Option<String>,
}

/// What a delivery caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A stub analyst note was written.
    NoteCreated(String),
    /// The event type is not handled.
    Ignored,
}

/// Handles decoded ingestion events.
pub struct IngestionEventService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl IngestionEventService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Decode a push envelope and act on it.
    ///
    /// An envelope without data decodes as `{}` and is ignored. Deliveries
    /// are not deduplicated, so a replay writes another note.
    ///
    /// # Errors
    /// `bad_request` when the data is not base64-encoded JSON.
    pub async fn handle_push(&self, envelope: PushEnvelope) -> Result<EventOutcome, Error> {
        let event = decode_event(envelope)?;
        if event.get("type").and_then(Value::as_str) != Some(PITCH_UPLOADED_EVENT) {
            debug!(event_type = ?event.get("type"), "ignoring pub/sub event");
            return Ok(EventOutcome::Ignored);
        }

        let startup_id = event.get("startupId").cloned().unwrap_or(Value::Null);
        let data = stamped(
            object(json!({
                "startupId": startup_id,
                "version": 1,
                "schemaVersion": "v1",
                "source": "ingestion_auto",
                "summary": "Auto-ingested from pitch upload event",
                "status": "ready",
                "json": {
                    "title": "Auto Note",
                    "inputs": {
                        "gcsUri": event.get("gcsUri").cloned().unwrap_or(Value::Null),
                        "uploadId": event.get("uploadId").cloned().unwrap_or(Value::Null),
                    },
                    "findings": ["auto stub"],
                },
            })),
            &now_timestamp(self.clock.as_ref()),
        );
        let note_id = self
            .store
            .add(Collection::DealNotes, data)
            .await
            .map_err(map_store_error)?;
        info!(%startup_id, %note_id, "ingestion note stored from upload event");
        Ok(EventOutcome::NoteCreated(note_id))
    }
}

fn decode_event(envelope: PushEnvelope) -> Result<Value, Error> {
    let Some(data) = envelope
        .message
        .and_then(|message| message.data)
        .filter(|data| !data.is_empty())
    else {
        return Ok(json!({}));
    };
    let bytes = STANDARD
        .decode(data.as_bytes())
        .map_err(|err| Error::invalid_request("bad_request").with_message(err.to_string()))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| Error::invalid_request("bad_request").with_message(err.to_string()))
}
