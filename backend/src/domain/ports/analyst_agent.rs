//! Capability port for the analyst agent.
//!
//! Implementations either call the remote analyst over HTTP or synthesise
//! canned output. [`crate::domain::AnalystService`] owns all persistence, so
//! both strategies observe the same storage contract.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::AgentError;

/// Pitch deck ingestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionRequest {
    /// Startup owning the deck.
    pub startup_id: String,
    /// `gs://` URI of the deck.
    pub gcs_uri: String,
    /// Upload handshake that produced the deck, if any.
    pub upload_id: Option<String>,
}

/// Note produced by ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedNote {
    /// Identifier chosen by the agent, if it chose one.
    pub note_id: Option<String>,
    /// Structured note body stored under `json`.
    pub note: Value,
}

/// Whole-startup analysis request used for deal note generation.
#[derive(Debug, Clone, PartialEq)]
pub struct FullAnalysisRequest {
    /// Startup being analysed.
    pub startup_id: String,
    /// `gs://` URI of the latest pitch deck.
    pub pitch_deck_gcs_uri: String,
    /// Founder answers keyed by question id.
    pub questionnaire_answers: Map<String, Value>,
}

/// Where a deal note body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteProvenance {
    /// Produced by the remote analyst.
    Agent,
    /// Synthesised locally.
    Synthetic,
}

/// Deal note body plus provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysedDealNote {
    /// Opaque deal note JSON.
    pub note: Value,
    /// Origin of `note`.
    pub provenance: NoteProvenance,
}

/// Analyst agent capabilities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalystAgent: Send + Sync {
    /// Extract a structured note from a pitch deck.
    async fn ingest(&self, request: &IngestionRequest) -> Result<IngestedNote, AgentError>;

    /// Verify the claims in `note`, returning the verification payload.
    async fn research(&self, note_id: &str, note: &Value) -> Result<Value, AgentError>;

    /// Score `note`, returning the score payload.
    async fn score(&self, note_id: &str, note: &Value) -> Result<Value, AgentError>;

    /// Produce a complete investor-facing deal note.
    async fn analyse_startup(
        &self,
        request: &FullAnalysisRequest,
    ) -> Result<AnalysedDealNote, AgentError>;
}
