//! Capability port for the questionnaire agent.

use async_trait::async_trait;
use serde_json::Value;

use super::AgentError;

/// Context for questionnaire generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionnaireContext {
    /// Startup the questionnaire is for.
    pub startup_id: String,
    /// Analyst note the questions should build on.
    pub note_id: Option<String>,
    /// Pitch deck the questions should build on.
    pub pitch_deck_id: Option<String>,
    /// `gs://` URI of that pitch deck.
    pub pitch_deck_gcs_uri: Option<String>,
}

/// Questionnaire agent capabilities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionnaireAgent: Send + Sync {
    /// Produce the question list (`[{id, text, category, type}]`).
    async fn generate(&self, context: &QuestionnaireContext) -> Result<Vec<Value>, AgentError>;

    /// Draft advice for answering `question`.
    async fn assist(&self, questionnaire_id: &str, question: &str) -> Result<String, AgentError>;
}
