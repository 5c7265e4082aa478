//! Capability port for the conversational agents.

use async_trait::async_trait;

use super::AgentError;

/// Chatbot agent capabilities. Each call returns the assistant reply text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatbotAgent: Send + Sync {
    /// Deal screener: sector-level startup discovery.
    async fn screen(&self, session_id: &str, message: &str) -> Result<String, AgentError>;

    /// Deep dive on one company, optionally anchored to a deal note.
    async fn deep_dive(
        &self,
        session_id: &str,
        message: &str,
        deal_note_id: Option<String>,
    ) -> Result<String, AgentError>;

    /// Questionnaire coaching for founders.
    async fn questionnaire(
        &self,
        questionnaire_id: &str,
        message: &str,
    ) -> Result<String, AgentError>;
}
