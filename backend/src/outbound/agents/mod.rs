//! Agent strategies: remote HTTP clients or local synthetic stand-ins.
//!
//! The strategy is chosen once, at construction, from the configured base
//! URL. The sentinel [`MOCK_SENTINEL`] selects the synthetic agent.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::domain::ports::{AnalystAgent, ChatbotAgent, QuestionnaireAgent};

pub mod http;
pub mod synthetic;

pub use http::{AgentClient, HttpAnalystAgent, HttpChatbotAgent, HttpQuestionnaireAgent};
pub use synthetic::{SyntheticAnalystAgent, SyntheticChatbotAgent, SyntheticQuestionnaireAgent};

/// Base URL value selecting the synthetic agents.
pub const MOCK_SENTINEL: &str = "mock";

/// Failures building an HTTP agent client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentSetupError {
    #[error("invalid agent base URL {base_url}: {message}")]
    InvalidBaseUrl { base_url: String, message: String },
    #[error("failed to build agent HTTP client: {message}")]
    Client { message: String },
}

fn is_mock(base_url: &str) -> bool {
    base_url.trim() == MOCK_SENTINEL
}

/// Analyst strategy for `base_url`.
///
/// # Errors
/// See [`AgentSetupError`].
pub fn build_analyst_agent(
    base_url: &str,
    timeout: Duration,
) -> Result<Arc<dyn AnalystAgent>, AgentSetupError> {
    if is_mock(base_url) {
        info!("analyst agent running in mock mode");
        return Ok(Arc::new(SyntheticAnalystAgent::new()));
    }
    info!(%base_url, "analyst agent calling remote server");
    Ok(Arc::new(HttpAnalystAgent::new(AgentClient::new(
        base_url, timeout,
    )?)))
}

/// Questionnaire strategy for `base_url`.
///
/// # Errors
/// See [`AgentSetupError`].
pub fn build_questionnaire_agent(
    base_url: &str,
    timeout: Duration,
) -> Result<Arc<dyn QuestionnaireAgent>, AgentSetupError> {
    if is_mock(base_url) {
        info!("questionnaire agent running in mock mode");
        return Ok(Arc::new(SyntheticQuestionnaireAgent));
    }
    info!(%base_url, "questionnaire agent calling remote server");
    Ok(Arc::new(HttpQuestionnaireAgent::new(AgentClient::new(
        base_url, timeout,
    )?)))
}

/// Chatbot strategy for `base_url`.
///
/// # Errors
/// See [`AgentSetupError`].
pub fn build_chatbot_agent(
    base_url: &str,
    timeout: Duration,
) -> Result<Arc<dyn ChatbotAgent>, AgentSetupError> {
    if is_mock(base_url) {
        info!("chatbot agent running in mock mode");
        return Ok(Arc::new(SyntheticChatbotAgent));
    }
    info!(%base_url, "chatbot agent calling remote server");
    Ok(Arc::new(HttpChatbotAgent::new(AgentClient::new(
        base_url, timeout,
    )?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::QuestionnaireContext;

    #[tokio::test]
    async fn mock_sentinel_selects_synthetic_agents() {
        let agent = build_questionnaire_agent("mock", Duration::from_secs(1)).expect("agent");
        let questions = agent
            .generate(&QuestionnaireContext::default())
            .await
            .expect("questions");
        assert_eq!(questions.len(), 7);
    }

    #[test]
    fn other_values_must_be_urls() {
        let err = build_chatbot_agent("mocked", Duration::from_secs(1))
            .err()
            .expect("invalid url");
        assert!(matches!(err, AgentSetupError::InvalidBaseUrl { .. }));
        assert!(build_analyst_agent("http://localhost:8000", Duration::from_secs(1)).is_ok());
    }
}
