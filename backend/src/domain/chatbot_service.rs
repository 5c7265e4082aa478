//! Chat sessions with the screener, deep-dive and questionnaire bots.
//!
//! Every successful exchange is appended to the `messages` collection as a
//! user turn followed by an assistant turn. Transcript writes are
//! best-effort.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::ports::{ChatbotAgent, Collection, DocumentStore};
use crate::domain::service_support::{map_agent_error, object};
use crate::domain::{Error, SideEffectStatus, now_timestamp};

/// Bot reply plus the transcript outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChatReply {
    pub reply: String,
    pub transcript: SideEffectStatus,
}

/// Wrapper around the chatbot agent that records transcripts.
pub struct ChatbotService {
    store: Arc<dyn DocumentStore>,
    agent: Arc<dyn ChatbotAgent>,
    clock: Arc<dyn Clock>,
}

impl ChatbotService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        agent: Arc<dyn ChatbotAgent>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            agent,
            clock,
        }
    }

    /// Sector-level screening conversation.
    ///
    /// # Errors
    /// `internal_error` prefixed `Deal screener processing failed:`.
    pub async fn process_deal_screener_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<ChatReply, Error> {
        let reply = self
            .agent
            .screen(session_id, message)
            .await
            .map_err(|err| map_agent_error("Deal screener processing", &err))?;
        Ok(self.record(session_id, message, reply).await)
    }

    /// Conversation about one company.
    ///
    /// # Errors
    /// `internal_error` prefixed `Deep dive processing failed:`.
    pub async fn process_deep_dive_message(
        &self,
        session_id: &str,
        message: &str,
        deal_note_id: Option<String>,
    ) -> Result<ChatReply, Error> {
        let reply = self
            .agent
            .deep_dive(session_id, message, deal_note_id)
            .await
            .map_err(|err| map_agent_error("Deep dive processing", &err))?;
        Ok(self.record(session_id, message, reply).await)
    }

    /// Founder coaching on a questionnaire.
    ///
    /// # Errors
    /// `internal_error` prefixed `Questionnaire processing failed:`.
    pub async fn process_questionnaire_message(
        &self,
        session_id: &str,
        message: &str,
        questionnaire_id: &str,
    ) -> Result<ChatReply, Error> {
        let reply = self
            .agent
            .questionnaire(questionnaire_id, message)
            .await
            .map_err(|err| map_agent_error("Questionnaire processing", &err))?;
        Ok(self.record(session_id, message, reply).await)
    }

    async fn record(&self, session_id: &str, message: &str, reply: String) -> ChatReply {
        let user = self.append(session_id, "user", message).await;
        let assistant = self.append(session_id, "assistant", &reply).await;
        ChatReply {
            reply,
            transcript: user.and(assistant),
        }
    }

    async fn append(&self, session_id: &str, role: &str, text: &str) -> SideEffectStatus {
        let data = object(json!({
            "sessionId": session_id,
            "role": role,
            "text": text,
            "createdAt": now_timestamp(self.clock.as_ref()),
        }));
        let result = self
            .store
            .add(Collection::Messages, data)
            .await
            .map(|message_id| debug!(%session_id, %message_id, role, "transcript entry stored"));
        SideEffectStatus::from_result("transcript", result)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        AgentError, DocumentQuery, DocumentStoreError, MockChatbotAgent, MockDocumentStore,
        SortDirection,
    };
    use crate::outbound::memory::InMemoryDocumentStore;
    use crate::test_support::SteppingClock;

    fn screener(reply: &'static str) -> MockChatbotAgent {
        let mut agent = MockChatbotAgent::new();
        agent
            .expect_screen()
            .returning(move |_, _| Ok(reply.to_owned()));
        agent
    }

    #[tokio::test]
    async fn exchanges_are_recorded_user_first() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = ChatbotService::new(
            store.clone(),
            Arc::new(screener("Try fintech.")),
            Arc::new(SteppingClock::default()),
        );

        let reply = service
            .process_deal_screener_message("sess", "Any fintech deals?")
            .await
            .expect("reply");
        assert_eq!(reply.reply, "Try fintech.");
        assert_eq!(reply.transcript, SideEffectStatus::Applied);

        let query = DocumentQuery::new()
            .where_eq("sessionId", "sess")
            .order_by("createdAt", SortDirection::Ascending);
        let turns = store.query(Collection::Messages, &query).await.expect("turns");
        let roles: Vec<_> = turns.iter().filter_map(|turn| turn.str_field("role")).collect();
        assert_eq!(roles, vec!["user", "assistant"]);
        assert_eq!(turns[1].str_field("text"), Some("Try fintech."));
    }

    #[tokio::test]
    async fn transcript_failures_do_not_fail_the_reply() {
        let mut store = MockDocumentStore::new();
        store
            .expect_add()
            .returning(|_, _| Err(DocumentStoreError::connection("pool closed")));
        let service = ChatbotService::new(
            Arc::new(store),
            Arc::new(screener("Hello")),
            Arc::new(SteppingClock::default()),
        );

        let reply = service
            .process_deal_screener_message("sess", "hi")
            .await
            .expect("reply");
        assert_eq!(reply.reply, "Hello");
        assert!(reply.transcript.is_failed());
    }

    #[tokio::test]
    async fn agent_failures_carry_the_operation_name() {
        let mut agent = MockChatbotAgent::new();
        agent
            .expect_questionnaire()
            .returning(|_, _| Err(AgentError::timeout("30s elapsed")));
        let mut store = MockDocumentStore::new();
        store.expect_add().never();
        let service = ChatbotService::new(
            Arc::new(store),
            Arc::new(agent),
            Arc::new(SteppingClock::default()),
        );

        let err = service
            .process_questionnaire_message("sess", "help", "q1")
            .await
            .expect_err("timeout");
        assert_eq!(
            err.message(),
            Some("Questionnaire processing failed: request timed out: 30s elapsed")
        );
    }
}
