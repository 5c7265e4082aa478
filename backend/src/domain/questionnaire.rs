//! Questionnaires and the questionnaire agent wrapper.
//!
//! [`QuestionnaireService`] owns persistence for generated questionnaires and
//! the canonical answer records. It behaves identically whichever
//! [`QuestionnaireAgent`] strategy it is given.

use std::sync::Arc;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::domain::founder_answers::{AnswerEntry, FounderAnswers, entries_from_value};
use crate::domain::ports::{
    Collection, DocumentQuery, DocumentStore, QuestionnaireAgent, QuestionnaireContext, Stored,
    to_document_data,
};
use crate::domain::service_support::{map_agent_error, map_store_error, object, stamped};
use crate::domain::{Error, now_timestamp};

/// Stored questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub startup_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_deck_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub questions: Vec<Value>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founder_answers_id: Option<String>,
    /// Embedded answers written by older releases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Value>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Result of questionnaire generation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestionnaire {
    pub questionnaire_id: String,
    #[schema(value_type = Vec<Object>)]
    pub questions: Vec<Value>,
}

/// Identifiers produced when answers are saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAnswers {
    pub questionnaire_id: String,
    pub answer_id: String,
}

/// Manually authored questionnaire.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestionnaire {
    pub startup_id: String,
    pub pitch_deck_id: String,
    pub questions: Value,
}

/// Questionnaire persistence plus the questionnaire agent.
pub struct QuestionnaireService {
    store: Arc<dyn DocumentStore>,
    agent: Arc<dyn QuestionnaireAgent>,
    clock: Arc<dyn Clock>,
}

impl QuestionnaireService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        agent: Arc<dyn QuestionnaireAgent>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            agent,
            clock,
        }
    }

    /// Generate and persist a questionnaire with `status = "ready"`.
    ///
    /// # Errors
    /// `internal_error` prefixed `Questionnaire generation failed:` when the
    /// agent fails, or a store error.
    pub async fn generate_questionnaire(
        &self,
        context: QuestionnaireContext,
    ) -> Result<GeneratedQuestionnaire, Error> {
        let questions = self
            .agent
            .generate(&context)
            .await
            .map_err(|err| map_agent_error("Questionnaire generation", &err))?;

        let mut data = object(json!({
            "startupId": context.startup_id,
            "version": 1,
            "schemaVersion": "v1",
            "questions": questions,
            "status": "ready",
        }));
        if let Some(note_id) = &context.note_id {
            data.insert("noteId".to_owned(), Value::String(note_id.clone()));
        }
        if let Some(pitch_deck_id) = &context.pitch_deck_id {
            data.insert("pitchDeckId".to_owned(), Value::String(pitch_deck_id.clone()));
        }
        let data = stamped(data, &now_timestamp(self.clock.as_ref()));
        let questionnaire_id = self
            .store
            .add(Collection::Questionnaires, data)
            .await
            .map_err(map_store_error)?;
        info!(
            startup_id = %context.startup_id,
            questionnaire_id = %questionnaire_id,
            questions = questions.len(),
            "questionnaire generated"
        );
        Ok(GeneratedQuestionnaire {
            questionnaire_id,
            questions,
        })
    }

    /// Advice for answering one question of an existing questionnaire.
    ///
    /// # Errors
    /// `questionnaire_not_found`, or `internal_error` prefixed
    /// `Questionnaire assistance failed:`.
    pub async fn get_questionnaire_assistance(
        &self,
        questionnaire_id: &str,
        question: &str,
    ) -> Result<String, Error> {
        self.get(questionnaire_id).await?;
        self.agent
            .assist(questionnaire_id, question)
            .await
            .map_err(|err| map_agent_error("Questionnaire assistance", &err))
    }

    /// Store a questionnaire authored outside the agent, `status = "generated"`.
    pub async fn create(&self, questionnaire: NewQuestionnaire) -> Result<String, Error> {
        let data = stamped(
            object(json!({
                "startupId": questionnaire.startup_id,
                "pitchDeckId": questionnaire.pitch_deck_id,
                "questions": questionnaire.questions,
                "status": "generated",
            })),
            &now_timestamp(self.clock.as_ref()),
        );
        self.store
            .add(Collection::Questionnaires, data)
            .await
            .map_err(map_store_error)
    }

    /// Questionnaire by identifier.
    ///
    /// # Errors
    /// `questionnaire_not_found` when absent.
    pub async fn get(&self, id: &str) -> Result<Stored<Questionnaire>, Error> {
        self.store
            .get(Collection::Questionnaires, id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("questionnaire_not_found"))?
            .into_record()
            .map_err(map_store_error)
    }

    /// Newest questionnaire for a startup.
    ///
    /// # Errors
    /// `questionnaire_not_found` when the startup has none.
    pub async fn require_latest(&self, startup_id: &str) -> Result<Stored<Questionnaire>, Error> {
        let mut found = self
            .store
            .query(
                Collection::Questionnaires,
                &DocumentQuery::latest_for_startup(startup_id),
            )
            .await
            .map_err(map_store_error)?;
        found
            .pop()
            .ok_or_else(|| Error::not_found("questionnaire_not_found"))?
            .into_record()
            .map_err(map_store_error)
    }

    /// Attach answers to the newest questionnaire of a startup.
    ///
    /// # Errors
    /// `answers_required` when `answers` is absent or not a map or list, and
    /// `questionnaire_not_found` when the startup has no questionnaire.
    pub async fn save_answers(
        &self,
        startup_id: &str,
        answers: Option<&Value>,
    ) -> Result<SavedAnswers, Error> {
        let entries = answers
            .and_then(entries_from_value)
            .ok_or_else(|| Error::invalid_request("answers_required"))?;
        let questionnaire = self.require_latest(startup_id).await?;
        let answer_id = self
            .submit_answers(&questionnaire.id, startup_id, entries, None)
            .await?;
        Ok(SavedAnswers {
            questionnaire_id: questionnaire.id,
            answer_id,
        })
    }

    /// Write a canonical answer record and mark the questionnaire completed.
    ///
    /// The questionnaire is only patched when it exists.
    pub async fn submit_answers(
        &self,
        questionnaire_id: &str,
        startup_id: &str,
        answers: Vec<AnswerEntry>,
        transcript_uri: Option<String>,
    ) -> Result<String, Error> {
        let now = now_timestamp(self.clock.as_ref());
        let record = FounderAnswers {
            startup_id: startup_id.to_owned(),
            questionnaire_id: questionnaire_id.to_owned(),
            answers,
            transcript_uri,
            status: "complete".to_owned(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        let data = to_document_data(&record).map_err(map_store_error)?;
        let answer_id = self
            .store
            .add(Collection::FounderAnswers, data)
            .await
            .map_err(map_store_error)?;

        let exists = self
            .store
            .get(Collection::Questionnaires, questionnaire_id)
            .await
            .map_err(map_store_error)?
            .is_some();
        if exists {
            let mut patch = Map::new();
            patch.insert("status".to_owned(), json!("completed"));
            patch.insert("founderAnswersId".to_owned(), json!(answer_id));
            patch.insert("updatedAt".to_owned(), json!(now));
            self.store
                .update(Collection::Questionnaires, questionnaire_id, patch)
                .await
                .map_err(map_store_error)?;
        } else {
            debug!(%questionnaire_id, "answers stored for unknown questionnaire");
        }
        info!(%questionnaire_id, answer_id = %answer_id, "founder answers saved");
        Ok(answer_id)
    }
}

#[cfg(test)]
mod tests;
