//! Analyst runs outside the founder flow: the post-call trigger and the
//! per-startup status query.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::{DealNoteService, GeneratedDealNote};
use crate::domain::founder_answers::FounderAnswers;
use crate::domain::ports::{Collection, DocumentQuery, FullAnalysisRequest};
use crate::domain::service_support::map_store_error;
use crate::domain::{Error, ErrorKind};

const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Request to analyse a startup once its founder call has finished.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AfterCallForm {
    pub startup_id: Option<String>,
    pub questionnaire_id: Option<String>,
}

/// Outcome of a post-call analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AfterCallRun {
    pub startup_id: String,
    pub company_name: String,
    pub company_website: String,
    pub questionnaire_id: String,
    pub pitch_deck_id: Option<String>,
    pub generated: GeneratedDealNote,
}

/// Analysis state of a startup that has a deal note.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysedStartup {
    pub has_deal_note: bool,
    pub deal_note_id: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// `dealNote.score.total`, or `null`.
    #[schema(value_type = Option<f64>)]
    pub score: Value,
    /// `dealNote.company`, or `null`.
    #[schema(value_type = Option<String>)]
    pub company: Value,
}

/// Analysis state of a startup without a deal note.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingStartup {
    pub has_deal_note: bool,
    pub message: &'static str,
}

/// Whether the analyst has produced a deal note for a startup.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum AnalysisStatus {
    Analysed(AnalysedStartup),
    Pending(PendingStartup),
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn non_falsy(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => Value::Null,
        Some(Value::String(text)) if text.is_empty() => Value::Null,
        Some(Value::Number(number)) if number.as_f64() == Some(0.0) => Value::Null,
        Some(other) => other.clone(),
    }
}

impl DealNoteService {
    /// Run full analysis for a startup whose founder call has finished.
    ///
    /// Unlike [`DealNoteService::generate`], analyst failures are errors: the
    /// caller asked for this run explicitly.
    ///
    /// # Errors
    /// - `startupId_questionnaireId_required` when either id is missing.
    /// - `startup_not_found` when no account exists.
    /// - `questionnaire_answers_not_found` when the call left no answers.
    /// - `startup_analyst_failed` when the analyst errors.
    pub async fn analyse_after_call(&self, form: AfterCallForm) -> Result<AfterCallRun, Error> {
        let (Some(startup_id), Some(questionnaire_id)) =
            (non_empty(form.startup_id), non_empty(form.questionnaire_id))
        else {
            return Err(Error::invalid_request("startupId_questionnaireId_required")
                .with_message("startupId and questionnaireId are required"));
        };

        let startup = self
            .store
            .get(Collection::Users, &startup_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("startup_not_found"))?;
        let company_name = startup
            .str_field("name")
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_COMPANY)
            .to_owned();
        let company_website = startup.str_field("companyWebsite").unwrap_or_default().to_owned();

        let query = DocumentQuery::new()
            .where_eq("questionnaireId", questionnaire_id.as_str())
            .newest_first()
            .limit(1);
        let answers = self
            .store
            .query(Collection::FounderAnswers, &query)
            .await
            .map_err(map_store_error)?
            .pop()
            .ok_or_else(|| Error::not_found("questionnaire_answers_not_found"))?
            .into_record::<FounderAnswers>()
            .map_err(map_store_error)?
            .record;

        let deck = self.pitch_decks.latest_for_startup(&startup_id).await?;
        let request = FullAnalysisRequest {
            startup_id: startup_id.clone(),
            pitch_deck_gcs_uri: deck
                .as_ref()
                .map(|deck| deck.record.gcs_uri.clone())
                .unwrap_or_default(),
            questionnaire_answers: answers.answer_map(),
        };
        let analysed = self.analyst.analyse_startup(&request).await.map_err(|err| {
            warn!(%startup_id, error = %err, "post-call analysis failed");
            Error::new(ErrorKind::Internal, "startup_analyst_failed")
                .with_message(format!("Startup analysis failed: {err}"))
        })?;

        let pitch_deck_id = deck.map(|deck| deck.id);
        let generated = self
            .store_analysis(
                &startup_id,
                analysed,
                pitch_deck_id.as_deref(),
                &questionnaire_id,
            )
            .await?;
        info!(%startup_id, %questionnaire_id, "post-call analysis stored");
        Ok(AfterCallRun {
            startup_id,
            company_name,
            company_website,
            questionnaire_id,
            pitch_deck_id,
            generated,
        })
    }

    /// Report whether a startup has been analysed.
    ///
    /// # Errors
    /// Store failures only; a startup without notes is [`AnalysisStatus::Pending`].
    pub async fn analysis_status(&self, startup_id: &str) -> Result<AnalysisStatus, Error> {
        let latest = self
            .store
            .query(
                Collection::DealNotes,
                &DocumentQuery::latest_for_startup(startup_id),
            )
            .await
            .map_err(map_store_error)?
            .pop();
        let Some(document) = latest else {
            return Ok(AnalysisStatus::Pending(PendingStartup {
                has_deal_note: false,
                message: "No deal note found for this startup",
            }));
        };
        Ok(AnalysisStatus::Analysed(AnalysedStartup {
            has_deal_note: true,
            created_at: document.str_field("createdAt").map(str::to_owned),
            updated_at: document.str_field("updatedAt").map(str::to_owned),
            score: non_falsy(document.field("dealNote.score.total")),
            company: non_falsy(document.field("dealNote.company")),
            deal_note_id: document.id,
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use mockable::Clock;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::{
        AgentError, AnalysedDealNote, DocumentStore, MockAnalystAgent, MockQuestionnaireAgent,
        NoteProvenance,
    };
    use crate::domain::{DealNoteOutcome, PitchDeckService, QuestionnaireService};
    use crate::outbound::memory::InMemoryDocumentStore;
    use crate::test_support::{SteppingClock, object};

    fn service(analyst: MockAnalystAgent) -> (DealNoteService, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let clock: Arc<dyn Clock> = Arc::new(SteppingClock::default());
        let pitch_decks = Arc::new(PitchDeckService::new(store.clone(), clock.clone()));
        let questionnaires = Arc::new(QuestionnaireService::new(
            store.clone(),
            Arc::new(MockQuestionnaireAgent::new()),
            clock.clone(),
        ));
        let service = DealNoteService::new(
            store.clone(),
            Arc::new(analyst),
            pitch_decks,
            questionnaires,
            clock,
        );
        (service, store)
    }

    async fn seed_call(store: &InMemoryDocumentStore) {
        store
            .set(
                Collection::Users,
                "s1",
                object(json!({"role": "startup", "name": "Acme", "companyWebsite": "https://acme.test"})),
            )
            .await
            .expect("seed user");
        store
            .set(
                Collection::FounderAnswers,
                "a1",
                object(json!({
                    "startupId": "s1",
                    "questionnaireId": "quest",
                    "answers": [{"role": "founder", "text": "We ship tractors"}],
                    "status": "complete",
                })),
            )
            .await
            .expect("seed answers");
    }

    fn after_call(startup_id: &str, questionnaire_id: &str) -> AfterCallForm {
        AfterCallForm {
            startup_id: Some(startup_id.to_owned()),
            questionnaire_id: Some(questionnaire_id.to_owned()),
        }
    }

    #[tokio::test]
    async fn post_call_analysis_sends_keyed_answers_without_a_deck() {
        let mut analyst = MockAnalystAgent::new();
        analyst
            .expect_analyse_startup()
            .withf(|request| {
                request.pitch_deck_gcs_uri.is_empty()
                    && Value::Object(request.questionnaire_answers.clone())
                        == json!({"turn_1": {"role": "founder", "text": "We ship tractors"}})
            })
            .times(1)
            .returning(|_| {
                Ok(AnalysedDealNote {
                    note: json!({"company": "Acme", "score": {"total": 8.1}}),
                    provenance: NoteProvenance::Agent,
                })
            });
        let (service, store) = service(analyst);
        seed_call(&store).await;

        let run = service.analyse_after_call(after_call("s1", "quest")).await.expect("run");
        assert_eq!(run.company_name, "Acme");
        assert_eq!(run.company_website, "https://acme.test");
        assert_eq!(run.pitch_deck_id, None);
        assert_eq!(run.generated.outcome, DealNoteOutcome::Completed);

        let stored = service.get(&run.generated.deal_note_id).await.expect("stored");
        assert_eq!(stored["questionnaireId"], "quest");
        assert_eq!(stored["pitchDeckId"], Value::Null);
    }

    #[rstest]
    #[case::missing_ids(AfterCallForm::default(), "startupId_questionnaireId_required")]
    #[case::unknown_startup(after_call("ghost", "quest"), "startup_not_found")]
    #[case::no_answers(after_call("s1", "other"), "questionnaire_answers_not_found")]
    #[tokio::test]
    async fn post_call_analysis_needs_a_startup_and_answers(
        #[case] form: AfterCallForm,
        #[case] code: &str,
    ) {
        let mut analyst = MockAnalystAgent::new();
        analyst.expect_analyse_startup().never();
        let (service, store) = service(analyst);
        seed_call(&store).await;

        let err = service.analyse_after_call(form).await.expect_err("rejected");
        assert_eq!(err.code(), code);
    }

    #[tokio::test]
    async fn post_call_analyst_failures_are_reported() {
        let mut analyst = MockAnalystAgent::new();
        analyst
            .expect_analyse_startup()
            .returning(|_| Err(AgentError::transport("connection refused")));
        let (service, store) = service(analyst);
        seed_call(&store).await;

        let err = service
            .analyse_after_call(after_call("s1", "quest"))
            .await
            .expect_err("analyst down");
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.code(), "startup_analyst_failed");
        assert_eq!(store.count(Collection::DealNotes).await, 0);
    }

    #[tokio::test]
    async fn status_is_pending_without_notes() {
        let (service, _) = service(MockAnalystAgent::new());
        let status = service.analysis_status("s1").await.expect("status");
        assert_eq!(
            serde_json::to_value(status).expect("serialise"),
            json!({"hasDealNote": false, "message": "No deal note found for this startup"})
        );
    }

    #[tokio::test]
    async fn status_reports_the_newest_note() {
        let (service, store) = service(MockAnalystAgent::new());
        for (id, created_at, total) in [
            ("old", "2024-01-01T00:00:00.000Z", json!(6.0)),
            ("new", "2024-02-01T00:00:00.000Z", json!(8.5)),
        ] {
            store
                .set(
                    Collection::DealNotes,
                    id,
                    object(json!({
                        "startupId": "s1",
                        "dealNote": {"company": "Acme", "score": {"total": total}},
                        "createdAt": created_at,
                        "updatedAt": created_at,
                    })),
                )
                .await
                .expect("seed note");
        }

        let status = service.analysis_status("s1").await.expect("status");
        assert_eq!(
            serde_json::to_value(status).expect("serialise"),
            json!({
                "hasDealNote": true,
                "dealNoteId": "new",
                "createdAt": "2024-02-01T00:00:00.000Z",
                "updatedAt": "2024-02-01T00:00:00.000Z",
                "score": 8.5,
                "company": "Acme",
            })
        );
    }

    #[tokio::test]
    async fn status_nulls_missing_score_and_company() {
        let (service, store) = service(MockAnalystAgent::new());
        store
            .set(
                Collection::DealNotes,
                "n1",
                object(json!({"startupId": "s1", "dealNote": {}, "createdAt": "2024-01-01T00:00:00.000Z"})),
            )
            .await
            .expect("seed note");

        let AnalysisStatus::Analysed(status) = service.analysis_status("s1").await.expect("status")
        else {
            panic!("expected an analysed startup");
        };
        assert_eq!(status.score, Value::Null);
        assert_eq!(status.company, Value::Null);
        assert_eq!(status.updated_at, None);
    }
}
