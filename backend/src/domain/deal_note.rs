//! Investor-facing deal notes.
//!
//! Deal notes share the `deal_notes` collection with analyst and final notes.
//! Their body is opaque JSON; only `score.total`, `company` and `sector.name`
//! are read, to refresh the startup's listing fields.

use std::sync::Arc;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::founder_answers::load_answers;
use crate::domain::pitch_deck::PitchDeckService;
use crate::domain::ports::{
    AnalysedDealNote, AnalystAgent, Collection, DocumentData, DocumentQuery, DocumentStore,
    FullAnalysisRequest, NoteProvenance,
};
use crate::domain::questionnaire::QuestionnaireService;
use crate::domain::service_support::{
    documents_json, map_store_error, nullable, object, present, stamped,
};
use crate::domain::{Error, SideEffectStatus, now_timestamp};

/// Deal note stored when the analyst is mocked or unavailable.
///
/// # Examples
/// ```
/// use dealroom::domain::fallback_deal_note;
///
/// assert_eq!(fallback_deal_note()["score"]["total"], 7.5);
/// ```
pub fn fallback_deal_note() -> Value {
    json!({
        "company": "Mock Company",
        "score": {"total": 7.5},
        "facts": {"founders": [], "traction": {}},
        "verification": {"checks": []},
        "benchmarks": {"peers": []},
        "risks": [],
        "term_sheet": {"clauses": []},
        "sector": {"kpis": []},
    })
}

/// Listing fields copied from a deal note onto its startup account.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileProjection {
    pub score: Value,
    pub description: String,
    pub category: String,
}

impl ProfileProjection {
    /// Extract the projection; `None` when the note has no `score.total`.
    pub fn from_deal_note(note: &Value) -> Option<Self> {
        let score = note.pointer("/score/total").filter(|v| !v.is_null())?.clone();
        Some(Self {
            score,
            description: note
                .get("company")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            category: note
                .pointer("/sector/name")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_owned(),
        })
    }

    fn into_patch(self, now: &str) -> DocumentData {
        object(json!({
            "score": self.score,
            "description": self.description,
            "category": self.category,
            "updatedAt": now,
        }))
    }
}

/// Deal note creation payload.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealNoteForm {
    pub startup_id: Option<String>,
    pub pitch_deck_id: Option<String>,
    pub questionnaire_id: Option<String>,
    pub qa_response_id: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub deal_note: Option<Value>,
}

/// Response for a client-supplied deal note.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDealNote {
    pub deal_note_id: String,
    pub startup_id: String,
    #[schema(value_type = Object)]
    pub deal_note: Value,
    pub status: &'static str,
}

/// How a generated deal note was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DealNoteOutcome {
    /// Produced by the analyst.
    Completed,
    /// Synthesised locally.
    CompletedMock,
}

impl DealNoteOutcome {
    /// Wire spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::CompletedMock => "completed_mock",
        }
    }

    /// Human-readable confirmation.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Completed => "Deal note generated successfully",
            Self::CompletedMock => "Deal note generated using mock data",
        }
    }
}

/// Result of deal note generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDealNote {
    pub deal_note_id: String,
    pub note: Value,
    pub outcome: DealNoteOutcome,
    pub profile_sync: SideEffectStatus,
}

/// Deal note persistence and generation.
pub struct DealNoteService {
    store: Arc<dyn DocumentStore>,
    analyst: Arc<dyn AnalystAgent>,
    pitch_decks: Arc<PitchDeckService>,
    questionnaires: Arc<QuestionnaireService>,
    clock: Arc<dyn Clock>,
}

impl DealNoteService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        analyst: Arc<dyn AnalystAgent>,
        pitch_decks: Arc<PitchDeckService>,
        questionnaires: Arc<QuestionnaireService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            analyst,
            pitch_decks,
            questionnaires,
            clock,
        }
    }

    fn now(&self) -> String {
        now_timestamp(self.clock.as_ref())
    }

    /// Store a deal note supplied by the client with `status = "completed"`.
    ///
    /// # Errors
    /// `startup_id_and_deal_note_required` when either is missing.
    pub async fn create(&self, form: DealNoteForm) -> Result<CreatedDealNote, Error> {
        let (Some(startup_id), Some(deal_note)) = (
            form.startup_id.filter(|id| !id.is_empty()),
            present(form.deal_note),
        ) else {
            return Err(Error::invalid_request("startup_id_and_deal_note_required"));
        };
        let data = stamped(
            object(json!({
                "startupId": startup_id,
                "pitchDeckId": nullable(form.pitch_deck_id.as_deref()),
                "questionnaireId": nullable(form.questionnaire_id.as_deref()),
                "qaResponseId": nullable(form.qa_response_id.as_deref()),
                "dealNote": deal_note,
                "status": "completed",
            })),
            &self.now(),
        );
        let id = self
            .store
            .add(Collection::DealNotes, data)
            .await
            .map_err(map_store_error)?;
        Ok(CreatedDealNote {
            deal_note_id: id,
            startup_id,
            deal_note,
            status: "completed",
        })
    }

    /// Every document in the collection, newest first.
    pub async fn list(&self) -> Result<Vec<Value>, Error> {
        let documents = self
            .store
            .query(Collection::DealNotes, &DocumentQuery::new().newest_first())
            .await
            .map_err(map_store_error)?;
        Ok(documents_json(documents))
    }

    /// Deal note by identifier.
    ///
    /// # Errors
    /// `deal_note_not_found` when absent.
    pub async fn get(&self, id: &str) -> Result<Value, Error> {
        self.store
            .get(Collection::DealNotes, id)
            .await
            .map_err(map_store_error)?
            .map(|document| document.into_json())
            .ok_or_else(|| Error::not_found("deal_note_not_found"))
    }

    /// Newest deal note for a startup.
    ///
    /// # Errors
    /// `deal_note_not_found` when the startup has none.
    pub async fn latest_for_startup(&self, startup_id: &str) -> Result<Value, Error> {
        let mut found = self
            .store
            .query(
                Collection::DealNotes,
                &DocumentQuery::latest_for_startup(startup_id),
            )
            .await
            .map_err(map_store_error)?;
        found
            .pop()
            .map(|document| document.into_json())
            .ok_or_else(|| Error::not_found("deal_note_not_found"))
    }

    /// Run the analyst's full analysis for a startup and store the result.
    ///
    /// Analyst failures fall back to [`fallback_deal_note`]; only missing
    /// inputs and store failures are errors.
    ///
    /// # Errors
    /// `pitch_deck_not_found` or `questionnaire_not_found` when inputs are
    /// missing.
    pub async fn generate(&self, startup_id: &str) -> Result<GeneratedDealNote, Error> {
        let deck = self.pitch_decks.require_latest(startup_id).await?;
        let questionnaire = self.questionnaires.require_latest(startup_id).await?;
        let answers = load_answers(self.store.as_ref(), &questionnaire).await?;
        let questionnaire_answers = answers
            .map(|record| record.answer_map())
            .unwrap_or_default();

        let request = FullAnalysisRequest {
            startup_id: startup_id.to_owned(),
            pitch_deck_gcs_uri: deck.record.gcs_uri.clone(),
            questionnaire_answers,
        };
        let analysed = match self.analyst.analyse_startup(&request).await {
            Ok(analysed) => analysed,
            Err(err) => {
                warn!(%startup_id, error = %err, "full analysis failed; storing fallback deal note");
                AnalysedDealNote {
                    note: fallback_deal_note(),
                    provenance: NoteProvenance::Synthetic,
                }
            }
        };
        self.store_analysis(startup_id, analysed, Some(&deck.id), &questionnaire.id)
            .await
    }

    /// Persist an analysis result and refresh the profile for agent notes.
    async fn store_analysis(
        &self,
        startup_id: &str,
        analysed: AnalysedDealNote,
        pitch_deck_id: Option<&str>,
        questionnaire_id: &str,
    ) -> Result<GeneratedDealNote, Error> {
        let outcome = match analysed.provenance {
            NoteProvenance::Agent => DealNoteOutcome::Completed,
            NoteProvenance::Synthetic => DealNoteOutcome::CompletedMock,
        };

        let data = stamped(
            object(json!({
                "startupId": startup_id,
                "dealNote": analysed.note,
                "pitchDeckId": nullable(pitch_deck_id),
                "questionnaireId": questionnaire_id,
                "status": outcome.as_str(),
            })),
            &self.now(),
        );
        let deal_note_id = self
            .store
            .add(Collection::DealNotes, data)
            .await
            .map_err(map_store_error)?;
        info!(%startup_id, %deal_note_id, outcome = outcome.as_str(), "deal note generated");

        let profile_sync = match analysed.provenance {
            NoteProvenance::Agent => self.sync_profile(startup_id, &analysed.note).await,
            NoteProvenance::Synthetic => SideEffectStatus::Skipped,
        };
        Ok(GeneratedDealNote {
            deal_note_id,
            note: analysed.note,
            outcome,
            profile_sync,
        })
    }

    /// Store an externally produced deal note and refresh the profile.
    ///
    /// # Errors
    /// `deal_note_required` when the note is missing.
    pub async fn upload_real(
        &self,
        startup_id: &str,
        deal_note: Option<Value>,
    ) -> Result<(String, SideEffectStatus), Error> {
        let deal_note =
            present(deal_note).ok_or_else(|| Error::invalid_request("deal_note_required"))?;
        let data = stamped(
            object(json!({
                "startupId": startup_id,
                "dealNote": deal_note,
                "status": "uploaded",
            })),
            &self.now(),
        );
        let id = self
            .store
            .add(Collection::DealNotes, data)
            .await
            .map_err(map_store_error)?;
        let profile_sync = self.sync_profile(startup_id, &deal_note).await;
        Ok((id, profile_sync))
    }

    /// Copy listing fields from `note` onto the startup account.
    ///
    /// Best-effort: failures are logged and reported, never raised.
    pub async fn sync_profile(&self, startup_id: &str, note: &Value) -> SideEffectStatus {
        let Some(projection) = ProfileProjection::from_deal_note(note) else {
            return SideEffectStatus::Skipped;
        };
        let result = self
            .store
            .update(Collection::Users, startup_id, projection.into_patch(&self.now()))
            .await;
        SideEffectStatus::from_result("profile_sync", result)
    }
}

mod analysis_run;

pub use analysis_run::{AfterCallForm, AfterCallRun, AnalysedStartup, AnalysisStatus, PendingStartup};
