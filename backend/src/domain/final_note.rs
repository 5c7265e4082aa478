//! Version 2 final notes.

use std::sync::Arc;

use mockable::Clock;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::{Collection, DocumentQuery, DocumentStore, SortDirection};
use crate::domain::service_support::{map_store_error, nullable, object, stamped};
use crate::domain::{Error, now_timestamp};

/// Final note generation request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalNoteForm {
    pub startup_id: Option<String>,
    pub note_id: Option<String>,
    pub questionnaire_id: Option<String>,
    pub founder_answers_id: Option<String>,
}

/// Writes and reads final notes in the `deal_notes` collection.
pub struct FinalNoteService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl FinalNoteService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Store the stub v2 final note for a startup.
    ///
    /// # Errors
    /// `startupId_required` when the startup is missing.
    pub async fn generate(&self, form: FinalNoteForm) -> Result<String, Error> {
        let startup_id = form
            .startup_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::invalid_request("startupId_required"))?;
        let data = stamped(
            object(json!({
                "startupId": startup_id,
                "noteId": nullable(form.note_id.as_deref()),
                "questionnaireId": nullable(form.questionnaire_id.as_deref()),
                "founderAnswersId": nullable(form.founder_answers_id.as_deref()),
                "version": 2,
                "schemaVersion": "v2",
                "scorecard": {
                    "team": 8,
                    "market": 7.5,
                    "product": 8,
                    "traction": 7,
                    "risk": 0.3,
                    "overall": 7.6,
                },
                "risks": [{"type": "metric_inconsistency", "severity": "medium", "note": "stub"}],
                "benchmarks": {"source": "stub"},
                "recommendation": "Proceed",
                "json": {"title": "Stub Final Note"},
                "status": "ready",
            })),
            &now_timestamp(self.clock.as_ref()),
        );
        let id = self
            .store
            .add(Collection::DealNotes, data)
            .await
            .map_err(map_store_error)?;
        info!(%startup_id, final_note_id = %id, "final note generated");
        Ok(id)
    }

    /// Highest-version final note for a startup.
    ///
    /// # Errors
    /// `final_note_not_found` when the startup has none.
    pub async fn latest_for_startup(&self, startup_id: &str) -> Result<Value, Error> {
        let query = DocumentQuery::new()
            .where_eq("startupId", startup_id)
            .where_eq("schemaVersion", "v2")
            .order_by("version", SortDirection::Descending)
            .limit(1);
        let mut found = self
            .store
            .query(Collection::DealNotes, &query)
            .await
            .map_err(map_store_error)?;
        found
            .pop()
            .map(|document| document.into_json())
            .ok_or_else(|| Error::not_found("final_note_not_found"))
    }

    /// Final note by identifier.
    ///
    /// # Errors
    /// `final_note_not_found` when absent.
    pub async fn get(&self, id: &str) -> Result<Value, Error> {
        self.store
            .get(Collection::DealNotes, id)
            .await
            .map_err(map_store_error)?
            .map(|document| document.into_json())
            .ok_or_else(|| Error::not_found("final_note_not_found"))
    }
}
