//! Analyst notes and the ingestion, research and scoring pipeline.
//!
//! The analyst agent only produces JSON; this service owns every write so
//! the live and synthetic agents observe one storage contract. Analyst notes
//! live in the `deal_notes` collection next to deal notes and final notes.

use std::sync::Arc;

use mockable::Clock;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::domain::ports::{
    AnalystAgent, Collection, DocumentQuery, DocumentStore, IngestionRequest, SortDirection,
};
use crate::domain::service_support::{
    documents_json, map_agent_error, map_store_error, object, stamped,
};
use crate::domain::{Error, now_timestamp};

/// Summary stored on agent-ingested notes.
pub const INGESTION_SUMMARY: &str = "Automatically ingested from pitch deck";

/// Wrapper around the analyst agent that persists its output.
pub struct AnalystService {
    store: Arc<dyn DocumentStore>,
    agent: Arc<dyn AnalystAgent>,
    clock: Arc<dyn Clock>,
}

impl AnalystService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        agent: Arc<dyn AnalystAgent>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            agent,
            clock,
        }
    }

    fn now(&self) -> String {
        now_timestamp(self.clock.as_ref())
    }

    /// Ingest a pitch deck into a new analyst note.
    ///
    /// The note is stored under the agent's identifier when it supplies one.
    ///
    /// # Errors
    /// `internal_error` prefixed `Ingestion agent failed:`.
    pub async fn run_ingestion(
        &self,
        startup_id: &str,
        gcs_uri: &str,
        upload_id: Option<&str>,
    ) -> Result<String, Error> {
        let request = IngestionRequest {
            startup_id: startup_id.to_owned(),
            gcs_uri: gcs_uri.to_owned(),
            upload_id: upload_id.map(str::to_owned),
        };
        let ingested = self
            .agent
            .ingest(&request)
            .await
            .map_err(|err| map_agent_error("Ingestion agent", &err))?;

        let data = stamped(
            object(json!({
                "startupId": startup_id,
                "version": 1,
                "schemaVersion": "v1",
                "source": "ingestion_agent",
                "summary": INGESTION_SUMMARY,
                "status": "ready",
                "json": ingested.note,
            })),
            &self.now(),
        );
        let note_id = match ingested.note_id {
            Some(note_id) => {
                self.store
                    .set(Collection::DealNotes, &note_id, data)
                    .await
                    .map_err(map_store_error)?;
                note_id
            }
            None => self
                .store
                .add(Collection::DealNotes, data)
                .await
                .map_err(map_store_error)?,
        };
        info!(%startup_id, %note_id, "ingestion note stored");
        Ok(note_id)
    }

    /// Verify the claims of a note and merge the result at `json.verification`.
    ///
    /// # Errors
    /// `note_not_found`, or `internal_error` prefixed `Deep research agent failed:`.
    pub async fn run_deep_research(&self, note_id: &str) -> Result<(), Error> {
        let note = self.note_body(note_id).await?;
        let verification = self
            .agent
            .research(note_id, &note)
            .await
            .map_err(|err| map_agent_error("Deep research agent", &err))?;
        self.merge(note_id, "json.verification", verification).await?;
        info!(%note_id, "deep research merged");
        Ok(())
    }

    /// Score a note and merge the result at `json.score`.
    ///
    /// # Errors
    /// `note_not_found`, or `internal_error` prefixed `Deal scoring agent failed:`.
    pub async fn run_deal_scoring(&self, note_id: &str) -> Result<(), Error> {
        let note = self.note_body(note_id).await?;
        let score = self
            .agent
            .score(note_id, &note)
            .await
            .map_err(|err| map_agent_error("Deal scoring agent", &err))?;
        self.merge(note_id, "json.score", score).await?;
        info!(%note_id, "deal score merged");
        Ok(())
    }

    /// Ingestion, then research, then scoring. The first failure aborts.
    ///
    /// # Errors
    /// `internal_error` prefixed `Full analysis failed:` wrapping the stage error.
    pub async fn run_full_analysis(&self, startup_id: &str, gcs_uri: &str) -> Result<String, Error> {
        let pipeline = async {
            let note_id = self.run_ingestion(startup_id, gcs_uri, None).await?;
            self.run_deep_research(&note_id).await?;
            self.run_deal_scoring(&note_id).await?;
            Ok::<_, Error>(note_id)
        };
        pipeline.await.map_err(|err| {
            let stage = err.message().unwrap_or(err.code()).to_owned();
            Error::internal(format!("Full analysis failed: {stage}"))
        })
    }

    /// Analyst note by identifier.
    ///
    /// # Errors
    /// `note_not_found` when absent.
    pub async fn get_note(&self, note_id: &str) -> Result<Value, Error> {
        self.store
            .get(Collection::DealNotes, note_id)
            .await
            .map_err(map_store_error)?
            .map(|document| document.into_json())
            .ok_or_else(|| Error::not_found("note_not_found"))
    }

    /// Notes for a startup, highest version first.
    pub async fn notes_for_startup(&self, startup_id: &str, limit: usize) -> Result<Vec<Value>, Error> {
        let query = DocumentQuery::new()
            .where_eq("startupId", startup_id)
            .order_by("version", SortDirection::Descending)
            .limit(limit);
        let documents = self
            .store
            .query(Collection::DealNotes, &query)
            .await
            .map_err(map_store_error)?;
        Ok(documents_json(documents))
    }

    async fn note_body(&self, note_id: &str) -> Result<Value, Error> {
        let document = self
            .store
            .get(Collection::DealNotes, note_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("note_not_found"))?;
        Ok(document.field("json").cloned().unwrap_or(Value::Null))
    }

    async fn merge(&self, note_id: &str, path: &str, value: Value) -> Result<(), Error> {
        let mut patch = Map::new();
        patch.insert(path.to_owned(), value);
        patch.insert("updatedAt".to_owned(), Value::String(self.now()));
        self.store
            .update(Collection::DealNotes, note_id, patch)
            .await
            .map_err(map_store_error)
    }
}
