//! Pitch deck metadata.

use std::sync::Arc;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::{
    Collection, DocumentQuery, DocumentStore, Stored, to_document_data,
};
use crate::domain::service_support::map_store_error;
use crate::domain::{Error, now_timestamp};

/// Default content type for decks uploaded without one.
pub const DEFAULT_DECK_CONTENT_TYPE: &str = "application/pdf";

/// Stored pitch deck record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PitchDeck {
    pub startup_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub gcs_uri: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Pitch deck registration payload.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PitchDeckForm {
    pub startup_id: Option<String>,
    pub file_name: Option<String>,
    pub gcs_uri: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: Option<u64>,
}

impl PitchDeckForm {
    /// Validate, reporting `code` when a required field is missing.
    ///
    /// The code differs between the startup flow and the plain pitch-deck
    /// route, so callers pass it in.
    pub fn validate(self, code: &str) -> Result<NewPitchDeck, Error> {
        let required = |value: Option<String>| value.filter(|text| !text.is_empty());
        match (
            required(self.startup_id),
            required(self.file_name),
            required(self.gcs_uri),
        ) {
            (Some(startup_id), Some(file_name), Some(gcs_uri)) => Ok(NewPitchDeck {
                startup_id,
                file_name,
                gcs_uri,
                content_type: self
                    .content_type
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| DEFAULT_DECK_CONTENT_TYPE.to_owned()),
                size_bytes: self.size_bytes.unwrap_or(0),
            }),
            _ => Err(Error::invalid_request(code)),
        }
    }
}

/// Validated pitch deck registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPitchDeck {
    pub startup_id: String,
    pub file_name: String,
    pub gcs_uri: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Pitch deck persistence.
pub struct PitchDeckService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl PitchDeckService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Record an uploaded deck with `status = "uploaded"`.
    pub async fn create(&self, deck: NewPitchDeck) -> Result<Stored<PitchDeck>, Error> {
        let now = now_timestamp(self.clock.as_ref());
        let record = PitchDeck {
            startup_id: deck.startup_id,
            file_name: deck.file_name,
            gcs_uri: deck.gcs_uri,
            content_type: deck.content_type,
            size_bytes: deck.size_bytes,
            status: "uploaded".to_owned(),
            created_at: now.clone(),
            updated_at: now,
        };
        let data = to_document_data(&record).map_err(map_store_error)?;
        let id = self
            .store
            .add(Collection::PitchDecks, data)
            .await
            .map_err(map_store_error)?;
        info!(pitch_deck_id = %id, startup_id = %record.startup_id, "pitch deck recorded");
        Ok(Stored { id, record })
    }

    /// Deck by identifier.
    ///
    /// # Errors
    /// `pitch_deck_not_found` when absent.
    pub async fn get(&self, id: &str) -> Result<Stored<PitchDeck>, Error> {
        self.store
            .get(Collection::PitchDecks, id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("pitch_deck_not_found"))?
            .into_record()
            .map_err(map_store_error)
    }

    /// Newest deck for a startup, if any.
    pub async fn latest_for_startup(
        &self,
        startup_id: &str,
    ) -> Result<Option<Stored<PitchDeck>>, Error> {
        let mut found = self
            .store
            .query(
                Collection::PitchDecks,
                &DocumentQuery::latest_for_startup(startup_id),
            )
            .await
            .map_err(map_store_error)?;
        found
            .pop()
            .map(|document| document.into_record().map_err(map_store_error))
            .transpose()
    }

    /// Newest deck for a startup.
    ///
    /// # Errors
    /// `pitch_deck_not_found` when the startup has none.
    pub async fn require_latest(&self, startup_id: &str) -> Result<Stored<PitchDeck>, Error> {
        self.latest_for_startup(startup_id)
            .await?
            .ok_or_else(|| Error::not_found("pitch_deck_not_found"))
    }
}
