//! Two-phase pitch deck uploads and signed download links.
//!
//! Phase one records an `uploads` document and hands the client a signed
//! PUT URL. Phase two publishes `startup.pitch_uploaded` to the ingestion
//! topic; the push callback lands in [`crate::domain::IngestionEventService`].

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::pitch_deck::{PitchDeck, PitchDeckService};
use crate::domain::ports::{
    Collection, DocumentStore, EventPublisher, EventPublisherError, ObjectStorage,
    ObjectStorageError, SignedUrlMethod, SignedUrlRequest, Stored,
};
use crate::domain::service_support::{map_store_error, object, stamped};
use crate::domain::{Error, ErrorKind, GcsUri, format_timestamp, now_timestamp};

/// Validity of upload URLs.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(10 * 60);
/// Validity of download URLs.
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(60 * 60);
/// Event type published on confirmation.
pub const PITCH_UPLOADED_EVENT: &str = "startup.pitch_uploaded";

fn map_storage_error(error: ObjectStorageError) -> Error {
    Error::internal(error.to_string())
}

fn map_publisher_error(error: EventPublisherError) -> Error {
    Error::internal(error.to_string())
}

/// Signed upload request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PitchUploadForm {
    pub startup_id: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: Option<u64>,
}

/// Signed upload handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedUpload {
    pub upload_url: String,
    pub gcs_uri: String,
    pub upload_id: String,
}

/// Deck metadata plus a time-limited download link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchDeckDownload {
    #[serde(flatten)]
    pub deck: Stored<PitchDeck>,
    pub download_url: String,
    pub expires_at: String,
}

/// Upload handshakes and signed links.
pub struct UploadService {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
    publisher: Arc<dyn EventPublisher>,
    pitch_decks: Arc<PitchDeckService>,
    clock: Arc<dyn Clock>,
    bucket: Option<String>,
    topic: String,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        publisher: Arc<dyn EventPublisher>,
        pitch_decks: Arc<PitchDeckService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            storage,
            publisher,
            pitch_decks,
            clock,
            bucket: None,
            topic: String::new(),
        }
    }

    /// Bucket receiving uploads; `None` disables phase one.
    #[must_use]
    pub fn with_bucket(mut self, bucket: Option<String>) -> Self {
        self.bucket = bucket.filter(|name| !name.is_empty());
        self
    }

    /// Topic receiving confirmation events.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Record an upload and sign a 10 minute PUT URL for it.
    ///
    /// # Errors
    /// `invalid_request` unless every field is present and the size is
    /// non-zero; `gcs_bucket_not_configured` without a bucket.
    pub async fn issue_pitch_upload(&self, form: PitchUploadForm) -> Result<IssuedUpload, Error> {
        let present = |value: Option<String>| value.filter(|text| !text.is_empty());
        let (Some(startup_id), Some(file_name), Some(content_type), Some(size_bytes)) = (
            present(form.startup_id),
            present(form.file_name),
            present(form.content_type),
            form.size_bytes.filter(|size| *size > 0),
        ) else {
            return Err(Error::invalid_request("invalid_request"));
        };
        let bucket = self
            .bucket
            .as_deref()
            .ok_or_else(|| Error::new(ErrorKind::Internal, "gcs_bucket_not_configured"))?;

        let millis = self.clock.utc().timestamp_millis();
        let object_uri = GcsUri::new(
            bucket,
            format!("pitch_decks/{startup_id}/{millis}_{file_name}"),
        );
        let signed = self
            .storage
            .signed_url(&SignedUrlRequest {
                object: object_uri.clone(),
                method: SignedUrlMethod::Put,
                expires_in: UPLOAD_URL_TTL,
                content_type: Some(content_type.clone()),
            })
            .await
            .map_err(map_storage_error)?;

        let gcs_uri = object_uri.to_string();
        let data = stamped(
            object(json!({
                "startupId": startup_id,
                "type": "pitch_deck",
                "gcsUri": gcs_uri,
                "fileName": file_name,
                "contentType": content_type,
                "sizeBytes": size_bytes,
                "status": "uploaded",
            })),
            &now_timestamp(self.clock.as_ref()),
        );
        let upload_id = self
            .store
            .add(Collection::Uploads, data)
            .await
            .map_err(map_store_error)?;
        info!(%startup_id, %upload_id, %gcs_uri, "upload url issued");
        Ok(IssuedUpload {
            upload_url: signed.url,
            gcs_uri,
            upload_id,
        })
    }

    /// Publish the ingestion event for an upload, returning the message id.
    ///
    /// # Errors
    /// `upload_not_found` when the upload is unknown.
    pub async fn confirm(&self, upload_id: &str) -> Result<String, Error> {
        let upload = self
            .store
            .get(Collection::Uploads, upload_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("upload_not_found"))?;
        let payload = json!({
            "type": PITCH_UPLOADED_EVENT,
            "uploadId": upload_id,
            "startupId": upload.field("startupId"),
            "gcsUri": upload.field("gcsUri"),
        });
        let job_id = self
            .publisher
            .publish(&self.topic, &payload)
            .await
            .map_err(map_publisher_error)?;
        info!(%upload_id, %job_id, topic = %self.topic, "upload confirmed");
        Ok(job_id)
    }

    /// Deck metadata with a one hour GET URL.
    ///
    /// # Errors
    /// `pitch_deck_not_found`, or `invalid_gcs_uri` when the stored location
    /// is not a `gs://` URI.
    pub async fn download_url(&self, pitch_deck_id: &str) -> Result<PitchDeckDownload, Error> {
        let deck = self.pitch_decks.get(pitch_deck_id).await?;
        let location = GcsUri::parse(&deck.record.gcs_uri)
            .ok_or_else(|| Error::invalid_request("invalid_gcs_uri"))?;
        let signed = self
            .storage
            .signed_url(&SignedUrlRequest {
                object: location,
                method: SignedUrlMethod::Get,
                expires_in: DOWNLOAD_URL_TTL,
                content_type: None,
            })
            .await
            .map_err(map_storage_error)?;
        Ok(PitchDeckDownload {
            deck,
            download_url: signed.url,
            expires_at: format_timestamp(signed.expires_at),
        })
    }
}
