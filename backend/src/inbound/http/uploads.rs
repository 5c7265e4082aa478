//! Two-phase signed upload handlers under `/v1/uploads`.
//!
//! ```text
//! POST /v1/uploads/pitch:url {"startupId":"s1","fileName":"deck.pdf",
//!                             "contentType":"application/pdf","sizeBytes":1024}
//! POST /v1/uploads/{uploadId}/confirm
//! ```

use actix_web::{post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, IssuedUpload, PitchUploadForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Queued ingestion job.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmUploadResponse {
    /// Publish message identifier.
    pub job_id: String,
    pub status: &'static str,
}

/// Record an upload and return a 10 minute signed PUT URL.
#[utoipa::path(
    post,
    path = "/v1/uploads/pitch:url",
    request_body = PitchUploadForm,
    responses(
        (status = 200, description = "Signed upload issued", body = IssuedUpload),
        (status = 400, description = "invalid_request", body = Error),
        (status = 500, description = "gcs_bucket_not_configured", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "issuePitchUpload"
)]
#[post("/pitch:url")]
pub async fn issue_pitch_upload(
    state: web::Data<HttpState>,
    payload: web::Json<PitchUploadForm>,
) -> ApiResult<web::Json<IssuedUpload>> {
    state
        .uploads
        .issue_pitch_upload(payload.into_inner())
        .await
        .map(web::Json)
}

/// Publish the ingestion event for an upload.
#[utoipa::path(
    post,
    path = "/v1/uploads/{uploadId}/confirm",
    params(("uploadId" = String, Path, description = "Upload identifier")),
    responses(
        (status = 200, description = "Ingestion queued", body = ConfirmUploadResponse),
        (status = 404, description = "upload_not_found", body = Error),
        (status = 500, description = "Publish failed", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "confirmUpload"
)]
#[post("/{upload_id}/confirm")]
pub async fn confirm_upload(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ConfirmUploadResponse>> {
    let job_id = state.uploads.confirm(&path.into_inner()).await?;
    Ok(web::Json(ConfirmUploadResponse {
        job_id,
        status: "queued",
    }))
}

/// Register every `/v1/uploads` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/uploads")
            .service(issue_pitch_upload)
            .service(confirm_upload),
    );
}
