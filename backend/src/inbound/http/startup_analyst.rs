//! Startup analysis handlers under `/v1/startup-analyst`.
//!
//! ```text
//! POST /v1/startup-analyst/trigger-after-call {"startupId":"s1","questionnaireId":"q1"}
//! GET  /v1/startup-analyst/status/s1
//! ```

use actix_web::{get, post, web};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{AfterCallForm, AnalysisStatus, Error, SideEffectStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Response of a post-call analysis.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AfterCallResponse {
    pub success: bool,
    pub message: String,
    pub startup_id: String,
    pub company_name: String,
    pub company_website: String,
    pub questionnaire_id: String,
    pub pitch_deck_id: Option<String>,
    pub deal_note_id: String,
    #[schema(value_type = Object)]
    pub note: Value,
    /// `completed` or `completed_mock`.
    pub status: &'static str,
    pub profile_sync: SideEffectStatus,
}

/// Analyse a startup once its founder call has finished.
#[utoipa::path(
    post,
    path = "/v1/startup-analyst/trigger-after-call",
    request_body = AfterCallForm,
    responses(
        (status = 200, description = "Deal note stored", body = AfterCallResponse),
        (status = 400, description = "startupId_questionnaireId_required", body = Error),
        (status = 404, description = "startup_not_found or questionnaire_answers_not_found", body = Error),
        (status = 500, description = "startup_analyst_failed", body = Error)
    ),
    tags = ["startup-analyst"],
    operation_id = "triggerAnalysisAfterCall"
)]
#[post("/trigger-after-call")]
pub async fn trigger_after_call(
    state: web::Data<HttpState>,
    payload: web::Json<AfterCallForm>,
) -> ApiResult<web::Json<AfterCallResponse>> {
    let run = state.deal_notes.analyse_after_call(payload.into_inner()).await?;
    Ok(web::Json(AfterCallResponse {
        success: true,
        message: format!(
            "Startup analysis completed for {} after call completion",
            run.company_name
        ),
        startup_id: run.startup_id,
        company_name: run.company_name,
        company_website: run.company_website,
        questionnaire_id: run.questionnaire_id,
        pitch_deck_id: run.pitch_deck_id,
        deal_note_id: run.generated.deal_note_id,
        note: run.generated.note,
        status: run.generated.outcome.as_str(),
        profile_sync: run.generated.profile_sync,
    }))
}

/// Whether a startup has been analysed yet.
#[utoipa::path(
    get,
    path = "/v1/startup-analyst/status/{startupId}",
    params(("startupId" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Analysis status", body = AnalysisStatus)
    ),
    tags = ["startup-analyst"],
    operation_id = "startupAnalysisStatus"
)]
#[get("/status/{startup_id}")]
pub async fn analysis_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<AnalysisStatus>> {
    state
        .deal_notes
        .analysis_status(&path.into_inner())
        .await
        .map(web::Json)
}

/// Register every `/v1/startup-analyst` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/startup-analyst")
            .service(trigger_after_call)
            .service(analysis_status),
    );
}
