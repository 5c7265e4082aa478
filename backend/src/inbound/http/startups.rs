//! Founder flow and legacy profile handlers under `/v1/startups`.
//!
//! ```text
//! POST /v1/startups/upload-pitch
//! POST /v1/startups/{id}/generate-questionnaire
//! POST /v1/startups/{id}/save-answers {"answers":{"q1":"..."}}
//! POST /v1/startups/{id}/generate-deal-note
//! ```
//!
//! `deal-notes` routes must be registered before the `{id}` routes so the
//! literal segment is not captured as a startup id.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::Stored;
use crate::domain::{
    Error, GeneratedQuestionnaire, PitchDeck, PitchDeckForm, Questionnaire, ScheduleCallForm,
    ScheduledCall, SideEffectStatus, StartupProfileForm,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Analyst notes returned by `GET /v1/startups/{id}/notes`.
pub const STARTUP_NOTES_LIMIT: usize = 50;

/// Response of a founder deck upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PitchUploadResponse {
    pub pitch_deck_id: String,
    pub status: &'static str,
    /// `null` when questionnaire generation failed.
    pub questionnaire: Option<QuestionnaireReadyResponse>,
    pub message: &'static str,
}

/// Response of questionnaire generation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireReadyResponse {
    #[serde(flatten)]
    pub questionnaire: GeneratedQuestionnaire,
    pub status: &'static str,
}

impl QuestionnaireReadyResponse {
    fn ready(questionnaire: GeneratedQuestionnaire) -> Self {
        Self {
            questionnaire,
            status: "ready",
        }
    }
}

/// Founder answers payload.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SaveAnswersRequest {
    /// Map of question id to answer, or a list of `{questionId, answer}`.
    #[schema(value_type = Option<Object>)]
    pub answers: Option<Value>,
}

/// Response of `save-answers`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswersResponse {
    pub questionnaire_id: String,
    pub answer_id: String,
    pub status: &'static str,
    pub message: &'static str,
}

/// Response of deal note generation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDealNoteResponse {
    pub deal_note_id: String,
    #[schema(value_type = Object)]
    pub note: Value,
    /// `completed` or `completed_mock`.
    pub status: &'static str,
    pub message: &'static str,
    pub profile_sync: SideEffectStatus,
}

/// Externally produced deal note.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadDealNoteRequest {
    #[schema(value_type = Option<Object>)]
    pub deal_note: Option<Value>,
}

/// Response of `upload-real-deal-note`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadDealNoteResponse {
    pub deal_note_id: String,
    pub status: &'static str,
    pub message: &'static str,
    pub profile_sync: SideEffectStatus,
}

/// Call booking for the startup in the path.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartupCallRequest {
    pub questionnaire_id: Option<String>,
    pub scheduled_time: Option<String>,
    pub phone_number: Option<String>,
}

/// Booked call plus a confirmation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleCallResponse {
    #[serde(flatten)]
    pub call: ScheduledCall,
    pub message: &'static str,
}

/// `{calls}` wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct CallsResponse {
    #[schema(value_type = Vec<Object>)]
    pub calls: Vec<Value>,
}

/// `{dealNotes}` wrapper.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartupDealNotesResponse {
    #[schema(value_type = Vec<Object>)]
    pub deal_notes: Vec<Value>,
}

/// Identifier of a created profile.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: String,
}

/// Review status of a legacy profile.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartupStatusResponse {
    pub startup_id: String,
    pub status: &'static str,
}

/// `{notes}` wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct NotesResponse {
    #[schema(value_type = Vec<Object>)]
    pub notes: Vec<Value>,
}

/// Register a deck and try to generate its questionnaire.
#[utoipa::path(
    post,
    path = "/v1/startups/upload-pitch",
    request_body = PitchDeckForm,
    responses(
        (status = 200, description = "Deck stored", body = PitchUploadResponse),
        (status = 400, description = "startupId_fileName_gcsUri_required", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["startups"],
    operation_id = "uploadPitch"
)]
#[post("/upload-pitch")]
pub async fn upload_pitch(
    state: web::Data<HttpState>,
    payload: web::Json<PitchDeckForm>,
) -> ApiResult<web::Json<PitchUploadResponse>> {
    let outcome = state.startup_flow.upload_pitch(payload.into_inner()).await?;
    let message = outcome.message();
    Ok(web::Json(PitchUploadResponse {
        pitch_deck_id: outcome.pitch_deck_id,
        status: "uploaded",
        questionnaire: outcome.questionnaire.map(QuestionnaireReadyResponse::ready),
        message,
    }))
}

/// Newest deck of a startup.
#[utoipa::path(
    get,
    path = "/v1/startups/{id}/pitch-deck",
    params(("id" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Latest deck", body = serde_json::Value),
        (status = 404, description = "pitch_deck_not_found", body = Error)
    ),
    tags = ["startups"],
    operation_id = "startupPitchDeck"
)]
#[get("/{id}/pitch-deck")]
pub async fn startup_pitch_deck(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Stored<PitchDeck>>> {
    state
        .pitch_decks
        .require_latest(&path.into_inner())
        .await
        .map(web::Json)
}

/// Generate a questionnaire from the newest deck.
#[utoipa::path(
    post,
    path = "/v1/startups/{id}/generate-questionnaire",
    params(("id" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Questionnaire ready", body = QuestionnaireReadyResponse),
        (status = 404, description = "pitch_deck_not_found", body = Error),
        (status = 500, description = "Questionnaire generation failed", body = Error)
    ),
    tags = ["startups"],
    operation_id = "generateStartupQuestionnaire"
)]
#[post("/{id}/generate-questionnaire")]
pub async fn generate_questionnaire(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<QuestionnaireReadyResponse>> {
    let questionnaire = state
        .startup_flow
        .generate_questionnaire(&path.into_inner())
        .await?;
    Ok(web::Json(QuestionnaireReadyResponse::ready(questionnaire)))
}

/// Newest questionnaire of a startup.
#[utoipa::path(
    get,
    path = "/v1/startups/{id}/questionnaire",
    params(("id" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Latest questionnaire", body = serde_json::Value),
        (status = 404, description = "questionnaire_not_found", body = Error)
    ),
    tags = ["startups"],
    operation_id = "startupQuestionnaire"
)]
#[get("/{id}/questionnaire")]
pub async fn startup_questionnaire(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Stored<Questionnaire>>> {
    state
        .questionnaires
        .require_latest(&path.into_inner())
        .await
        .map(web::Json)
}

/// Attach answers to the newest questionnaire.
#[utoipa::path(
    post,
    path = "/v1/startups/{id}/save-answers",
    params(("id" = String, Path, description = "Startup identifier")),
    request_body = SaveAnswersRequest,
    responses(
        (status = 200, description = "Answers stored", body = SaveAnswersResponse),
        (status = 400, description = "answers_required", body = Error),
        (status = 404, description = "questionnaire_not_found", body = Error)
    ),
    tags = ["startups"],
    operation_id = "saveAnswers"
)]
#[post("/{id}/save-answers")]
pub async fn save_answers(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<SaveAnswersRequest>,
) -> ApiResult<web::Json<SaveAnswersResponse>> {
    let saved = state
        .questionnaires
        .save_answers(&path.into_inner(), payload.answers.as_ref())
        .await?;
    Ok(web::Json(SaveAnswersResponse {
        questionnaire_id: saved.questionnaire_id,
        answer_id: saved.answer_id,
        status: "answers_saved",
        message: "Answers saved successfully",
    }))
}

/// Run the full analysis, falling back to the stock note.
#[utoipa::path(
    post,
    path = "/v1/startups/{id}/generate-deal-note",
    params(("id" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Deal note stored", body = GenerateDealNoteResponse),
        (status = 404, description = "pitch_deck_not_found or questionnaire_not_found", body = Error)
    ),
    tags = ["startups"],
    operation_id = "generateDealNote"
)]
#[post("/{id}/generate-deal-note")]
pub async fn generate_deal_note(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<GenerateDealNoteResponse>> {
    let generated = state.deal_notes.generate(&path.into_inner()).await?;
    Ok(web::Json(GenerateDealNoteResponse {
        deal_note_id: generated.deal_note_id,
        note: generated.note,
        status: generated.outcome.as_str(),
        message: generated.outcome.message(),
        profile_sync: generated.profile_sync,
    }))
}

/// Newest deal note of a startup.
#[utoipa::path(
    get,
    path = "/v1/startups/{id}/deal-note",
    params(("id" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Latest deal note", body = serde_json::Value),
        (status = 404, description = "deal_note_not_found", body = Error)
    ),
    tags = ["startups"],
    operation_id = "startupDealNote"
)]
#[get("/{id}/deal-note")]
pub async fn startup_deal_note(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    state
        .deal_notes
        .latest_for_startup(&path.into_inner())
        .await
        .map(web::Json)
}

/// Every deal note, newest first.
#[utoipa::path(
    get,
    path = "/v1/startups/deal-notes",
    responses((status = 200, description = "Deal notes", body = StartupDealNotesResponse)),
    tags = ["startups"],
    operation_id = "listStartupDealNotes"
)]
#[get("/deal-notes")]
pub async fn list_startup_deal_notes(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<StartupDealNotesResponse>> {
    let deal_notes = state.deal_notes.list().await?;
    Ok(web::Json(StartupDealNotesResponse { deal_notes }))
}

/// Deal note by identifier.
#[utoipa::path(
    get,
    path = "/v1/startups/deal-notes/{id}",
    params(("id" = String, Path, description = "Deal note identifier")),
    responses(
        (status = 200, description = "Deal note", body = serde_json::Value),
        (status = 404, description = "deal_note_not_found", body = Error)
    ),
    tags = ["startups"],
    operation_id = "getStartupDealNote"
)]
#[get("/deal-notes/{id}")]
pub async fn get_startup_deal_note(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    state.deal_notes.get(&path.into_inner()).await.map(web::Json)
}

/// Store a deal note written outside the analyst.
#[utoipa::path(
    post,
    path = "/v1/startups/{id}/upload-real-deal-note",
    params(("id" = String, Path, description = "Startup identifier")),
    request_body = UploadDealNoteRequest,
    responses(
        (status = 200, description = "Deal note stored", body = UploadDealNoteResponse),
        (status = 400, description = "deal_note_required", body = Error)
    ),
    tags = ["startups"],
    operation_id = "uploadRealDealNote"
)]
#[post("/{id}/upload-real-deal-note")]
pub async fn upload_real_deal_note(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UploadDealNoteRequest>,
) -> ApiResult<web::Json<UploadDealNoteResponse>> {
    let (deal_note_id, profile_sync) = state
        .deal_notes
        .upload_real(&path.into_inner(), payload.into_inner().deal_note)
        .await?;
    Ok(web::Json(UploadDealNoteResponse {
        deal_note_id,
        status: "uploaded",
        message: "Real deal note uploaded successfully",
        profile_sync,
    }))
}

/// Book a follow-up call for the startup in the path.
#[utoipa::path(
    post,
    path = "/v1/startups/{id}/schedule-call",
    params(("id" = String, Path, description = "Startup identifier")),
    request_body = StartupCallRequest,
    responses(
        (status = 200, description = "Call booked", body = ScheduleCallResponse),
        (status = 400, description = "questionnaireId_and_scheduledTime_required", body = Error)
    ),
    tags = ["startups"],
    operation_id = "scheduleStartupCall"
)]
#[post("/{id}/schedule-call")]
pub async fn schedule_startup_call(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<StartupCallRequest>,
) -> ApiResult<web::Json<ScheduleCallResponse>> {
    let StartupCallRequest {
        questionnaire_id,
        scheduled_time,
        phone_number,
    } = payload.into_inner();
    let form = ScheduleCallForm {
        startup_id: Some(path.into_inner()),
        questionnaire_id,
        scheduled_time,
        phone_number,
    };
    let call = state
        .scheduler
        .schedule(form, "questionnaireId_and_scheduledTime_required")
        .await?;
    Ok(web::Json(ScheduleCallResponse {
        call,
        message: "Call scheduled successfully",
    }))
}

/// Calls booked by a startup, newest first.
#[utoipa::path(
    get,
    path = "/v1/startups/{id}/scheduled-calls",
    params(("id" = String, Path, description = "Startup identifier")),
    responses((status = 200, description = "Calls", body = CallsResponse)),
    tags = ["startups"],
    operation_id = "startupScheduledCalls"
)]
#[get("/{id}/scheduled-calls")]
pub async fn startup_scheduled_calls(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CallsResponse>> {
    let calls = state.scheduler.calls_for_startup(&path.into_inner()).await?;
    Ok(web::Json(CallsResponse { calls }))
}

/// Create a legacy startup profile.
#[utoipa::path(
    post,
    path = "/v1/startups",
    request_body = StartupProfileForm,
    responses(
        (status = 200, description = "Profile stored", body = CreatedResponse),
        (status = 400, description = "name_and_category_required", body = Error)
    ),
    tags = ["startups"],
    operation_id = "createStartupProfile"
)]
#[post("")]
pub async fn create_startup_profile(
    state: web::Data<HttpState>,
    payload: web::Json<StartupProfileForm>,
) -> ApiResult<web::Json<CreatedResponse>> {
    let id = state.startup_profiles.create(payload.into_inner()).await?;
    Ok(web::Json(CreatedResponse { id }))
}

/// Legacy startup profile.
#[utoipa::path(
    get,
    path = "/v1/startups/{id}",
    params(("id" = String, Path, description = "Profile identifier")),
    responses(
        (status = 200, description = "Profile", body = serde_json::Value),
        (status = 404, description = "startup_not_found", body = Error)
    ),
    tags = ["startups"],
    operation_id = "getStartupProfile"
)]
#[get("/{id}")]
pub async fn get_startup_profile(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    state
        .startup_profiles
        .get(&path.into_inner())
        .await
        .map(web::Json)
}

/// `{id, name, category, stage, geography}` of a legacy profile.
#[utoipa::path(
    get,
    path = "/v1/startups/{id}/summary",
    params(("id" = String, Path, description = "Profile identifier")),
    responses(
        (status = 200, description = "Summary", body = serde_json::Value),
        (status = 404, description = "startup_not_found", body = Error)
    ),
    tags = ["startups"],
    operation_id = "startupSummary"
)]
#[get("/{id}/summary")]
pub async fn startup_summary(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    state
        .startup_profiles
        .summary(&path.into_inner())
        .await
        .map(web::Json)
}

/// Review status. Reviews are not modelled, so always `pending`.
#[utoipa::path(
    get,
    path = "/v1/startups/{id}/status",
    params(("id" = String, Path, description = "Startup identifier")),
    responses((status = 200, description = "Status", body = StartupStatusResponse)),
    tags = ["startups"],
    operation_id = "startupStatus"
)]
#[get("/{id}/status")]
pub async fn startup_status(path: web::Path<String>) -> web::Json<StartupStatusResponse> {
    web::Json(StartupStatusResponse {
        startup_id: path.into_inner(),
        status: "pending",
    })
}

/// Analyst notes of a startup, highest version first.
#[utoipa::path(
    get,
    path = "/v1/startups/{id}/notes",
    params(("id" = String, Path, description = "Startup identifier")),
    responses((status = 200, description = "Notes", body = NotesResponse)),
    tags = ["startups"],
    operation_id = "startupNotes"
)]
#[get("/{id}/notes")]
pub async fn startup_notes(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<NotesResponse>> {
    let notes = state
        .analyst
        .notes_for_startup(&path.into_inner(), STARTUP_NOTES_LIMIT)
        .await?;
    Ok(web::Json(NotesResponse { notes }))
}

/// Register every `/v1/startups` handler in matching order.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/startups")
            .service(create_startup_profile)
            .service(upload_pitch)
            .service(list_startup_deal_notes)
            .service(get_startup_deal_note)
            .service(startup_pitch_deck)
            .service(generate_questionnaire)
            .service(startup_questionnaire)
            .service(save_answers)
            .service(generate_deal_note)
            .service(startup_deal_note)
            .service(upload_real_deal_note)
            .service(schedule_startup_call)
            .service(startup_scheduled_calls)
            .service(startup_summary)
            .service(startup_status)
            .service(startup_notes)
            .service(get_startup_profile),
    );
}
