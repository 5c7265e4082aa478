//! Direct agent invocations under `/v1/agents`.
//!
//! ```text
//! POST /v1/agents/ingestion:run     {"startupId":"s1","gcsUri":"gs://b/deck.pdf"}
//! POST /v1/agents/deep-research:run {"noteId":"n1"}
//! POST /v1/agents/deal-screener:run {"sessionId":"chat-1","message":"fintech?"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::QuestionnaireContext;
use crate::domain::{ChatReply, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{optional_text, required_text};

/// Ingestion or full analysis input.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub startup_id: Option<String>,
    pub gcs_uri: Option<String>,
    pub upload_id: Option<String>,
}

/// Note to research or score.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    pub note_id: Option<String>,
}

/// Analyst note produced or updated.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteReadyResponse {
    pub note_id: String,
    pub status: &'static str,
}

/// Questionnaire generation input.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireRunRequest {
    pub startup_id: Option<String>,
    pub note_id: Option<String>,
}

/// Generated questionnaire.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireRunResponse {
    pub questionnaire_id: String,
    pub status: &'static str,
}

/// Question needing advice.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssistRequest {
    pub questionnaire_id: Option<String>,
    pub question: Option<String>,
}

/// Advice text.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssistResponse {
    pub response: String,
}

/// One chat turn.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: Option<String>,
    /// Deal note discussed in a deep dive.
    pub deal_note_id: Option<String>,
    /// Questionnaire discussed in questionnaire chat.
    pub questionnaire_id: Option<String>,
}

struct ChatTurn {
    session_id: String,
    message: String,
}

fn chat_turn(session_id: Option<String>, message: Option<String>) -> Result<ChatTurn, Error> {
    Ok(ChatTurn {
        session_id: required_text(session_id, "sessionId_required")?,
        message: required_text(message, "message_required")?,
    })
}

const READY: &str = "ready";

/// Ingest a pitch deck into a new analyst note.
#[utoipa::path(
    post,
    path = "/v1/agents/ingestion:run",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Note stored", body = NoteReadyResponse),
        (status = 400, description = "startupId_required or gcsUri_required", body = Error),
        (status = 500, description = "Ingestion agent failed", body = Error)
    ),
    tags = ["agents"],
    operation_id = "runIngestion"
)]
#[post("/ingestion:run")]
pub async fn run_ingestion(
    state: web::Data<HttpState>,
    payload: web::Json<AnalysisRequest>,
) -> ApiResult<web::Json<NoteReadyResponse>> {
    let AnalysisRequest {
        startup_id,
        gcs_uri,
        upload_id,
    } = payload.into_inner();
    let startup_id = required_text(startup_id, "startupId_required")?;
    let gcs_uri = required_text(gcs_uri, "gcsUri_required")?;
    let note_id = state
        .analyst
        .run_ingestion(&startup_id, &gcs_uri, optional_text(upload_id).as_deref())
        .await?;
    Ok(web::Json(NoteReadyResponse {
        note_id,
        status: READY,
    }))
}

/// Verify the claims of a note.
#[utoipa::path(
    post,
    path = "/v1/agents/deep-research:run",
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Verification merged", body = NoteReadyResponse),
        (status = 400, description = "noteId_required", body = Error),
        (status = 404, description = "note_not_found", body = Error)
    ),
    tags = ["agents"],
    operation_id = "runDeepResearch"
)]
#[post("/deep-research:run")]
pub async fn run_deep_research(
    state: web::Data<HttpState>,
    payload: web::Json<NoteRequest>,
) -> ApiResult<web::Json<NoteReadyResponse>> {
    let note_id = required_text(payload.into_inner().note_id, "noteId_required")?;
    state.analyst.run_deep_research(&note_id).await?;
    Ok(web::Json(NoteReadyResponse {
        note_id,
        status: READY,
    }))
}

/// Score a note.
#[utoipa::path(
    post,
    path = "/v1/agents/deal-scoring:run",
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Score merged", body = NoteReadyResponse),
        (status = 400, description = "noteId_required", body = Error),
        (status = 404, description = "note_not_found", body = Error)
    ),
    tags = ["agents"],
    operation_id = "runDealScoring"
)]
#[post("/deal-scoring:run")]
pub async fn run_deal_scoring(
    state: web::Data<HttpState>,
    payload: web::Json<NoteRequest>,
) -> ApiResult<web::Json<NoteReadyResponse>> {
    let note_id = required_text(payload.into_inner().note_id, "noteId_required")?;
    state.analyst.run_deal_scoring(&note_id).await?;
    Ok(web::Json(NoteReadyResponse {
        note_id,
        status: READY,
    }))
}

/// Ingestion, research and scoring in sequence.
#[utoipa::path(
    post,
    path = "/v1/agents/full-analysis:run",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Note analysed", body = NoteReadyResponse),
        (status = 400, description = "startupId_required or gcsUri_required", body = Error),
        (status = 500, description = "Full analysis failed", body = Error)
    ),
    tags = ["agents"],
    operation_id = "runFullAnalysis"
)]
#[post("/full-analysis:run")]
pub async fn run_full_analysis(
    state: web::Data<HttpState>,
    payload: web::Json<AnalysisRequest>,
) -> ApiResult<web::Json<NoteReadyResponse>> {
    let AnalysisRequest {
        startup_id,
        gcs_uri,
        ..
    } = payload.into_inner();
    let startup_id = required_text(startup_id, "startupId_required")?;
    let gcs_uri = required_text(gcs_uri, "gcsUri_required")?;
    let note_id = state
        .analyst
        .run_full_analysis(&startup_id, &gcs_uri)
        .await?;
    Ok(web::Json(NoteReadyResponse {
        note_id,
        status: READY,
    }))
}

/// Generate a questionnaire, optionally from an analyst note.
#[utoipa::path(
    post,
    path = "/v1/agents/questionnaire:run",
    request_body = QuestionnaireRunRequest,
    responses(
        (status = 200, description = "Questionnaire stored", body = QuestionnaireRunResponse),
        (status = 400, description = "startupId_required", body = Error)
    ),
    tags = ["agents"],
    operation_id = "runQuestionnaire"
)]
#[post("/questionnaire:run")]
pub async fn run_questionnaire(
    state: web::Data<HttpState>,
    payload: web::Json<QuestionnaireRunRequest>,
) -> ApiResult<web::Json<QuestionnaireRunResponse>> {
    let QuestionnaireRunRequest {
        startup_id,
        note_id,
    } = payload.into_inner();
    let context = QuestionnaireContext {
        startup_id: required_text(startup_id, "startupId_required")?,
        note_id: optional_text(note_id),
        pitch_deck_id: None,
        pitch_deck_gcs_uri: None,
    };
    let generated = state.questionnaires.generate_questionnaire(context).await?;
    Ok(web::Json(QuestionnaireRunResponse {
        questionnaire_id: generated.questionnaire_id,
        status: READY,
    }))
}

/// Advice for answering one question.
#[utoipa::path(
    post,
    path = "/v1/agents/questionnaire-assist:run",
    request_body = AssistRequest,
    responses(
        (status = 200, description = "Advice", body = AssistResponse),
        (status = 400, description = "questionnaireId_required or question_required", body = Error),
        (status = 404, description = "questionnaire_not_found", body = Error)
    ),
    tags = ["agents"],
    operation_id = "runQuestionnaireAssist"
)]
#[post("/questionnaire-assist:run")]
pub async fn run_questionnaire_assist(
    state: web::Data<HttpState>,
    payload: web::Json<AssistRequest>,
) -> ApiResult<web::Json<AssistResponse>> {
    let AssistRequest {
        questionnaire_id,
        question,
    } = payload.into_inner();
    let questionnaire_id = required_text(questionnaire_id, "questionnaireId_required")?;
    let question = required_text(question, "question_required")?;
    let response = state
        .questionnaires
        .get_questionnaire_assistance(&questionnaire_id, &question)
        .await?;
    Ok(web::Json(AssistResponse { response }))
}

/// Sector screening chat.
#[utoipa::path(
    post,
    path = "/v1/agents/deal-screener:run",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply and transcript outcome", body = ChatReply),
        (status = 400, description = "sessionId_required or message_required", body = Error)
    ),
    tags = ["agents"],
    operation_id = "runDealScreener"
)]
#[post("/deal-screener:run")]
pub async fn run_deal_screener(
    state: web::Data<HttpState>,
    payload: web::Json<ChatRequest>,
) -> ApiResult<web::Json<ChatReply>> {
    let ChatRequest {
        session_id,
        message,
        ..
    } = payload.into_inner();
    let turn = chat_turn(session_id, message)?;
    state
        .chatbot
        .process_deal_screener_message(&turn.session_id, &turn.message)
        .await
        .map(web::Json)
}

/// Company deep-dive chat.
#[utoipa::path(
    post,
    path = "/v1/agents/deep-dive:run",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply and transcript outcome", body = ChatReply),
        (status = 400, description = "sessionId_required or message_required", body = Error)
    ),
    tags = ["agents"],
    operation_id = "runDeepDive"
)]
#[post("/deep-dive:run")]
pub async fn run_deep_dive(
    state: web::Data<HttpState>,
    payload: web::Json<ChatRequest>,
) -> ApiResult<web::Json<ChatReply>> {
    let ChatRequest {
        session_id,
        message,
        deal_note_id,
        ..
    } = payload.into_inner();
    let turn = chat_turn(session_id, message)?;
    state
        .chatbot
        .process_deep_dive_message(&turn.session_id, &turn.message, optional_text(deal_note_id))
        .await
        .map(web::Json)
}

/// Founder coaching chat about a questionnaire.
#[utoipa::path(
    post,
    path = "/v1/agents/questionnaire-chat:run",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply and transcript outcome", body = ChatReply),
        (status = 400, description = "sessionId_required, message_required or questionnaireId_required", body = Error)
    ),
    tags = ["agents"],
    operation_id = "runQuestionnaireChat"
)]
#[post("/questionnaire-chat:run")]
pub async fn run_questionnaire_chat(
    state: web::Data<HttpState>,
    payload: web::Json<ChatRequest>,
) -> ApiResult<web::Json<ChatReply>> {
    let ChatRequest {
        session_id,
        message,
        questionnaire_id,
        ..
    } = payload.into_inner();
    let turn = chat_turn(session_id, message)?;
    let questionnaire_id = required_text(questionnaire_id, "questionnaireId_required")?;
    state
        .chatbot
        .process_questionnaire_message(&turn.session_id, &turn.message, &questionnaire_id)
        .await
        .map(web::Json)
}

/// Register every `/v1/agents` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/agents")
            .service(run_ingestion)
            .service(run_deep_research)
            .service(run_deal_scoring)
            .service(run_full_analysis)
            .service(run_questionnaire)
            .service(run_questionnaire_assist)
            .service(run_deal_screener)
            .service(run_deep_dive)
            .service(run_questionnaire_chat),
    );
}
