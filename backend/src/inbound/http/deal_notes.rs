//! Deal note handlers under `/v1/deal-notes`.

use actix_web::{get, post, web};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{CreatedDealNote, DealNoteForm, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// `{dealNotes, total}` listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealNotesResponse {
    #[schema(value_type = Vec<Object>)]
    pub deal_notes: Vec<Value>,
    pub total: usize,
}

/// Store a client-supplied deal note.
#[utoipa::path(
    post,
    path = "/v1/deal-notes",
    request_body = DealNoteForm,
    responses(
        (status = 200, description = "Deal note stored", body = CreatedDealNote),
        (status = 400, description = "startup_id_and_deal_note_required", body = Error)
    ),
    tags = ["deal-notes"],
    operation_id = "createDealNote"
)]
#[post("")]
pub async fn create_deal_note(
    state: web::Data<HttpState>,
    payload: web::Json<DealNoteForm>,
) -> ApiResult<web::Json<CreatedDealNote>> {
    state
        .deal_notes
        .create(payload.into_inner())
        .await
        .map(web::Json)
}

/// Every deal note, newest first.
#[utoipa::path(
    get,
    path = "/v1/deal-notes",
    responses((status = 200, description = "Deal notes", body = DealNotesResponse)),
    tags = ["deal-notes"],
    operation_id = "listDealNotes"
)]
#[get("")]
pub async fn list_deal_notes(state: web::Data<HttpState>) -> ApiResult<web::Json<DealNotesResponse>> {
    let deal_notes = state.deal_notes.list().await?;
    Ok(web::Json(DealNotesResponse {
        total: deal_notes.len(),
        deal_notes,
    }))
}

/// Newest deal note of a startup.
#[utoipa::path(
    get,
    path = "/v1/deal-notes/startup/{startupId}",
    params(("startupId" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Latest deal note", body = serde_json::Value),
        (status = 404, description = "deal_note_not_found", body = Error)
    ),
    tags = ["deal-notes"],
    operation_id = "latestDealNoteForStartup"
)]
#[get("/startup/{startup_id}")]
pub async fn deal_note_for_startup(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    state
        .deal_notes
        .latest_for_startup(&path.into_inner())
        .await
        .map(web::Json)
}

/// Deal note by identifier.
#[utoipa::path(
    get,
    path = "/v1/deal-notes/{id}",
    params(("id" = String, Path, description = "Deal note identifier")),
    responses(
        (status = 200, description = "Deal note", body = serde_json::Value),
        (status = 404, description = "deal_note_not_found", body = Error)
    ),
    tags = ["deal-notes"],
    operation_id = "getDealNote"
)]
#[get("/{id}")]
pub async fn get_deal_note(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    state.deal_notes.get(&path.into_inner()).await.map(web::Json)
}

/// Register every `/v1/deal-notes` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/deal-notes")
            .service(create_deal_note)
            .service(list_deal_notes)
            .service(deal_note_for_startup)
            .service(get_deal_note),
    );
}
