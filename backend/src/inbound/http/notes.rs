//! Analyst note reads under `/v1/notes`.

use actix_web::{get, web};
use serde_json::Value;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::startups::{NotesResponse, STARTUP_NOTES_LIMIT};
use crate::inbound::http::state::HttpState;

/// Analyst notes of a startup, highest version first.
#[utoipa::path(
    get,
    path = "/v1/notes/by-startup/{startupId}",
    params(("startupId" = String, Path, description = "Startup identifier")),
    responses((status = 200, description = "Notes", body = NotesResponse)),
    tags = ["notes"],
    operation_id = "notesForStartup"
)]
#[get("/by-startup/{startup_id}")]
pub async fn notes_for_startup(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<NotesResponse>> {
    let notes = state
        .analyst
        .notes_for_startup(&path.into_inner(), STARTUP_NOTES_LIMIT)
        .await?;
    Ok(web::Json(NotesResponse { notes }))
}

/// Analyst note by identifier.
#[utoipa::path(
    get,
    path = "/v1/notes/{id}",
    params(("id" = String, Path, description = "Note identifier")),
    responses(
        (status = 200, description = "Note", body = serde_json::Value),
        (status = 404, description = "note_not_found", body = Error)
    ),
    tags = ["notes"],
    operation_id = "getNote"
)]
#[get("/{id}")]
pub async fn get_note(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    state.analyst.get_note(&path.into_inner()).await.map(web::Json)
}

/// Register every `/v1/notes` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notes")
            .service(notes_for_startup)
            .service(get_note),
    );
}
