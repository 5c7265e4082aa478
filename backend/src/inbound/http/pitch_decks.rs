//! Pitch deck metadata under `/v1/pitch-decks`.

use actix_web::{get, post, web};

use crate::domain::ports::Stored;
use crate::domain::{Error, PitchDeck, PitchDeckForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Register a deck that is already in storage.
#[utoipa::path(
    post,
    path = "/v1/pitch-decks",
    request_body = PitchDeckForm,
    responses(
        (status = 200, description = "Deck stored", body = serde_json::Value),
        (status = 400, description = "startup_id_filename_and_gcs_uri_required", body = Error)
    ),
    tags = ["pitch-decks"],
    operation_id = "createPitchDeck"
)]
#[post("")]
pub async fn create_pitch_deck(
    state: web::Data<HttpState>,
    payload: web::Json<PitchDeckForm>,
) -> ApiResult<web::Json<Stored<PitchDeck>>> {
    let deck = payload
        .into_inner()
        .validate("startup_id_filename_and_gcs_uri_required")?;
    state.pitch_decks.create(deck).await.map(web::Json)
}

/// Newest deck of a startup.
#[utoipa::path(
    get,
    path = "/v1/pitch-decks/startup/{startupId}",
    params(("startupId" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Latest deck", body = serde_json::Value),
        (status = 404, description = "pitch_deck_not_found", body = Error)
    ),
    tags = ["pitch-decks"],
    operation_id = "latestPitchDeckForStartup"
)]
#[get("/startup/{startup_id}")]
pub async fn pitch_deck_for_startup(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Stored<PitchDeck>>> {
    state
        .pitch_decks
        .require_latest(&path.into_inner())
        .await
        .map(web::Json)
}

/// Deck by identifier.
#[utoipa::path(
    get,
    path = "/v1/pitch-decks/{id}",
    params(("id" = String, Path, description = "Pitch deck identifier")),
    responses(
        (status = 200, description = "Deck", body = serde_json::Value),
        (status = 404, description = "pitch_deck_not_found", body = Error)
    ),
    tags = ["pitch-decks"],
    operation_id = "getPitchDeck"
)]
#[get("/{id}")]
pub async fn get_pitch_deck(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Stored<PitchDeck>>> {
    state
        .pitch_decks
        .get(&path.into_inner())
        .await
        .map(web::Json)
}

/// Register every `/v1/pitch-decks` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pitch-decks")
            .service(create_pitch_deck)
            .service(pitch_deck_for_startup)
            .service(get_pitch_deck),
    );
}
