//! Pitch deck file access under `/v1/files`.

use actix_web::{get, web};

use crate::domain::ports::Stored;
use crate::domain::{Error, PitchDeck, PitchDeckDownload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Deck metadata with a one hour signed GET URL.
#[utoipa::path(
    get,
    path = "/v1/files/pitch-deck/{id}/download-url",
    params(("id" = String, Path, description = "Pitch deck identifier")),
    responses(
        (status = 200, description = "Deck metadata plus downloadUrl and expiresAt", body = serde_json::Value),
        (status = 400, description = "invalid_gcs_uri", body = Error),
        (status = 404, description = "pitch_deck_not_found", body = Error)
    ),
    tags = ["files"],
    operation_id = "pitchDeckDownloadUrl"
)]
#[get("/pitch-deck/{id}/download-url")]
pub async fn download_url(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PitchDeckDownload>> {
    state
        .uploads
        .download_url(&path.into_inner())
        .await
        .map(web::Json)
}

/// Deck metadata without a link.
#[utoipa::path(
    get,
    path = "/v1/files/pitch-deck/{id}/info",
    params(("id" = String, Path, description = "Pitch deck identifier")),
    responses(
        (status = 200, description = "Deck metadata", body = serde_json::Value),
        (status = 404, description = "pitch_deck_not_found", body = Error)
    ),
    tags = ["files"],
    operation_id = "pitchDeckInfo"
)]
#[get("/pitch-deck/{id}/info")]
pub async fn pitch_deck_info(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Stored<PitchDeck>>> {
    state
        .pitch_decks
        .get(&path.into_inner())
        .await
        .map(web::Json)
}

/// Register every `/v1/files` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/files")
            .service(download_url)
            .service(pitch_deck_info),
    );
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::NewPitchDeck;
    use crate::inbound::http::test_utils::{into_status_and_json, test_app};
    use crate::test_support::TestPorts;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::Value;

    async fn call(ports: &TestPorts, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            test_app(ports.state()).service(web::scope("/v1").configure(configure)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        into_status_and_json(res).await
    }

    async fn seed_deck(ports: &TestPorts, gcs_uri: &str) -> String {
        let deck = NewPitchDeck {
            startup_id: "s1".to_owned(),
            file_name: "deck.pdf".to_owned(),
            gcs_uri: gcs_uri.to_owned(),
            content_type: "application/pdf".to_owned(),
            size_bytes: 2048,
        };
        ports
            .state()
            .pitch_decks
            .create(deck)
            .await
            .expect("create deck")
            .id
    }

    #[actix_web::test]
    async fn download_url_signs_a_get_for_the_deck() {
        let ports = TestPorts::new();
        let id = seed_deck(&ports, "gs://decks/s1/deck.pdf").await;
        let (status, body) = call(&ports, &format!("/v1/files/pitch-deck/{id}/download-url")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fileName"], "deck.pdf");
        let url = body["downloadUrl"].as_str().expect("url");
        assert!(url.contains("/decks/s1/deck.pdf"));
        assert!(url.contains("X-Goog-Expires=3600"));
        assert!(body["expiresAt"].is_string());
    }

    #[actix_web::test]
    async fn non_gcs_locations_are_rejected() {
        let ports = TestPorts::new();
        let id = seed_deck(&ports, "https://example.com/deck.pdf").await;
        let (status, body) = call(&ports, &format!("/v1/files/pitch-deck/{id}/download-url")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_gcs_uri");
    }

    #[rstest]
    #[case("/v1/files/pitch-deck/missing/download-url")]
    #[case("/v1/files/pitch-deck/missing/info")]
    #[actix_web::test]
    async fn unknown_decks_are_404(#[case] uri: &str) {
        let ports = TestPorts::new();
        let (status, body) = call(&ports, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "pitch_deck_not_found");
    }

    #[actix_web::test]
    async fn info_returns_metadata() {
        let ports = TestPorts::new();
        let id = seed_deck(&ports, "gs://decks/s1/deck.pdf").await;
        let (status, body) = call(&ports, &format!("/v1/files/pitch-deck/{id}/info")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sizeBytes"], 2048);
        assert!(body.get("downloadUrl").is_none());
    }
}
