//! Final note handlers under `/v1/final-notes`.

use actix_web::{get, post, web};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{Error, FinalNoteForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Identifier of a generated final note.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalNoteCreatedResponse {
    pub final_note_id: String,
    pub status: &'static str,
}

/// Write the v2 final note for a startup.
#[utoipa::path(
    post,
    path = "/v1/final-notes/generate",
    request_body = FinalNoteForm,
    responses(
        (status = 200, description = "Final note stored", body = FinalNoteCreatedResponse),
        (status = 400, description = "startupId_required", body = Error)
    ),
    tags = ["final-notes"],
    operation_id = "generateFinalNote"
)]
#[post("/generate")]
pub async fn generate_final_note(
    state: web::Data<HttpState>,
    payload: web::Json<FinalNoteForm>,
) -> ApiResult<web::Json<FinalNoteCreatedResponse>> {
    let final_note_id = state.final_notes.generate(payload.into_inner()).await?;
    Ok(web::Json(FinalNoteCreatedResponse {
        final_note_id,
        status: "ready",
    }))
}

/// Highest-version final note of a startup.
#[utoipa::path(
    get,
    path = "/v1/final-notes/by-startup/{startupId}",
    params(("startupId" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Final note", body = serde_json::Value),
        (status = 404, description = "final_note_not_found", body = Error)
    ),
    tags = ["final-notes"],
    operation_id = "finalNoteForStartup"
)]
#[get("/by-startup/{startup_id}")]
pub async fn final_note_for_startup(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    state
        .final_notes
        .latest_for_startup(&path.into_inner())
        .await
        .map(web::Json)
}

/// Final note by identifier.
#[utoipa::path(
    get,
    path = "/v1/final-notes/{id}",
    params(("id" = String, Path, description = "Final note identifier")),
    responses(
        (status = 200, description = "Final note", body = serde_json::Value),
        (status = 404, description = "final_note_not_found", body = Error)
    ),
    tags = ["final-notes"],
    operation_id = "getFinalNote"
)]
#[get("/{id}")]
pub async fn get_final_note(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    state.final_notes.get(&path.into_inner()).await.map(web::Json)
}

/// Register every `/v1/final-notes` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/final-notes")
            .service(generate_final_note)
            .service(final_note_for_startup)
            .service(get_final_note),
    );
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::inbound::http::test_utils::{into_status_and_json, test_app};
    use crate::test_support::TestPorts;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    async fn call(ports: &TestPorts, request: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            test_app(ports.state()).service(web::scope("/v1").configure(configure)),
        )
        .await;
        into_status_and_json(test::call_service(&app, request.to_request()).await).await
    }

    #[actix_web::test]
    async fn generated_note_carries_the_stub_scorecard() {
        let ports = TestPorts::new();
        let (status, created) = call(
            &ports,
            test::TestRequest::post()
                .uri("/v1/final-notes/generate")
                .set_json(json!({"startupId": "s1", "noteId": "n1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["finalNoteId"].as_str().expect("id");

        let (_, note) = call(&ports, test::TestRequest::get().uri(&format!("/v1/final-notes/{id}"))).await;
        assert_eq!(note["version"], 2);
        assert_eq!(note["scorecard"]["overall"], 7.6);

        let (status, latest) =
            call(&ports, test::TestRequest::get().uri("/v1/final-notes/by-startup/s1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(latest["id"], id);
    }

    #[actix_web::test]
    async fn generation_requires_a_startup() {
        let ports = TestPorts::new();
        let (status, body) = call(
            &ports,
            test::TestRequest::post()
                .uri("/v1/final-notes/generate")
                .set_json(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "startupId_required");
    }

    #[actix_web::test]
    async fn missing_final_notes_are_404() {
        let ports = TestPorts::new();
        let (status, body) =
            call(&ports, test::TestRequest::get().uri("/v1/final-notes/by-startup/s9")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "final_note_not_found");
    }
}
