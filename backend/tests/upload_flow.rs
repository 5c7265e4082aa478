//! End-to-end founder flow through the served route tree.
//!
//! Requests authenticate with development headers and run against the
//! in-memory store, recording publisher, and synthetic agents.

mod support;

use std::sync::Arc;

use actix_web::test;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

use dealroom::middleware::Authenticate;
use dealroom::middleware::auth::DEBUG_ROLE_HEADER;
use dealroom::outbound::identity::{JwtIdentityConfig, JwtIdentityVerifier};
use dealroom::test_support::TestPorts;
use support::{init_app, status_and_json};

fn dev_headers_only() -> Authenticate {
    let verifier = JwtIdentityVerifier::new(JwtIdentityConfig::default()).expect("verifier");
    Authenticate::new(Arc::new(verifier)).with_dev_headers(true)
}

fn as_founder(request: test::TestRequest) -> test::TestRequest {
    request.insert_header((DEBUG_ROLE_HEADER, "startup"))
}

#[actix_web::test]
async fn pitch_to_deal_note() {
    let ports = TestPorts::new();
    let app = init_app(&ports, dev_headers_only()).await;

    let res = test::call_service(
        &app,
        as_founder(test::TestRequest::post().uri("/v1/startups/upload-pitch"))
            .set_json(json!({
                "startupId": "acme",
                "fileName": "acme.pdf",
                "gcsUri": "gs://startup-analyst-uploads/acme.pdf",
            }))
            .to_request(),
    )
    .await;
    let (status, uploaded) = status_and_json(res).await;
    assert!(status.is_success());
    let questions = uploaded["questionnaire"]["questions"]
        .as_array()
        .expect("questions");
    assert_eq!(questions.len(), 7);

    let answers: serde_json::Map<String, Value> = questions
        .iter()
        .filter_map(|q| q["id"].as_str())
        .map(|id| (id.to_owned(), json!("Recurring revenue from 40 farms")))
        .collect();
    let res = test::call_service(
        &app,
        as_founder(test::TestRequest::post().uri("/v1/startups/acme/save-answers"))
            .set_json(json!({ "answers": answers }))
            .to_request(),
    )
    .await;
    let (status, saved) = status_and_json(res).await;
    assert!(status.is_success());
    assert_eq!(saved["status"], "answers_saved");

    let res = test::call_service(
        &app,
        as_founder(test::TestRequest::post().uri("/v1/startups/acme/generate-deal-note"))
            .to_request(),
    )
    .await;
    let (status, generated) = status_and_json(res).await;
    assert!(status.is_success());
    assert_eq!(generated["status"], "completed_mock");

    let res = test::call_service(
        &app,
        as_founder(test::TestRequest::get().uri("/v1/deal-notes/startup/acme")).to_request(),
    )
    .await;
    let (status, note) = status_and_json(res).await;
    assert!(status.is_success());
    assert_eq!(note["id"], generated["dealNoteId"]);
}

#[actix_web::test]
async fn two_phase_upload_feeds_the_ingestion_push() {
    let ports = TestPorts::new();
    let app = init_app(&ports, dev_headers_only()).await;

    let res = test::call_service(
        &app,
        as_founder(test::TestRequest::post().uri("/v1/uploads/pitch:url"))
            .set_json(json!({
                "startupId": "acme",
                "fileName": "acme.pdf",
                "contentType": "application/pdf",
                "sizeBytes": 2048,
            }))
            .to_request(),
    )
    .await;
    let (status, issued) = status_and_json(res).await;
    assert!(status.is_success());
    let upload_id = issued["uploadId"].as_str().expect("uploadId");

    let res = test::call_service(
        &app,
        as_founder(test::TestRequest::post().uri(&format!("/v1/uploads/{upload_id}/confirm")))
            .to_request(),
    )
    .await;
    let (status, confirmed) = status_and_json(res).await;
    assert!(status.is_success());

    let published = ports.publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(confirmed["jobId"], published[0].message_id.as_str());

    // Pub/Sub pushes carry no bearer token.
    let push = json!({"message": {"data": STANDARD.encode(published[0].payload.to_string())}});
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/v1/events/pubsub")
            .set_json(push)
            .to_request(),
    )
    .await;
    assert_eq!(res.status().as_u16(), 204);

    let res = test::call_service(
        &app,
        as_founder(test::TestRequest::get().uri("/v1/notes/by-startup/acme")).to_request(),
    )
    .await;
    let (_, notes) = status_and_json(res).await;
    let notes = notes["notes"].as_array().expect("notes");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["source"], "ingestion_auto");
}

#[actix_web::test]
async fn health_is_public_and_api_is_not() {
    let ports = TestPorts::new();
    let app = init_app(&ports, dev_headers_only()).await;

    for uri in ["/health", "/v1/health", "/health/ready", "/health/live"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert!(res.status().is_success(), "{uri}");
    }

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/v1/deal-notes").to_request(),
    )
    .await;
    let (status, body) = status_and_json(res).await;
    assert_eq!(status.as_u16(), 401);
    assert_eq!(body["error"], "unauthorized");
}

#[actix_web::test]
async fn trace_id_header_accompanies_responses() {
    let ports = TestPorts::new();
    let app = init_app(&ports, dev_headers_only()).await;

    let res = test::call_service(
        &app,
        as_founder(test::TestRequest::get().uri("/v1/deal-notes/missing")).to_request(),
    )
    .await;
    assert!(res.headers().contains_key("trace-id"));
    let (status, body) = status_and_json(res).await;
    assert_eq!(status.as_u16(), 404);
    assert_eq!(body, json!({"error": "deal_note_not_found"}));
}
