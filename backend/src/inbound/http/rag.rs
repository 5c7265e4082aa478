//! Deal note search for investors under `/v1/rag`.

use actix_web::{get, post, web};

use crate::domain::{Error, RagHit, RagSearchForm, RagSearchResult};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Substring search over recent deal notes.
#[utoipa::path(
    post,
    path = "/v1/rag/search",
    request_body = RagSearchForm,
    responses(
        (status = 200, description = "Matches", body = RagSearchResult),
        (status = 400, description = "query_required", body = Error),
        (status = 403, description = "Investor role required", body = Error)
    ),
    tags = ["rag"],
    operation_id = "searchDealNotes"
)]
#[post("/search")]
pub async fn search(
    state: web::Data<HttpState>,
    payload: web::Json<RagSearchForm>,
) -> ApiResult<web::Json<RagSearchResult>> {
    state.rag.search(payload.into_inner()).await.map(web::Json)
}

/// Deal note with its company summary.
#[utoipa::path(
    get,
    path = "/v1/rag/deal-notes/{id}",
    params(("id" = String, Path, description = "Deal note identifier")),
    responses(
        (status = 200, description = "Deal note and company", body = RagHit),
        (status = 404, description = "deal_note_not_found", body = Error)
    ),
    tags = ["rag"],
    operation_id = "getSearchableDealNote"
)]
#[get("/deal-notes/{id}")]
pub async fn get_deal_note(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RagHit>> {
    state
        .rag
        .get_with_company(&path.into_inner())
        .await
        .map(web::Json)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{Collection, DocumentStore};
    use crate::inbound::http::test_utils::{into_status_and_json, test_app};
    use crate::test_support::{TestPorts, object};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    async fn call(ports: &TestPorts, request: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            test_app(ports.state()).service(
                web::scope("/v1/rag")
                    .service(search)
                    .service(get_deal_note),
            ),
        )
        .await;
        into_status_and_json(test::call_service(&app, request.to_request()).await).await
    }

    async fn seed(ports: &TestPorts) {
        ports
            .store
            .set(
                Collection::Users,
                "s1",
                object(json!({"role": "startup", "name": "Acme", "category": "fintech", "score": 8.2})),
            )
            .await
            .expect("user");
        ports
            .store
            .set(
                Collection::DealNotes,
                "d1",
                object(json!({
                    "startupId": "s1",
                    "dealNote": {"company": "Acme Payments", "summary": "Cross-border PAYMENTS rails"},
                    "createdAt": "2024-05-01T08:00:00.000Z",
                })),
            )
            .await
            .expect("note");
    }

    #[actix_web::test]
    async fn search_matches_case_insensitively() {
        let ports = TestPorts::new();
        seed(&ports).await;
        let (status, body) = call(
            &ports,
            test::TestRequest::post()
                .uri("/v1/rag/search")
                .set_json(json!({"query": "payments"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["query"], "payments");
        assert_eq!(body["results"][0]["dealNote"]["id"], "d1");
        assert_eq!(body["results"][0]["company"]["name"], "Acme");
    }

    #[actix_web::test]
    async fn search_without_matches_is_empty() {
        let ports = TestPorts::new();
        seed(&ports).await;
        let (status, body) = call(
            &ports,
            test::TestRequest::post()
                .uri("/v1/rag/search")
                .set_json(json!({"query": "biotech"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!([]));
        assert_eq!(body["total"], 0);
    }

    #[actix_web::test]
    async fn search_requires_a_query() {
        let ports = TestPorts::new();
        let (status, body) = call(
            &ports,
            test::TestRequest::post().uri("/v1/rag/search").set_json(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "query_required");
    }

    #[actix_web::test]
    async fn deal_note_lookup_includes_the_company() {
        let ports = TestPorts::new();
        seed(&ports).await;
        let (status, body) = call(&ports, test::TestRequest::get().uri("/v1/rag/deal-notes/d1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["company"]["id"], "s1");

        let (status, _) = call(&ports, test::TestRequest::get().uri("/v1/rag/deal-notes/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
