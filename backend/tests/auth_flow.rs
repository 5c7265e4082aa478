//! Registration, login, and bearer-token gating through the served route tree.

mod support;

use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::test;
use jsonwebtoken::{EncodingKey, Header, encode};
use rstest::rstest;
use serde_json::json;
use zeroize::Zeroizing;

use dealroom::middleware::Authenticate;
use dealroom::outbound::identity::{JwtIdentityConfig, JwtIdentityVerifier};
use dealroom::test_support::TestPorts;
use support::{init_app, status_and_json};

const PROJECT: &str = "dealroom-it";
const SECRET: &str = "integration-signing-secret";

fn token_authentication() -> Authenticate {
    let verifier = JwtIdentityVerifier::new(JwtIdentityConfig {
        project_id: PROJECT.to_owned(),
        public_key_pem: None,
        shared_secret: Some(Zeroizing::new(SECRET.to_owned())),
    })
    .expect("verifier");
    Authenticate::new(Arc::new(verifier))
}

fn bearer(role: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": format!("{role}-uid"),
        "role": role,
        "iss": format!("https://securetoken.google.com/{PROJECT}"),
        "aud": PROJECT,
        "iat": now,
        "exp": now + 600,
    });
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("token");
    format!("Bearer {token}")
}

#[actix_web::test]
async fn registered_users_can_log_in_without_a_token() {
    let ports = TestPorts::new();
    let app = init_app(&ports, token_authentication()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/v1/auth/register")
            .set_json(json!({
                "email": "ada@example.com",
                "username": "ada",
                "password": "analytical",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "companyName": "Engines Ltd",
                "phoneNumber": "+15550101",
                "role": "startup",
            }))
            .to_request(),
    )
    .await;
    let (status, user) = status_and_json(res).await;
    assert!(status.is_success());
    assert!(user.get("password").is_none());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/v1/auth/login")
            .set_json(json!({"email": "ada@example.com", "password": "wrong"}))
            .to_request(),
    )
    .await;
    let (status, body) = status_and_json(res).await;
    assert_eq!(status.as_u16(), 401);
    assert_eq!(body["error"], "invalid_credentials");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/v1/auth/login")
            .set_json(json!({"email": "ada@example.com", "password": "analytical"}))
            .to_request(),
    )
    .await;
    let (status, logged_in) = status_and_json(res).await;
    assert!(status.is_success());
    assert_eq!(logged_in["id"], user["id"]);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/companies")
            .insert_header((AUTHORIZATION, bearer("investor")))
            .to_request(),
    )
    .await;
    let (status, companies) = status_and_json(res).await;
    assert!(status.is_success());
    assert_eq!(companies["companies"][0]["name"], "Engines Ltd");
}

#[rstest]
#[case::startup_on_companies("/v1/companies", Some("startup"), 403, "forbidden")]
#[case::startup_on_rag_note("/v1/rag/deal-notes/d1", Some("startup"), 403, "forbidden")]
#[case::anonymous("/v1/users", None, 401, "unauthorized")]
#[actix_web::test]
async fn protected_routes_check_identity_and_role(
    #[case] uri: &str,
    #[case] role: Option<&str>,
    #[case] status: u16,
    #[case] code: &str,
) {
    let ports = TestPorts::new();
    let app = init_app(&ports, token_authentication()).await;

    let mut request = test::TestRequest::get().uri(uri);
    if let Some(role) = role {
        request = request.insert_header((AUTHORIZATION, bearer(role)));
    }
    let (actual, body) = status_and_json(test::call_service(&app, request.to_request()).await).await;
    assert_eq!(actual.as_u16(), status);
    assert_eq!(body["error"], code);
}

#[actix_web::test]
async fn forged_tokens_are_rejected() {
    let ports = TestPorts::new();
    let app = init_app(&ports, token_authentication()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/deal-notes")
            .insert_header((AUTHORIZATION, "Bearer not-a-jwt"))
            .to_request(),
    )
    .await;
    let (status, body) = status_and_json(res).await;
    assert_eq!(status.as_u16(), 401);
    assert_eq!(body["error"], "invalid_token");
}

#[actix_web::test]
async fn startup_tokens_reach_founder_routes() {
    let ports = TestPorts::new();
    let app = init_app(&ports, token_authentication()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/scheduler/available-slots")
            .insert_header((AUTHORIZATION, bearer("startup")))
            .to_request(),
    )
    .await;
    let (status, body) = status_and_json(res).await;
    assert!(status.is_success());
    assert_eq!(body["availableSlots"].as_array().map(Vec::len), Some(6));
    assert_eq!(body["timezone"], "UTC");
}
