//! Registration and login handlers.
//!
//! ```text
//! POST /v1/auth/register
//! POST /v1/auth/login {"email":"ada@example.com","password":"..."}
//! GET  /v1/auth/me
//! ```
//!
//! Mounted outside the authenticated scope.

use actix_web::{get, post, web};
use serde_json::Value;

use crate::domain::{Error, LoginForm, UserForm, current_user_stub};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Register a founder or investor account.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = UserForm,
    responses(
        (status = 200, description = "Stored user without password", body = serde_json::Value),
        (status = 400, description = "Missing field, bad role or duplicate email", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<UserForm>,
) -> ApiResult<web::Json<Value>> {
    state.users.register(payload.into_inner()).await.map(web::Json)
}

/// Check email and password.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Stored user without password", body = serde_json::Value),
        (status = 400, description = "Email or password missing", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginForm>,
) -> ApiResult<web::Json<Value>> {
    state.users.login(payload.into_inner()).await.map(web::Json)
}

/// Placeholder identity of the current caller.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses((status = 200, description = "Stub user", body = serde_json::Value)),
    tags = ["auth"],
    operation_id = "currentUser",
    security([])
)]
#[get("/me")]
pub async fn me() -> web::Json<Value> {
    web::Json(current_user_stub())
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

    fn registration(email: &str, username: &str) -> Value {
        json!({
            "email": email,
            "username": username,
            "password": "s3cret",
            "firstName": "Grace",
            "lastName": "Hopper",
            "companyName": "Compilers Inc",
            "phoneNumber": "+15550100",
            "role": "startup",
        })
    }

    async fn post(
        ports: &TestPorts,
        uri: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        let app = test::init_service(
            test_app(ports.state())
                .service(web::scope("/v1/auth").service(register).service(login).service(me)),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::post().uri(uri).set_json(body).to_request(),
        )
        .await;
        into_status_and_json(res).await
    }

    #[actix_web::test]
    async fn register_then_login_succeeds_without_leaking_the_password() {
        let ports = TestPorts::new();
        let (status, user) = post(&ports, "/v1/auth/register", registration("grace@example.com", "grace")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(user.get("password").is_none());
        assert_eq!(user["name"], "Compilers Inc");

        let (status, logged_in) = post(
            &ports,
            "/v1/auth/login",
            json!({"email": "grace@example.com", "password": "s3cret"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logged_in["id"], user["id"]);
        assert!(logged_in.get("password").is_none());
    }

    #[actix_web::test]
    async fn duplicate_email_with_a_new_username_is_rejected() {
        let ports = TestPorts::new();
        post(&ports, "/v1/auth/register", registration("grace@example.com", "grace")).await;
        let (status, body) =
            post(&ports, "/v1/auth/register", registration("grace@example.com", "hopper")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "email_already_exists"}));
    }

    #[actix_web::test]
    async fn login_failures_use_stable_codes() {
        let ports = TestPorts::new();
        let (status, body) = post(&ports, "/v1/auth/login", json!({"email": "x@example.com"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "email_password_required");

        let (status, body) = post(
            &ports,
            "/v1/auth/login",
            json!({"email": "nobody@example.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_credentials");
    }

    #[actix_web::test]
    async fn me_returns_the_stub() {
        let app = test::init_service(test_app(TestPorts::new().state()).service(web::scope("/v1/auth").service(me))).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/v1/auth/me").to_request()).await;
        let (status, body) = into_status_and_json(res).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "current_user_id");
    }
}
