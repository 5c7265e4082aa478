//! User directory handlers.
//!
//! ```text
//! POST /v1/users
//! GET  /v1/users?role=investor
//! GET  /v1/users/{id}
//! PUT  /v1/users/{id}
//! ```

use actix_web::{get, post, put, web};
use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::IntoParams;

use crate::domain::{Error, Role, UserForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query accepted by `GET /v1/users`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UsersQuery {
    /// `startup` or `investor`.
    pub role: Option<String>,
}

/// Create an account with a hashed password.
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = UserForm,
    responses(
        (status = 200, description = "Created user", body = serde_json::Value),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserForm>,
) -> ApiResult<web::Json<Value>> {
    state.users.register(payload.into_inner()).await.map(web::Json)
}

/// List accounts without passwords.
#[utoipa::path(
    get,
    path = "/v1/users",
    params(UsersQuery),
    responses(
        (status = 200, description = "Users", body = Vec<serde_json::Value>),
        (status = 400, description = "Unknown role", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("")]
pub async fn list_users(
    state: web::Data<HttpState>,
    query: web::Query<UsersQuery>,
) -> ApiResult<web::Json<Vec<Value>>> {
    let role = query
        .into_inner()
        .role
        .filter(|role| !role.is_empty())
        .map(|role| role.parse::<Role>())
        .transpose()
        .map_err(|_| Error::invalid_request("invalid_role"))?;
    state.users.list(role).await.map(web::Json)
}

/// Fetch one account.
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = serde_json::Value),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    state.users.get(&path.into_inner()).await.map(web::Json)
}

/// Patch profile fields. `id`, `password` and `createdAt` are ignored.
#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Updated user", body = serde_json::Value),
        (status = 400, description = "Nothing to update", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<web::Json<Value>> {
    state
        .users
        .update(&path.into_inner(), payload.into_inner())
        .await
        .map(web::Json)
}

/// Register every `/v1/users` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(create_user)
            .service(list_users)
            .service(get_user)
            .service(update_user),
    );
}
