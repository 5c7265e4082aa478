//! Test helpers for inbound HTTP components.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error, test, web};
use serde_json::Value;

use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::state::HttpState;

/// App carrying `state` and the JSON error handler, ready for handler
/// registration under `/v1`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
}

/// Status and decoded JSON body; `Value::Null` for empty bodies.
pub async fn into_status_and_json<B: MessageBody>(
    response: ServiceResponse<B>,
) -> (actix_web::http::StatusCode, Value) {
    let status = response.status();
    let body = test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}
