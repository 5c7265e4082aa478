//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`; this
//! module assembles the served route tree over in-process adapters.

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::Value;

use dealroom::Trace;
use dealroom::inbound::http::configure_routes;
use dealroom::inbound::http::error::json_error_handler;
use dealroom::inbound::http::health::HealthState;
use dealroom::middleware::Authenticate;
use dealroom::test_support::TestPorts;

/// Initialise the full application over `ports`.
pub async fn init_app(
    ports: &TestPorts,
    authenticate: Authenticate,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let health = web::Data::new(HealthState::with_clock(ports.clock.clone()));
    health.mark_ready();
    test::init_service(
        App::new()
            .app_data(health)
            .app_data(web::Data::new(ports.state()))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .wrap(Trace)
            .configure(|cfg| configure_routes(cfg, authenticate)),
    )
    .await
}

/// Status and decoded JSON body; `Value::Null` for empty bodies.
pub async fn status_and_json<B: MessageBody>(response: ServiceResponse<B>) -> (StatusCode, Value) {
    let status = response.status();
    let body = test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}
