//! Health endpoints: the status document plus liveness and readiness probes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use mockable::{Clock, DefaultClock};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::now_timestamp;

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    clock: Arc<dyn Clock>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl HealthState {
    /// Not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Not ready but live, stamping status documents from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            clock,
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness probes so orchestrators stop routing during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: &'static str,
    #[schema(example = "2024-05-01T08:00:00.000Z")]
    pub timestamp: String,
}

/// Service status. Also mounted at `/v1/health`.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Service is up", body = HealthStatus))
)]
pub async fn health(state: web::Data<HealthState>) -> web::Json<HealthStatus> {
    web::Json(HealthStatus {
        status: "ok",
        timestamp: now_timestamp(state.clock.as_ref()),
    })
}

/// Readiness probe: 200 once dependencies are initialised, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe: 200 while alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    use crate::test_support::SteppingClock;

    #[actix_web::test]
    async fn probes_follow_the_state() {
        let state = web::Data::new(HealthState::new());
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(ready)
                .service(live),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request()).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            res.headers().get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
            Some("no-store")
        );

        state.mark_ready();
        let res = test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);

        state.mark_unhealthy();
        let res = test::call_service(&app, test::TestRequest::get().uri("/health/live").to_request()).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn status_reports_ok_with_the_clock_time() {
        let state = web::Data::new(HealthState::with_clock(Arc::new(SteppingClock::default())));
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/health", web::get().to(health)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["timestamp"], "2024-05-01T08:00:00.000Z");
    }
}
