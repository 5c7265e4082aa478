//! Call scheduling handlers under `/v1/scheduler`.

use actix_web::{get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, ScheduleCallForm, ScheduledCall};
use crate::inbound::http::ApiResult;
use crate::inbound::http::startups::CallsResponse;
use crate::inbound::http::state::HttpState;

/// Offered slots.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsResponse {
    pub available_slots: Vec<String>,
    pub timezone: &'static str,
}

/// Tomorrow's fixed call slots.
#[utoipa::path(
    get,
    path = "/v1/scheduler/available-slots",
    responses((status = 200, description = "Slots", body = AvailableSlotsResponse)),
    tags = ["scheduler"],
    operation_id = "availableSlots"
)]
#[get("/available-slots")]
pub async fn available_slots(state: web::Data<HttpState>) -> web::Json<AvailableSlotsResponse> {
    web::Json(AvailableSlotsResponse {
        available_slots: state.scheduler.available_slots(),
        timezone: "UTC",
    })
}

/// Book a call.
#[utoipa::path(
    post,
    path = "/v1/scheduler/schedule-call",
    request_body = ScheduleCallForm,
    responses(
        (status = 200, description = "Call booked", body = ScheduledCall),
        (status = 400, description = "startupId_questionnaireId_scheduledTime_required", body = Error)
    ),
    tags = ["scheduler"],
    operation_id = "scheduleCall"
)]
#[post("/schedule-call")]
pub async fn schedule_call(
    state: web::Data<HttpState>,
    payload: web::Json<ScheduleCallForm>,
) -> ApiResult<web::Json<ScheduledCall>> {
    state
        .scheduler
        .schedule(
            payload.into_inner(),
            "startupId_questionnaireId_scheduledTime_required",
        )
        .await
        .map(web::Json)
}

/// Calls booked by a startup.
#[utoipa::path(
    get,
    path = "/v1/scheduler/calls/{startupId}",
    params(("startupId" = String, Path, description = "Startup identifier")),
    responses((status = 200, description = "Calls", body = CallsResponse)),
    tags = ["scheduler"],
    operation_id = "callsForStartup"
)]
#[get("/calls/{startup_id}")]
pub async fn calls_for_startup(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CallsResponse>> {
    let calls = state.scheduler.calls_for_startup(&path.into_inner()).await?;
    Ok(web::Json(CallsResponse { calls }))
}

/// Register every `/v1/scheduler` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/scheduler")
            .service(available_slots)
            .service(schedule_call)
            .service(calls_for_startup),
    );
}
