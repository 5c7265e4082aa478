//! Pub/Sub push endpoint.
//!
//! Mounted outside the authenticated scope; push deliveries carry no user
//! token.

use actix_web::{HttpResponse, post, web};

use crate::domain::{Error, PushEnvelope};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Handle a push delivery. Unknown event types are acknowledged and dropped.
#[utoipa::path(
    post,
    path = "/v1/events/pubsub",
    request_body = PushEnvelope,
    responses(
        (status = 204, description = "Delivery acknowledged"),
        (status = 400, description = "bad_request", body = Error)
    ),
    tags = ["events"],
    operation_id = "pubsubPush",
    security([])
)]
#[post("/pubsub")]
pub async fn pubsub_push(
    state: web::Data<HttpState>,
    payload: web::Json<PushEnvelope>,
) -> ApiResult<HttpResponse> {
    state.events.handle_push(payload.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
