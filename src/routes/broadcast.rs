use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::gateway::events::{Event, MAX_EVENT_BYTES};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub user_ids: Vec<String>,
    pub event: Event,
}

/// `POST /api/v1/broadcast` — the ingress domain services use to reach live
/// connections. Targets with no connections are skipped, so a 202 says
/// "accepted for fan-out", nothing about delivery.
pub async fn broadcast(
    State(state): State<AppState>,
    Json(req): Json<BroadcastRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.event.event_type.is_empty() {
        return Err(AppError::BadRequest("event type must not be empty".to_string()));
    }
    if !req.event.data.is_object() {
        return Err(AppError::BadRequest("event data must be an object".to_string()));
    }
    let payload_len = req.event.to_payload().len();
    if payload_len > MAX_EVENT_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "serialized event is {payload_len} bytes, limit is {MAX_EVENT_BYTES}"
        )));
    }

    state.broadcaster.broadcast_to_users(&req.user_ids, &req.event);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "data": {
                "targets": req.user_ids.len()
            }
        })),
    ))
}
