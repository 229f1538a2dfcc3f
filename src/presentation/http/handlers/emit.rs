//! Internal emit hook
//!
//! Lets trusted backend code push an event to a set of users' live
//! connections. Offline users are skipped; nothing is queued. Event names
//! the gateway emits itself are refused so a caller cannot forge chat
//! traffic or presence.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::domain::UserId;
use crate::presentation::websocket::messages::events;
use crate::presentation::websocket::OutboundFrame;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct EmitRequest {
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub event: String,

    #[validate(length(min = 1, message = "must name at least one user"))]
    pub users: Vec<UserId>,

    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct EmitResponse {
    /// Number of live connections the frame was handed to
    pub delivered: usize,
}

pub async fn emit(
    State(state): State<AppState>,
    Json(body): Json<EmitRequest>,
) -> Result<Json<EmitResponse>, AppError> {
    body.validate().map_err(validation_error)?;
    if events::is_reserved(&body.event) {
        return Err(AppError::BadRequest(format!(
            "event: '{}' is reserved for the gateway",
            body.event
        )));
    }

    let EmitRequest { event, users, data } = body;
    let delivered = state.gateway.emit(&users, OutboundFrame::new(event.clone(), data));

    tracing::debug!(
        event = %event,
        recipients = users.len(),
        delivered,
        "Internal emit"
    );

    Ok(Json(EmitResponse { delivered }))
}
