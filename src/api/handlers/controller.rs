use axum::{extract::State, Json};

use super::{api_error, ApiError};
use crate::api::{state::AppState, types::*};

/// POST /api/commands
pub async fn submit_command(
    State(state): State<AppState>,
    body: Option<Json<CommandRequest>>,
) -> std::result::Result<Json<CommandResponse>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let current_state = state
        .relay
        .submit_command(req.controllerkey.as_deref(), req.to_command())
        .await
        .map_err(api_error)?;

    Ok(Json(CommandResponse {
        status: "success",
        current_state,
    }))
}

/// POST /api/reset
pub async fn reset_relay(
    State(state): State<AppState>,
    body: Option<Json<ResetRequest>>,
) -> std::result::Result<Json<MessageResponse>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    state
        .relay
        .reset(req.controllerkey.as_deref())
        .await
        .map_err(api_error)?;

    Ok(Json(MessageResponse {
        status: "success",
        message: "Complete reset performed",
    }))
}
