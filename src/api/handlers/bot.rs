use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Query, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::net::SocketAddr;

use super::{api_error, ApiError};
use crate::api::{state::AppState, types::*};
use crate::domain::BotIdentity;
use crate::error::RelayError;
use crate::relay::{QuickStatus, Role, SyncSnapshot};

/// Derive the liveness key from the peer address and user agent
pub fn bot_identity(peer: Option<ConnectInfo<SocketAddr>>, headers: &HeaderMap) -> BotIdentity {
    let address = peer.map(|ConnectInfo(addr)| addr.ip().to_string());
    let agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    BotIdentity::new(address.as_deref(), agent)
}

/// GET /api/getcommands
pub async fn get_commands(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<BotQuery>,
) -> std::result::Result<Json<SyncSnapshot>, ApiError> {
    let identity = bot_identity(peer, &headers);
    let snapshot = state
        .relay
        .fetch_sync(query.botkey.as_deref(), &identity, query.cursor())
        .await
        .map_err(api_error)?;

    Ok(Json(snapshot))
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub status: &'static str,
}

/// POST /api/bot-confirm
pub async fn bot_confirm(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<BotQuery>,
    body: std::result::Result<Json<ConfirmRequest>, JsonRejection>,
) -> std::result::Result<Json<ConfirmResponse>, ApiError> {
    let identity = bot_identity(peer, &headers);
    let req = match body {
        Ok(Json(req)) => req,
        // No JSON body at all: nothing but the credential to go on
        Err(JsonRejection::MissingJsonContentType(_)) => ConfirmRequest::default(),
        Err(rejection) => {
            state
                .relay
                .authorize(Role::Bot, query.botkey.as_deref())
                .map_err(api_error)?;
            return Err(api_error(RelayError::InvalidArgument(format!(
                "Invalid confirmation body: {}",
                rejection.body_text()
            ))));
        }
    };
    state
        .relay
        .confirm_execution(query.botkey.as_deref(), &identity, req.into_confirmation())
        .await
        .map_err(api_error)?;

    Ok(Json(ConfirmResponse {
        status: "confirmed",
    }))
}

/// POST /api/verify-bot
pub async fn verify_bot(
    State(state): State<AppState>,
    body: Option<Json<VerifyRequest>>,
) -> (StatusCode, Json<VerifyResponse>) {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    match state.relay.verify_bot(req.botkey.as_deref()).await {
        Ok(current_trend) => (
            StatusCode::OK,
            Json(VerifyResponse {
                status: "authorized",
                message: "Bot key valid",
                server_time: Some(Utc::now().timestamp_millis()),
                current_trend: Some(current_trend),
            }),
        ),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse {
                status: "unauthorized",
                message: "Invalid bot key",
                server_time: None,
                current_trend: None,
            }),
        ),
    }
}

/// GET /api/trend-status
pub async fn trend_status(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<BotQuery>,
) -> std::result::Result<Json<QuickStatus>, ApiError> {
    let identity = bot_identity(peer, &headers);
    let status = state
        .relay
        .quick_status(query.botkey.as_deref(), &identity)
        .await
        .map_err(api_error)?;

    Ok(Json(status))
}
