use axum::{extract::State, Json};

use crate::api::state::AppState;
use crate::relay::{DebugDump, HealthSnapshot, RelayStats};

/// GET /api/health -- unauthenticated counts and flags
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthSnapshot> {
    Json(state.relay.health().await)
}

/// GET /api/stats
///
/// Unauthenticated, like the health check. Exposes account metrics and bot
/// addresses; keep the relay off untrusted networks.
pub async fn get_stats(State(state): State<AppState>) -> Json<RelayStats> {
    Json(state.relay.stats().await)
}

/// GET /api/debug -- full dump of every store, unauthenticated
pub async fn get_debug(State(state): State<AppState>) -> Json<DebugDump> {
    Json(state.relay.debug_dump().await)
}
