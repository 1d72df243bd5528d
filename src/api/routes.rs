use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Controller endpoints
        .route("/api/commands", post(handlers::submit_command))
        .route("/api/reset", post(handlers::reset_relay))
        // Bot endpoints
        .route("/api/getcommands", get(handlers::get_commands))
        .route("/api/bot-confirm", post(handlers::bot_confirm))
        .route("/api/verify-bot", post(handlers::verify_bot))
        .route("/api/trend-status", get(handlers::trend_status))
        // System endpoints
        .route("/api/health", get(handlers::health_handler))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/debug", get(handlers::get_debug))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
