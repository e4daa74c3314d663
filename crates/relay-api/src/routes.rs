//! API route definitions and setup

use crate::{
    config::ApiSettings,
    handlers::{
        AppState, consume_result, consume_results, debug_reset, debug_state, health_check,
        ingest_callback, store_stats,
    },
    realtime::push_channel,
};
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main API router
pub fn create_router(state: AppState, settings: &ApiSettings) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(health_check))
        .route("/stats", get(store_stats))
        // Callback ingestion
        .route("/callback", post(ingest_callback))
        // Pull channel
        .route("/result/{action_id}", get(consume_result))
        .route("/results", post(consume_results))
        // Push channel
        .route("/ws", get(push_channel))
        // Development-only surface
        .route("/debug/state", get(debug_state))
        .route("/debug/reset", post(debug_reset))
        // Utility endpoints
        .route("/ping", get(ping))
        .route("/version", get(version))
        .layer(create_cors_layer(settings))
        .layer(TraceLayer::new_for_http())
        // State for all routes
        .with_state(state)
}

/// Build the CORS layer from the configured origin list
pub fn create_cors_layer(settings: &ApiSettings) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if settings.cors_origins.iter().any(|origin| origin == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = settings
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// Simple ping endpoint
async fn ping() -> &'static str {
    "pong"
}

/// Version information endpoint
async fn version() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": env!("CARGO_PKG_NAME"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
    }))
}
