//! API Routes
//!
//! Configures the Axum router with all badge server endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{badge_handler, health_handler, stats_handler, usage_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /:owner/:repository/:badge_type[/...]` - Badge image
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
/// - anything else - 400 with usage text
///
/// # Middleware
/// - CORS: Allows any origin, so badges embed anywhere
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/:owner/:repository/*badge_type", get(badge_handler))
        .fallback(usage_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
