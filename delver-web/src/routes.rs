//! Route definitions for the Delver web server

use crate::{handlers, ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Research endpoints
        .route("/research/clarify", post(handlers::clarify_topic))
        .route("/research", post(handlers::run_research))
        .route("/research/stream", post(handlers::run_research_stream))
        // OpenAPI document
        .route(
            "/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}
