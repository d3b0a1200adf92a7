// lib.rs - app planner service: shared state and router
pub mod agent;
pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod middleware;
pub mod models;

use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::agent::AppPlannerAgent;

/// Shared across requests. Holds no per-turn plan state.
pub struct AppState {
    pub agent: AppPlannerAgent,
}

/// Full router with logging, CORS and shared state applied.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handlers::chat::chat_routes())
        .merge(handlers::health::health_routes())
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
