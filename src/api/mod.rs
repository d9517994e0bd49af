//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::{
    complete_handler, health_handler, pause_handler, reset_handler, routine_handler,
    skip_handler, status_handler, timer_pause_handler, timer_start_handler,
};

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/exercises/:id/complete", post(complete_handler))
        .route("/exercises/:id/skip", post(skip_handler))
        .route("/exercises/:id/timer/start", post(timer_start_handler))
        .route("/exercises/:id/timer/pause", post(timer_pause_handler))
        .route("/pause", post(pause_handler))
        .route("/reset", post(reset_handler))
        .route("/routine", get(routine_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
