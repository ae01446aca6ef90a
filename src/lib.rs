//! ClipForge: turns video transcripts into ranked short clips and posts the
//! best of them to social platforms on a schedule.

pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use domain::clips::ClipStore;
use domain::videos::VideoStore;
use services::automation::AutomationEngine;
use services::pipeline::ClipPipeline;
use services::transcript::TranscriptSource;

/// Shared state handed to every route handler
pub struct AppState {
    pub pipeline: ClipPipeline,
    pub clips: Arc<dyn ClipStore>,
    pub videos: Arc<dyn VideoStore>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub automation: Arc<AutomationEngine>,
}

/// Full HTTP application with a permissive CORS policy
pub fn build_app(state: Arc<AppState>) -> Router {
    routes::build_routes()
        .layer(CorsLayer::permissive())
        .with_state(state)
}
