pub mod automation;
pub mod clips;
pub mod process;
pub mod videos;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(process::routes())
        .merge(clips::routes())
        .merge(automation::routes())
        .merge(videos::routes())
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
