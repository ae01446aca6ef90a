//! Automation settings, stats and job history endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::constants::{DEFAULT_RECENT_JOBS, MAX_RECENT_JOBS};
use crate::domain::jobs::PostingJob;
use crate::domain::settings::{AutomationSettings, SettingsError, SettingsPatch};
use crate::services::automation::AutomationStats;
use crate::services::error::LogErr;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/automation/settings", get(get_settings).put(update_settings))
        .route("/automation/stats", get(get_stats))
        .route("/automation/jobs", get(list_jobs))
        .route("/automation/platforms", get(list_platforms))
        .route("/automation/platforms/{name}/test", post(test_platform))
}

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PlatformTestResponse {
    pub platform: String,
    pub connected: bool,
}

/// GET /automation/settings
async fn get_settings(State(state): State<Arc<AppState>>) -> Json<AutomationSettings> {
    Json(state.automation.settings())
}

/// PUT /automation/settings - Partial update; starts or stops the scheduler to match
async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<AutomationSettings>, StatusCode> {
    match state.automation.update_settings(patch).await {
        Ok(settings) => Ok(Json(settings)),
        Err(e @ SettingsError::Invalid(_)) => {
            Err(e).log_status("Update settings error", StatusCode::BAD_REQUEST)
        }
        Err(e) => Err(e).log_500("Update settings error"),
    }
}

/// GET /automation/stats
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<AutomationStats> {
    Json(state.automation.stats().await)
}

/// GET /automation/jobs - Most recent posting jobs first
async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JobsQuery>,
) -> Json<Vec<PostingJob>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_JOBS)
        .clamp(1, MAX_RECENT_JOBS);
    Json(state.automation.recent_jobs(limit))
}

/// GET /automation/platforms - Platforms a clip can be posted to
async fn list_platforms(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.automation.platforms().names())
}

/// POST /automation/platforms/{name}/test
async fn test_platform(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<PlatformTestResponse> {
    let connected = state.automation.test_platform(&name).await;
    Json(PlatformTestResponse {
        platform: name,
        connected,
    })
}
