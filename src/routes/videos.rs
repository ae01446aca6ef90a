//! Processed videos, their runs and the recent activity feed

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::constants::{DEFAULT_RECENT_ACTIVITY, MAX_RECENT_ACTIVITY};
use crate::domain::videos::{ActivityItem, ProcessingRun, Video, recent_activity};
use crate::services::error::LogErr;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", get(list_videos))
        .route("/videos/{id}", get(get_video))
        .route("/activity", get(list_activity))
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideosQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: Video,
    pub runs: Vec<ProcessingRun>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /videos - Videos newest first, optionally for one user
async fn list_videos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VideosQuery>,
) -> Result<Json<Vec<Video>>, StatusCode> {
    let videos = state
        .videos
        .list_videos(query.user_id.as_deref())
        .await
        .log_500("List videos error")?;
    Ok(Json(videos))
}

/// GET /videos/{id} - One video with its processing runs
async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VideoDetail>, StatusCode> {
    let video = state
        .videos
        .get_video(&id)
        .await
        .log_500("Get video error")?
        .ok_or(StatusCode::NOT_FOUND)?;
    let runs = state.videos.runs_for(&id).await.log_500("Get video error")?;
    Ok(Json(VideoDetail { video, runs }))
}

/// GET /activity - Uploaded videos, generated clips and runs in progress
async fn list_activity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityItem>>, StatusCode> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_ACTIVITY)
        .clamp(1, MAX_RECENT_ACTIVITY);

    let videos = state.videos.list_videos(None).await.log_500("Activity error")?;
    let clips = state.clips.list(None).await.log_500("Activity error")?;
    let runs = state.videos.active_runs().await.log_500("Activity error")?;

    Ok(Json(recent_activity(&videos, &clips, &runs, limit)))
}
