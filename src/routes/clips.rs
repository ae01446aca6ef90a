//! Clip review and manual posting endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::domain::clips::{ClipStats, StoreError, clip_stats};
use crate::domain::jobs::{JobStatus, PostingJob};
use crate::models::{Clip, ClipEdit};
use crate::services::automation::AutomationError;
use crate::services::error::LogErr;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clips", get(list_clips))
        .route("/clips/stats", get(get_clip_stats))
        .route("/clips/{id}", get(get_clip).patch(edit_clip))
        .route("/clips/{id}/post", post(post_clip))
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipsQuery {
    pub video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostClipRequest {
    /// Defaults to the automation platforms
    pub platforms: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct PostClipResponse {
    pub success: bool,
    pub job: PostingJob,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /clips - List clips, optionally for one video
async fn list_clips(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClipsQuery>,
) -> Result<Json<Vec<Clip>>, StatusCode> {
    let clips = state
        .clips
        .list(query.video_id.as_deref())
        .await
        .log_500("List clips error")?;
    Ok(Json(clips))
}

/// GET /clips/stats - Totals over every stored clip and video
async fn get_clip_stats(State(state): State<Arc<AppState>>) -> Result<Json<ClipStats>, StatusCode> {
    let clips = state.clips.list(None).await.log_500("Clip stats error")?;
    let videos = state.videos.list_videos(None).await.log_500("Clip stats error")?;
    Ok(Json(clip_stats(&clips, videos.len())))
}

/// GET /clips/{id}
async fn get_clip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Clip>, StatusCode> {
    state
        .clips
        .get(&id)
        .await
        .log_500("Get clip error")?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// PATCH /clips/{id} - Edit title, caption or hashtags
async fn edit_clip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(edit): Json<ClipEdit>,
) -> Result<Json<Clip>, StatusCode> {
    match state.clips.update_metadata(&id, edit).await {
        Ok(clip) => Ok(Json(clip)),
        Err(StoreError::NotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(e).log_500("Edit clip error"),
    }
}

/// POST /clips/{id}/post - Post a clip now, outside the schedule
async fn post_clip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<PostClipRequest>>,
) -> Result<Json<PostClipResponse>, StatusCode> {
    let platforms = body
        .and_then(|Json(req)| req.platforms)
        .unwrap_or_else(|| state.automation.settings().platforms);

    match state.automation.post_clip_now(&id, platforms).await {
        Ok(job) => Ok(Json(PostClipResponse {
            success: job.status == JobStatus::Posted,
            job,
        })),
        Err(e @ AutomationError::ClipNotFound(_)) => {
            Err(e).log_status("Manual post error", StatusCode::NOT_FOUND)
        }
        Err(e) => Err(e).log_500("Manual post error"),
    }
}
