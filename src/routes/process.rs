//! Video processing endpoint: transcript in, ranked clips out

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::AppState;
use crate::domain::videos::{NewRun, RunOutcome};
use crate::models::Clip;
use crate::services::pipeline::PipelineInput;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/process-video", post(process_video).options(preflight))
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessVideoRequest {
    #[serde(default)]
    pub video_url: String,
    pub video_id: String,
    pub user_id: String,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessVideoResponse {
    pub success: bool,
    pub video_id: String,
    /// Transcript lines joined with single spaces
    pub transcript: String,
    pub clips: Vec<Clip>,
    /// Milliseconds spent handling the request
    pub processing_time: u64,
    pub total_clips: usize,
}

#[derive(Debug, Serialize)]
pub struct ProcessVideoError {
    pub success: bool,
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// OPTIONS /process-video - CORS preflight for clients that skip the Origin header
async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, GET, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization"),
        ],
    )
}

/// POST /process-video - Run the clip pipeline for one video and store the clips
async fn process_video(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let started = Instant::now();

    match process(&state, &body).await {
        Ok((request, transcript, clips)) => {
            info!(
                video_id = %request.video_id,
                "[process-video] Generated {} clips for video {}",
                clips.len(),
                request.video_id
            );
            Json(ProcessVideoResponse {
                success: true,
                video_id: request.video_id,
                transcript,
                total_clips: clips.len(),
                clips,
                processing_time: started.elapsed().as_millis() as u64,
            })
            .into_response()
        }
        Err(message) => {
            error!("[process-video] Video processing error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProcessVideoError {
                    success: false,
                    error: message,
                }),
            )
                .into_response()
        }
    }
}

async fn process(
    state: &AppState,
    body: &[u8],
) -> Result<(ProcessVideoRequest, String, Vec<Clip>), String> {
    let request: ProcessVideoRequest =
        serde_json::from_slice(body).map_err(|e| format!("Invalid request body: {e}"))?;

    info!(
        "[process-video] Processing video: {} for user: {}",
        request.video_id, request.user_id
    );

    let run = state
        .videos
        .start_run(NewRun {
            video_id: &request.video_id,
            user_id: &request.user_id,
            title: request.title.as_deref(),
            source_url: &request.video_url,
        })
        .await
        .map_err(|e| e.to_string())?;

    let generated = generate(state, &request).await;

    let outcome = match &generated {
        Ok((transcript, clips)) => RunOutcome::Completed {
            transcript: transcript.clone(),
            clip_count: clips.len(),
        },
        Err(message) => RunOutcome::Failed {
            error: message.clone(),
        },
    };
    if let Err(e) = state.videos.finish_run(&run.id, outcome).await {
        error!("[process-video] Failed to record run {}: {}", run.id, e);
    }

    let (transcript, clips) = generated?;
    Ok((request, transcript, clips))
}

/// Transcript, pipeline and clip storage for one request
async fn generate(
    state: &AppState,
    request: &ProcessVideoRequest,
) -> Result<(String, Vec<Clip>), String> {
    let lines = state
        .transcripts
        .fetch(&request.video_url)
        .await
        .map_err(|e| e.to_string())?;

    let clips = state.pipeline.run(PipelineInput {
        video_id: &request.video_id,
        user_id: &request.user_id,
        title: request.title.as_deref(),
        transcript: &lines,
    });

    state
        .clips
        .insert_many(clips.clone())
        .await
        .map_err(|e| e.to_string())?;

    let transcript = lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Ok((transcript, clips))
}
