//! Videos and their processing runs
//!
//! Every `/process-video` request with a readable body opens a run. The video
//! record tracks the latest run: uploaded, processing, then completed or
//! failed. Runs keep the error or the transcript they ended with.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::clips::StoreError;
use crate::models::Clip;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploaded => "uploaded",
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub source_url: String,
    pub status: VideoStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Processing,
    Completed,
    Failed,
}

/// One pass of the clip pipeline over a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingRun {
    pub id: String,
    pub video_id: String,
    pub user_id: String,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub clip_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a run is opened with
#[derive(Debug, Clone)]
pub struct NewRun<'a> {
    pub video_id: &'a str,
    pub user_id: &'a str,
    pub title: Option<&'a str>,
    pub source_url: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed { transcript: String, clip_count: usize },
    Failed { error: String },
}

#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Register the video if new, mark it processing and open a run
    async fn start_run(&self, run: NewRun<'_>) -> Result<ProcessingRun, StoreError>;

    /// Close a run and carry its outcome onto the video
    async fn finish_run(&self, run_id: &str, outcome: RunOutcome) -> Result<ProcessingRun, StoreError>;

    /// Newest first, optionally for one user
    async fn list_videos(&self, user_id: Option<&str>) -> Result<Vec<Video>, StoreError>;

    async fn get_video(&self, video_id: &str) -> Result<Option<Video>, StoreError>;

    /// Runs of one video, newest first
    async fn runs_for(&self, video_id: &str) -> Result<Vec<ProcessingRun>, StoreError>;

    /// Runs still in progress
    async fn active_runs(&self) -> Result<Vec<ProcessingRun>, StoreError>;
}

#[derive(Default)]
struct VideoTables {
    videos: Vec<Video>,
    runs: Vec<ProcessingRun>,
}

/// Process-local video store
#[derive(Default)]
pub struct InMemoryVideoStore {
    tables: RwLock<VideoTables>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, VideoTables>, StoreError> {
        self.tables
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, VideoTables>, StoreError> {
        self.tables
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn start_run(&self, run: NewRun<'_>) -> Result<ProcessingRun, StoreError> {
        let now = Utc::now();
        let mut tables = self.write()?;

        match tables.videos.iter_mut().find(|v| v.id == run.video_id) {
            Some(video) => {
                if let Some(title) = run.title {
                    video.title = title.to_string();
                }
                video.source_url = run.source_url.to_string();
                video.status = VideoStatus::Processing;
                video.updated_at = now;
            }
            None => tables.videos.push(Video {
                id: run.video_id.to_string(),
                user_id: run.user_id.to_string(),
                title: run.title.unwrap_or("Video").to_string(),
                source_url: run.source_url.to_string(),
                status: VideoStatus::Processing,
                created_at: now,
                updated_at: now,
            }),
        }

        let started = ProcessingRun {
            id: format!("run_{}", Uuid::new_v4().simple()),
            video_id: run.video_id.to_string(),
            user_id: run.user_id.to_string(),
            status: RunStatus::Processing,
            error_message: None,
            transcript: None,
            clip_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.runs.push(started.clone());
        Ok(started)
    }

    async fn finish_run(&self, run_id: &str, outcome: RunOutcome) -> Result<ProcessingRun, StoreError> {
        let now = Utc::now();
        let mut tables = self.write()?;

        let run = tables
            .runs
            .iter_mut()
            .find(|r| r.id == run_id)
            .ok_or_else(|| StoreError::NotFound(run_id.to_string()))?;

        let video_status = match outcome {
            RunOutcome::Completed {
                transcript,
                clip_count,
            } => {
                run.status = RunStatus::Completed;
                run.transcript = Some(transcript);
                run.clip_count = clip_count;
                VideoStatus::Completed
            }
            RunOutcome::Failed { error } => {
                run.status = RunStatus::Failed;
                run.error_message = Some(error);
                VideoStatus::Failed
            }
        };
        run.updated_at = now;
        let finished = run.clone();

        if let Some(video) = tables.videos.iter_mut().find(|v| v.id == finished.video_id) {
            video.status = video_status;
            video.updated_at = now;
        }

        Ok(finished)
    }

    async fn list_videos(&self, user_id: Option<&str>) -> Result<Vec<Video>, StoreError> {
        let mut videos: Vec<Video> = self
            .read()?
            .videos
            .iter()
            .filter(|v| user_id.is_none_or(|u| v.user_id == u))
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn get_video(&self, video_id: &str) -> Result<Option<Video>, StoreError> {
        Ok(self.read()?.videos.iter().find(|v| v.id == video_id).cloned())
    }

    async fn runs_for(&self, video_id: &str) -> Result<Vec<ProcessingRun>, StoreError> {
        // Insertion order is chronological
        Ok(self
            .read()?
            .runs
            .iter()
            .rev()
            .filter(|r| r.video_id == video_id)
            .cloned()
            .collect())
    }

    async fn active_runs(&self) -> Result<Vec<ProcessingRun>, StoreError> {
        Ok(self
            .read()?
            .runs
            .iter()
            .filter(|r| r.status == RunStatus::Processing)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Video,
    Clip,
    Processing,
}

/// One line of the recent activity feed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: String,
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub status: String,
    pub time: DateTime<Utc>,
}

/// Videos, generated clips and runs still in progress, newest first
pub fn recent_activity(
    videos: &[Video],
    clips: &[Clip],
    active_runs: &[ProcessingRun],
    limit: usize,
) -> Vec<ActivityItem> {
    let videos = videos.iter().map(|v| ActivityItem {
        id: v.id.clone(),
        kind: ActivityKind::Video,
        title: format!("Video \"{}\" uploaded", v.title),
        description: format!("Status: {}", v.status.as_str()),
        status: v.status.as_str().to_string(),
        time: v.created_at,
    });

    let clips = clips.iter().map(|c| ActivityItem {
        id: c.id.clone(),
        kind: ActivityKind::Clip,
        title: format!("Clip \"{}\" generated", c.title),
        description: format!("Virality score: {}", c.virality_score),
        status: "completed".to_string(),
        time: c.created_at,
    });

    let runs = active_runs.iter().map(|r| ActivityItem {
        id: r.id.clone(),
        kind: ActivityKind::Processing,
        title: "Processing video...".to_string(),
        description: format!("Video {}", r.video_id),
        status: "processing".to_string(),
        time: r.updated_at,
    });

    let mut items: Vec<ActivityItem> = videos.chain(clips).chain(runs).collect();
    items.sort_by(|a, b| b.time.cmp(&a.time));
    items.truncate(limit);
    items
}
