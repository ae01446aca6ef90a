//! Shared data models used across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped line from a transcription service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub text: String,
    #[serde(rename = "start")]
    pub start_seconds: f64,
    #[serde(rename = "end")]
    pub end_seconds: f64,
}

impl TranscriptLine {
    pub fn new(text: impl Into<String>, start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            text: text.into(),
            start_seconds,
            end_seconds,
        }
    }
}

/// A window of consecutive transcript lines considered as one clip candidate
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSegment {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

/// A candidate segment with its virality score attached
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSegment {
    pub segment: CandidateSegment,
    pub virality_score: f64,
}

/// Generated title/caption/hashtags for a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipMetadata {
    pub title: String,
    pub caption: String,
    pub hashtags: Vec<String>,
}

/// Clip lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClipStatus {
    Generated,
    Posted,
    Failed,
}

impl ClipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipStatus::Generated => "generated",
            ClipStatus::Posted => "posted",
            ClipStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ClipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored, titled clip produced by the pipeline.
///
/// `virality_score` never changes after creation. Review edits go through
/// [`ClipEdit`], which only reaches title, caption and hashtags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: String,
    pub video_id: String,
    pub user_id: String,
    pub title: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub transcript: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub virality_score: f64,
    pub status: ClipStatus,
    pub posted_platforms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Review-time edit of a clip's copy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipEdit {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub hashtags: Option<Vec<String>>,
}

impl ClipEdit {
    pub fn apply(self, clip: &mut Clip) {
        if let Some(title) = self.title {
            clip.title = title;
        }
        if let Some(caption) = self.caption {
            clip.caption = caption;
        }
        if let Some(hashtags) = self.hashtags {
            clip.hashtags = hashtags;
        }
    }
}
