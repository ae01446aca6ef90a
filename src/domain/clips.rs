//! Clip store - where pipeline output lives until it is posted
//!
//! The store is a seam: the service ships an in-memory implementation, and
//! the scheduler only needs [`ClipStore::list_eligible`] and
//! [`ClipStore::update_status`].

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;
use thiserror::Error;

use crate::models::{Clip, ClipEdit, ClipStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Which clips the scheduler may post
#[derive(Debug, Clone, Default)]
pub struct EligibleFilter {
    pub min_virality_score: f64,
    /// Clips that already have a successful posting job
    pub exclude_ids: HashSet<String>,
}

impl EligibleFilter {
    pub fn matches(&self, clip: &Clip) -> bool {
        clip.status == ClipStatus::Generated
            && clip.virality_score >= self.min_virality_score
            && !self.exclude_ids.contains(&clip.id)
    }
}

#[async_trait]
pub trait ClipStore: Send + Sync {
    async fn insert_many(&self, clips: Vec<Clip>) -> Result<(), StoreError>;

    async fn get(&self, clip_id: &str) -> Result<Option<Clip>, StoreError>;

    /// All clips, optionally limited to one video, in insertion order
    async fn list(&self, video_id: Option<&str>) -> Result<Vec<Clip>, StoreError>;

    /// Clips matching the filter, in insertion order
    async fn list_eligible(&self, filter: &EligibleFilter) -> Result<Vec<Clip>, StoreError>;

    async fn update_status(
        &self,
        clip_id: &str,
        status: ClipStatus,
        posted_platforms: &[String],
    ) -> Result<(), StoreError>;

    /// Apply a review edit; score and status are never touched
    async fn update_metadata(&self, clip_id: &str, edit: ClipEdit) -> Result<Clip, StoreError>;
}

/// Process-local clip store
#[derive(Default)]
pub struct InMemoryClipStore {
    clips: RwLock<Vec<Clip>>,
}

impl InMemoryClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Clip>>, StoreError> {
        self.clips
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Clip>>, StoreError> {
        self.clips
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl ClipStore for InMemoryClipStore {
    async fn insert_many(&self, clips: Vec<Clip>) -> Result<(), StoreError> {
        self.write()?.extend(clips);
        Ok(())
    }

    async fn get(&self, clip_id: &str) -> Result<Option<Clip>, StoreError> {
        Ok(self.read()?.iter().find(|c| c.id == clip_id).cloned())
    }

    async fn list(&self, video_id: Option<&str>) -> Result<Vec<Clip>, StoreError> {
        Ok(self
            .read()?
            .iter()
            .filter(|c| video_id.is_none_or(|v| c.video_id == v))
            .cloned()
            .collect())
    }

    async fn list_eligible(&self, filter: &EligibleFilter) -> Result<Vec<Clip>, StoreError> {
        Ok(self
            .read()?
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        clip_id: &str,
        status: ClipStatus,
        posted_platforms: &[String],
    ) -> Result<(), StoreError> {
        let mut clips = self.write()?;
        let clip = clips
            .iter_mut()
            .find(|c| c.id == clip_id)
            .ok_or_else(|| StoreError::NotFound(clip_id.to_string()))?;

        clip.status = status;
        clip.posted_platforms = posted_platforms.to_vec();
        Ok(())
    }

    async fn update_metadata(&self, clip_id: &str, edit: ClipEdit) -> Result<Clip, StoreError> {
        let mut clips = self.write()?;
        let clip = clips
            .iter_mut()
            .find(|c| c.id == clip_id)
            .ok_or_else(|| StoreError::NotFound(clip_id.to_string()))?;

        edit.apply(clip);
        Ok(clip.clone())
    }
}

/// Aggregate numbers over a set of clips and the videos they came from
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipStats {
    pub total_videos: usize,
    pub total_clips: usize,
    /// Rounded to one decimal
    pub avg_virality_score: f64,
    /// One per platform a clip went out to
    pub posts_published: usize,
}

pub fn clip_stats(clips: &[Clip], total_videos: usize) -> ClipStats {
    let avg = if clips.is_empty() {
        0.0
    } else {
        clips.iter().map(|c| c.virality_score).sum::<f64>() / clips.len() as f64
    };

    ClipStats {
        total_videos,
        total_clips: clips.len(),
        avg_virality_score: (avg * 10.0).round() / 10.0,
        posts_published: clips.iter().map(|c| c.posted_platforms.len()).sum(),
    }
}
