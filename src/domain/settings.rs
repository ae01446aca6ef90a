//! Automation settings and their persistence
//!
//! Settings are stored as one flat JSON object. Keys missing from a stored
//! blob fall back to the defaults, so older or hand-written files still load.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings: {0}")]
    Invalid(String),
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Local time-of-day window, "HH:MM" on both ends, inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingHours {
    pub start: String,
    pub end: String,
}

impl PostingHours {
    /// Lexicographic comparison is correct for zero-padded HH:MM
    pub fn contains(&self, time_of_day: &str) -> bool {
        time_of_day >= self.start.as_str() && time_of_day <= self.end.as_str()
    }
}

impl Default for PostingHours {
    fn default() -> Self {
        Self {
            start: "09:00".to_string(),
            end: "21:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutomationSettings {
    pub enabled: bool,
    /// Minutes between successful posts
    pub posting_interval: u32,
    pub platforms: Vec<String>,
    pub min_virality_score: f64,
    pub max_posts_per_day: u32,
    pub posting_hours: PostingHours,
    pub auto_approve: bool,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            posting_interval: 60,
            platforms: Vec::new(),
            min_virality_score: 8.0,
            max_posts_per_day: 10,
            posting_hours: PostingHours::default(),
            auto_approve: false,
        }
    }
}

fn is_hh_mm(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = |s: &str| s.parse::<u32>().ok().filter(|_| s.bytes().all(|b| b.is_ascii_digit()));
    matches!(
        (digits(&value[..2]), digits(&value[3..])),
        (Some(h), Some(m)) if h < 24 && m < 60
    )
}

impl AutomationSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !is_hh_mm(&self.posting_hours.start) || !is_hh_mm(&self.posting_hours.end) {
            return Err(SettingsError::Invalid(format!(
                "posting hours must be HH:MM, got {}-{}",
                self.posting_hours.start, self.posting_hours.end
            )));
        }
        if !(0.0..=10.0).contains(&self.min_virality_score) {
            return Err(SettingsError::Invalid(format!(
                "minViralityScore must be within 0-10, got {}",
                self.min_virality_score
            )));
        }
        if self.posting_interval == 0 {
            return Err(SettingsError::Invalid(
                "postingInterval must be at least 1 minute".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge a partial update over these settings
    pub fn merged(&self, patch: SettingsPatch) -> Self {
        let mut next = self.clone();
        if let Some(enabled) = patch.enabled {
            next.enabled = enabled;
        }
        if let Some(interval) = patch.posting_interval {
            next.posting_interval = interval;
        }
        if let Some(platforms) = patch.platforms {
            next.platforms = platforms;
        }
        if let Some(score) = patch.min_virality_score {
            next.min_virality_score = score;
        }
        if let Some(max) = patch.max_posts_per_day {
            next.max_posts_per_day = max;
        }
        if let Some(hours) = patch.posting_hours {
            next.posting_hours = hours;
        }
        if let Some(auto_approve) = patch.auto_approve {
            next.auto_approve = auto_approve;
        }
        next
    }
}

/// Partial settings update; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub enabled: Option<bool>,
    pub posting_interval: Option<u32>,
    pub platforms: Option<Vec<String>>,
    pub min_virality_score: Option<f64>,
    pub max_posts_per_day: Option<u32>,
    pub posting_hours: Option<PostingHours>,
    pub auto_approve: Option<bool>,
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `None` when nothing has been saved yet
    async fn load(&self) -> Result<Option<AutomationSettings>, SettingsError>;

    async fn save(&self, settings: &AutomationSettings) -> Result<(), SettingsError>;
}

/// Settings kept in a JSON file on local disk
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn load(&self) -> Result<Option<AutomationSettings>, SettingsError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, settings: &AutomationSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(settings)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Settings held in memory only
#[derive(Default)]
pub struct MemorySettingsStore {
    saved: Mutex<Option<AutomationSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(settings: AutomationSettings) -> Self {
        Self {
            saved: Mutex::new(Some(settings)),
        }
    }

    pub fn saved(&self) -> Option<AutomationSettings> {
        self.saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Option<AutomationSettings>, SettingsError> {
        Ok(self.saved())
    }

    async fn save(&self, settings: &AutomationSettings) -> Result<(), SettingsError> {
        *self
            .saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(settings.clone());
        Ok(())
    }
}
