//! Social platform posting capabilities
//!
//! Real platform SDKs live outside this service. A [`PlatformPoster`] is the
//! seam: the simulated poster mimics network latency and a success rate, the
//! webhook poster forwards the post payload to an HTTP endpoint.

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::models::Clip;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{platform} rejected the post: {reason}")]
    Rejected { platform: String, reason: String },
    #[error("platform {0} is not configured")]
    Unknown(String),
}

/// Posting capability for one social platform.
///
/// Calls may be slow and are made concurrently for different platforms of
/// the same job.
#[async_trait]
pub trait PlatformPoster: Send + Sync {
    fn name(&self) -> &str;

    async fn post(&self, clip: &Clip) -> Result<(), PlatformError>;

    async fn test_connection(&self) -> Result<(), PlatformError> {
        Ok(())
    }
}

/// What goes out to a platform for one clip
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload<'a> {
    pub platform: &'a str,
    pub clip_id: &'a str,
    pub title: &'a str,
    pub caption: &'a str,
    pub hashtags: &'a [String],
    pub duration: f64,
    pub virality_score: f64,
}

impl<'a> PostPayload<'a> {
    pub fn new(platform: &'a str, clip: &'a Clip) -> Self {
        Self {
            platform,
            clip_id: &clip.id,
            title: &clip.title,
            caption: &clip.caption,
            hashtags: &clip.hashtags,
            duration: clip.duration,
            virality_score: clip.virality_score,
        }
    }
}

/// Stand-in for a platform API: random latency, configurable success rate
pub struct SimulatedPoster {
    name: String,
    success_rate: f64,
    min_latency: Duration,
    max_latency: Duration,
}

impl SimulatedPoster {
    /// `success_rate` is clamped to `[0, 1]`; a non-finite rate never succeeds
    pub fn new(name: &str, success_rate: f64) -> Self {
        let success_rate = if success_rate.is_finite() {
            success_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            name: name.to_string(),
            success_rate,
            min_latency: Duration::from_millis(1000),
            max_latency: Duration::from_millis(3000),
        }
    }

    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        self.min_latency = min;
        self.max_latency = max.max(min);
        self
    }

    fn roll(&self) -> (Duration, bool) {
        let mut rng = rand::rng();
        let latency = if self.max_latency > self.min_latency {
            rng.random_range(self.min_latency..=self.max_latency)
        } else {
            self.min_latency
        };
        (latency, rng.random_bool(self.success_rate))
    }
}

#[async_trait]
impl PlatformPoster for SimulatedPoster {
    fn name(&self) -> &str {
        &self.name
    }

    async fn post(&self, clip: &Clip) -> Result<(), PlatformError> {
        info!(
            platform = %self.name,
            title = %clip.title,
            hashtags = ?clip.hashtags,
            duration = clip.duration,
            virality_score = clip.virality_score,
            "[platform] posting clip"
        );

        let (latency, ok) = self.roll();
        tokio::time::sleep(latency).await;

        if ok {
            Ok(())
        } else {
            Err(PlatformError::Rejected {
                platform: self.name.clone(),
                reason: "simulated outage".to_string(),
            })
        }
    }

    async fn test_connection(&self) -> Result<(), PlatformError> {
        let (latency, ok) = self.roll();
        tokio::time::sleep(latency).await;
        if ok {
            Ok(())
        } else {
            Err(PlatformError::Rejected {
                platform: self.name.clone(),
                reason: "connection test failed".to_string(),
            })
        }
    }
}

/// Forwards posts as JSON to an HTTP endpoint
#[derive(Clone)]
pub struct WebhookPoster {
    name: String,
    url: String,
    http: Client,
}

impl WebhookPoster {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl PlatformPoster for WebhookPoster {
    fn name(&self) -> &str {
        &self.name
    }

    async fn post(&self, clip: &Clip) -> Result<(), PlatformError> {
        let resp = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&PostPayload::new(&self.name, clip))
            .send()
            .await?;

        if !resp.status().is_success() {
            let reason = resp.text().await?;
            return Err(PlatformError::Rejected {
                platform: self.name.clone(),
                reason,
            });
        }

        Ok(())
    }

    async fn test_connection(&self) -> Result<(), PlatformError> {
        let resp = self.http.head(&self.url).send().await?;
        if resp.status().is_server_error() {
            return Err(PlatformError::Rejected {
                platform: self.name.clone(),
                reason: resp.status().to_string(),
            });
        }
        Ok(())
    }
}

/// Posters by platform name
#[derive(Clone, Default)]
pub struct PlatformRegistry {
    posters: HashMap<String, Arc<dyn PlatformPoster>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, poster: Arc<dyn PlatformPoster>) {
        self.posters.insert(poster.name().to_string(), poster);
    }

    pub fn with(mut self, poster: Arc<dyn PlatformPoster>) -> Self {
        self.register(poster);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PlatformPoster>> {
        self.posters.get(name).cloned()
    }

    /// Registered platform names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.posters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Post to one platform by name; unknown names fail without a call
    pub async fn post(&self, platform: &str, clip: &Clip) -> Result<(), PlatformError> {
        match self.get(platform) {
            Some(poster) => poster.post(clip).await,
            None => Err(PlatformError::Unknown(platform.to_string())),
        }
    }

    pub async fn test_connection(&self, platform: &str) -> Result<(), PlatformError> {
        match self.get(platform) {
            Some(poster) => poster.test_connection().await,
            None => Err(PlatformError::Unknown(platform.to_string())),
        }
    }
}
