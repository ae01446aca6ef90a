//! Transcript sources
//!
//! The core never transcribes audio itself. A [`TranscriptSource`] hands back
//! timestamped lines for a video URL, either from the bundled sample or from
//! an external transcription service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::models::TranscriptLine;

/// Seconds each sample line spans
const SAMPLE_LINE_SECS: f64 = 25.0;

const SAMPLE_LINES: &[&str] = &[
    "Welcome everyone to today's discussion about artificial intelligence and its impact on society.",
    "I want to share three mind-blowing facts about AI that will change how you think about technology.",
    "First, did you know that AI can now create art that's indistinguishable from human work?",
    "This is absolutely revolutionary and it's happening right now as we speak.",
    "Second, machine learning algorithms are already making decisions that affect millions of people daily.",
    "From what you see on social media to loan approvals, AI is everywhere.",
    "Third, the next breakthrough in AI could happen tomorrow, and we might not even realize it.",
    "These developments are happening faster than most people understand.",
    "The implications for jobs, creativity, and human connection are profound.",
    "But here's what really excites me about the future of AI and technology.",
    "We're on the verge of something that could completely transform how we work and live.",
    "The question isn't whether AI will change everything, it's how quickly it will happen.",
];

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("No video source provided")]
    MissingSource,
    #[error("Transcription service error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Transcription service rejected request: {0}")]
    Api(String),
}

#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_url: &str) -> Result<Vec<TranscriptLine>, TranscriptError>;
}

/// The bundled 12-line demo transcript, 25 seconds per line
pub fn sample_transcript() -> Vec<TranscriptLine> {
    SAMPLE_LINES
        .iter()
        .enumerate()
        .map(|(i, text)| {
            TranscriptLine::new(*text, i as f64 * SAMPLE_LINE_SECS, (i + 1) as f64 * SAMPLE_LINE_SECS)
        })
        .collect()
}

/// Returns the sample transcript for any video
#[derive(Debug, Clone, Default)]
pub struct SampleTranscriptSource;

#[async_trait]
impl TranscriptSource for SampleTranscriptSource {
    async fn fetch(&self, video_url: &str) -> Result<Vec<TranscriptLine>, TranscriptError> {
        if video_url.trim().is_empty() {
            return Err(TranscriptError::MissingSource);
        }
        Ok(sample_transcript())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptRequest<'a> {
    video_url: &'a str,
}

/// Asks an external transcription service for `[{text, start, end}]`
#[derive(Clone)]
pub struct HttpTranscriptSource {
    endpoint: String,
    http: Client,
}

impl HttpTranscriptSource {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl TranscriptSource for HttpTranscriptSource {
    async fn fetch(&self, video_url: &str) -> Result<Vec<TranscriptLine>, TranscriptError> {
        if video_url.trim().is_empty() {
            return Err(TranscriptError::MissingSource);
        }

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&TranscriptRequest { video_url })
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(TranscriptError::Api(text));
        }

        Ok(resp.json().await?)
    }
}
