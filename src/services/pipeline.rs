//! Transcript → ranked clips
//!
//! Segments the transcript, scores every segment, drops anything under the
//! clip gate, attaches metadata, then keeps the best [`MAX_CLIPS_PER_VIDEO`].

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::constants::{CLIP_SCORE_GATE, MAX_CLIPS_PER_VIDEO};
use crate::models::{Clip, ClipStatus, ScoredSegment, TranscriptLine};
use crate::services::{metadata, scorer, segmenter};

/// Identifies the video and owner the clips belong to
#[derive(Debug, Clone)]
pub struct PipelineInput<'a> {
    pub video_id: &'a str,
    pub user_id: &'a str,
    pub title: Option<&'a str>,
    pub transcript: &'a [TranscriptLine],
}

pub struct ClipPipeline {
    rng: Mutex<StdRng>,
}

impl Default for ClipPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipPipeline {
    /// Pipeline with an OS-seeded random source for titles and captions
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Pipeline with a fixed seed, so metadata is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn run(&self, input: PipelineInput<'_>) -> Vec<Clip> {
        let scored: Vec<ScoredSegment> = segmenter::build_segments(input.transcript)
            .into_iter()
            .map(|segment| {
                let virality_score = scorer::score(&segment.text);
                ScoredSegment {
                    segment,
                    virality_score,
                }
            })
            .collect();

        let total_segments = scored.len();
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Utc::now();

        let mut clips: Vec<Clip> = scored
            .into_iter()
            .filter(|s| s.virality_score >= CLIP_SCORE_GATE)
            .map(|s| {
                let meta = metadata::generate(&s, input.title, &mut *rng);
                Clip {
                    id: format!("clip_{}", Uuid::new_v4().simple()),
                    video_id: input.video_id.to_string(),
                    user_id: input.user_id.to_string(),
                    title: meta.title,
                    caption: meta.caption,
                    hashtags: meta.hashtags,
                    transcript: s.segment.text,
                    start_time: s.segment.start_time,
                    end_time: s.segment.end_time,
                    duration: s.segment.duration,
                    virality_score: s.virality_score,
                    status: ClipStatus::Generated,
                    posted_platforms: Vec::new(),
                    created_at: now,
                }
            })
            .collect();

        rank_clips(&mut clips);
        clips.truncate(MAX_CLIPS_PER_VIDEO);

        debug!(
            video_id = input.video_id,
            segments = total_segments,
            clips = clips.len(),
            "[pipeline] ranked clips"
        );

        clips
    }
}

/// Highest score first; equal scores keep the earlier start time first.
pub fn rank_clips(clips: &mut [Clip]) {
    clips.sort_by(|a, b| {
        b.virality_score
            .total_cmp(&a.virality_score)
            .then(a.start_time.total_cmp(&b.start_time))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_HASHTAGS;
    use crate::services::metadata::BASE_HASHTAGS;
    use crate::services::transcript::sample_transcript;

    fn run(pipeline: &ClipPipeline, transcript: &[TranscriptLine]) -> Vec<Clip> {
        pipeline.run(PipelineInput {
            video_id: "video_1",
            user_id: "user_1",
            title: Some("AI Talk"),
            transcript,
        })
    }

    #[test]
    fn empty_transcript_yields_no_clips() {
        assert!(run(&ClipPipeline::with_seed(1), &[]).is_empty());
    }

    #[test]
    fn sample_transcript_produces_ranked_gated_clips() {
        let clips = run(&ClipPipeline::with_seed(1), &sample_transcript());

        assert!(!clips.is_empty());
        assert!(clips.len() <= MAX_CLIPS_PER_VIDEO);
        for pair in clips.windows(2) {
            assert!(pair[0].virality_score >= pair[1].virality_score);
        }
        for clip in &clips {
            assert!(clip.virality_score >= CLIP_SCORE_GATE);
            assert_eq!(clip.hashtags.len(), MAX_HASHTAGS);
            assert_eq!(&clip.hashtags[..4], BASE_HASHTAGS);
            assert_eq!(clip.status, ClipStatus::Generated);
            assert!(clip.posted_platforms.is_empty());
            assert_eq!(clip.video_id, "video_1");
            assert_eq!(clip.user_id, "user_1");
            assert!(clip.id.starts_with("clip_"));
        }
    }

    #[test]
    fn clip_ids_are_unique() {
        let clips = run(&ClipPipeline::with_seed(3), &sample_transcript());
        let mut ids: Vec<_> = clips.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), clips.len());
    }

    #[test]
    fn low_scoring_transcript_yields_nothing() {
        let transcript = vec![
            TranscriptLine::new("plain words", 0.0, 10.0),
            TranscriptLine::new("more plain words", 10.0, 20.0),
            TranscriptLine::new("still plain", 20.0, 30.0),
        ];
        assert!(run(&ClipPipeline::with_seed(1), &transcript).is_empty());
    }

    #[test]
    fn ties_keep_earlier_segment_first() {
        let base = run(&ClipPipeline::with_seed(1), &sample_transcript());
        let mut clips: Vec<Clip> = base.iter().take(1).cloned().collect();
        let mut later = clips[0].clone();
        later.start_time += 100.0;
        later.id = "later".into();
        clips.insert(0, later);

        rank_clips(&mut clips);
        assert_ne!(clips[0].id, "later");
        assert_eq!(clips[1].id, "later");
    }
}
