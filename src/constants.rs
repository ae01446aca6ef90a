//! Application constants

/// Lines per candidate segment window
pub const SEGMENT_WINDOW_LINES: usize = 3;

/// Segments scoring below this never get metadata or become clips.
/// Independent of the scheduler's configurable `min_virality_score`.
pub const CLIP_SCORE_GATE: f64 = 7.0;

/// Clips returned per processed video
pub const MAX_CLIPS_PER_VIDEO: usize = 5;

/// Hashtags kept per clip
pub const MAX_HASHTAGS: usize = 7;

/// Scheduler tick cadence (1 minute)
pub const DEFAULT_TICK_SECS: u64 = 60;

/// Posting jobs kept in the in-memory ledger
pub const DEFAULT_LEDGER_RETENTION: usize = 10_000;

/// Default page size for the recent jobs endpoint
pub const DEFAULT_RECENT_JOBS: usize = 10;

/// Maximum page size for the recent jobs endpoint
pub const MAX_RECENT_JOBS: usize = 100;

/// Default length of the recent activity feed
pub const DEFAULT_RECENT_ACTIVITY: usize = 10;

/// Maximum length of the recent activity feed
pub const MAX_RECENT_ACTIVITY: usize = 50;
