//! Automated posting scheduler
//!
//! A recurring timer drives [`AutomationEngine::tick`]. Each tick walks the
//! posting rules (enabled, posting window, daily cap, interval since the last
//! successful post) and, when all pass, posts the highest-scoring eligible
//! clip to every configured platform at once. Ticks never overlap.
//!
//! The engine owns the settings, the daily counter and the job ledger.
//! Callers only ever get snapshots.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::clips::{ClipStore, EligibleFilter, StoreError};
use crate::domain::jobs::{JobLedger, JobOrigin, JobStatus, PostingJob};
use crate::domain::settings::{AutomationSettings, SettingsError, SettingsPatch, SettingsStore};
use crate::models::{Clip, ClipStatus};
use crate::services::platforms::PlatformRegistry;

/// Wall clock, local time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Clip not found: {0}")]
    ClipNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Idle,
    Evaluating,
    Posting,
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Disabled,
    /// Another tick was still running
    Busy,
    OutsideWindow,
    DailyLimitReached,
    IntervalNotElapsed,
    NoEligibleClips,
    Posted(PostingJob),
    Failed(PostingJob),
    Error(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationStats {
    pub posts_today: usize,
    pub failed_today: usize,
    /// Percent of today's attempts that posted, rounded
    pub success_rate: u32,
    pub queue_size: usize,
    pub next_post_time: String,
    pub is_active: bool,
    pub phase: SchedulerPhase,
}

struct DailyCounter {
    date: Option<NaiveDate>,
    posts: u32,
}

impl DailyCounter {
    fn roll(&mut self, today: NaiveDate) {
        if self.date != Some(today) {
            self.date = Some(today);
            self.posts = 0;
        }
    }
}

struct Runner {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Collaborators injected into the engine
pub struct AutomationDeps {
    pub clips: Arc<dyn ClipStore>,
    pub platforms: PlatformRegistry,
    pub settings_store: Arc<dyn SettingsStore>,
    pub clock: Arc<dyn Clock>,
    pub tick_every: std::time::Duration,
    pub ledger_retention: usize,
}

pub struct AutomationEngine {
    clips: Arc<dyn ClipStore>,
    platforms: PlatformRegistry,
    settings_store: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    tick_every: std::time::Duration,
    settings: RwLock<AutomationSettings>,
    ledger: JobLedger,
    counter: Mutex<DailyCounter>,
    phase: Mutex<SchedulerPhase>,
    tick_guard: tokio::sync::Mutex<()>,
    runner: tokio::sync::Mutex<Option<Runner>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Highest score wins; ties go to the oldest clip, then to store order
pub fn pick_best(clips: Vec<Clip>) -> Option<Clip> {
    clips.into_iter().reduce(|best, clip| {
        let better = clip.virality_score > best.virality_score
            || (clip.virality_score == best.virality_score && clip.created_at < best.created_at);
        if better { clip } else { best }
    })
}

impl AutomationEngine {
    /// Load persisted settings and start the timer if automation is enabled
    pub async fn open(deps: AutomationDeps) -> Result<Arc<Self>, SettingsError> {
        let settings = deps.settings_store.load().await?.unwrap_or_default();

        let engine = Arc::new(Self {
            clips: deps.clips,
            platforms: deps.platforms,
            settings_store: deps.settings_store,
            clock: deps.clock,
            tick_every: deps.tick_every,
            settings: RwLock::new(settings),
            ledger: JobLedger::new(deps.ledger_retention),
            counter: Mutex::new(DailyCounter { date: None, posts: 0 }),
            phase: Mutex::new(SchedulerPhase::Idle),
            tick_guard: tokio::sync::Mutex::new(()),
            runner: tokio::sync::Mutex::new(None),
        });

        engine.start().await;
        Ok(engine)
    }

    /// Stop the timer, waiting for an in-flight tick to finish
    pub async fn close(&self) {
        self.stop().await;
    }

    pub fn settings(&self) -> AutomationSettings {
        self.settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn phase(&self) -> SchedulerPhase {
        *lock(&self.phase)
    }

    fn set_phase(&self, phase: SchedulerPhase) {
        *lock(&self.phase) = phase;
    }

    pub fn platforms(&self) -> &PlatformRegistry {
        &self.platforms
    }

    /// Validate, persist, apply, then start or stop the timer to match
    pub async fn update_settings(
        self: &Arc<Self>,
        patch: SettingsPatch,
    ) -> Result<AutomationSettings, SettingsError> {
        let next = self.settings().merged(patch);
        next.validate()?;
        self.settings_store.save(&next).await?;

        *self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = next.clone();

        if next.enabled {
            self.start().await;
        } else {
            self.stop().await;
        }

        Ok(next)
    }

    /// (Re)start the timer. Any previous timer is stopped first, so missed
    /// ticks never carry over.
    pub async fn start(self: &Arc<Self>) {
        let mut runner = self.runner.lock().await;
        if let Some(previous) = runner.take() {
            previous.cancel.cancel();
            let _ = previous.handle.await;
        }

        if !self.settings().enabled {
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(self).run_loop(cancel.clone()));
        *runner = Some(Runner { cancel, handle });

        info!(tick_secs = self.tick_every.as_secs(), "[automation] Automation started");
    }

    /// Stop the timer and wait until the loop has exited
    pub async fn stop(&self) {
        let previous = self.runner.lock().await.take();
        if let Some(runner) = previous {
            runner.cancel.cancel();
            if let Err(e) = runner.handle.await {
                error!("[automation] Scheduler task ended abnormally: {}", e);
            }
            info!("[automation] Automation stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.runner
            .lock()
            .await
            .as_ref()
            .is_some_and(|runner| !runner.handle.is_finished())
    }

    async fn run_loop(self: Arc<Self>, cancel: CancellationToken) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.tick_every, self.tick_every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let outcome = self.tick().await;
                    debug!(?outcome, "[automation] tick");
                }
            }
        }
    }

    /// Run one scheduling pass
    pub async fn tick(&self) -> TickOutcome {
        let Ok(_guard) = self.tick_guard.try_lock() else {
            warn!("[automation] Previous tick still running, skipping");
            return TickOutcome::Busy;
        };

        let settings = self.settings();
        if !settings.enabled {
            return TickOutcome::Disabled;
        }

        self.set_phase(SchedulerPhase::Evaluating);
        let outcome = self.evaluate(&settings).await;
        self.set_phase(SchedulerPhase::Idle);
        outcome
    }

    async fn evaluate(&self, settings: &AutomationSettings) -> TickOutcome {
        let now = self.clock.now();
        let posts_today = {
            let mut counter = lock(&self.counter);
            counter.roll(now.date_naive());
            counter.posts
        };

        let time_of_day = now.format("%H:%M").to_string();
        if !settings.posting_hours.contains(&time_of_day) {
            return TickOutcome::OutsideWindow;
        }

        if posts_today >= settings.max_posts_per_day {
            return TickOutcome::DailyLimitReached;
        }

        if let Some(last) = self.ledger.last_posted_at() {
            let since_last = now.with_timezone(&Utc) - last;
            if since_last < Duration::minutes(i64::from(settings.posting_interval)) {
                return TickOutcome::IntervalNotElapsed;
            }
        }

        let clip = match self.next_clip(settings.min_virality_score).await {
            Ok(Some(clip)) => clip,
            Ok(None) => {
                debug!("[automation] No eligible clips found for posting");
                return TickOutcome::NoEligibleClips;
            }
            Err(e) => {
                error!("[automation] Error in automated posting: {}", e);
                return TickOutcome::Error(e.to_string());
            }
        };

        let job = PostingJob::new(
            &clip.id,
            settings.platforms.clone(),
            JobOrigin::Automatic,
            now.with_timezone(&Utc),
        );
        self.ledger.append(job.clone());

        self.set_phase(SchedulerPhase::Posting);
        let job = self.execute(job, &clip).await;
        match job.status {
            JobStatus::Posted => TickOutcome::Posted(job),
            _ => TickOutcome::Failed(job),
        }
    }

    /// Clips already posted or with a job in flight are never picked
    fn eligible_filter(&self, min_virality_score: f64) -> EligibleFilter {
        let mut exclude_ids = self.ledger.posted_clip_ids();
        exclude_ids.extend(self.ledger.in_flight_clip_ids());
        EligibleFilter {
            min_virality_score,
            exclude_ids,
        }
    }

    async fn next_clip(&self, min_virality_score: f64) -> Result<Option<Clip>, StoreError> {
        let eligible = self
            .clips
            .list_eligible(&self.eligible_filter(min_virality_score))
            .await?;
        Ok(pick_best(eligible))
    }

    /// Post to every platform of the job concurrently. All must succeed; a
    /// fast failure does not cut the other calls short.
    async fn execute(&self, mut job: PostingJob, clip: &Clip) -> PostingJob {
        job.attempts += 1;

        let outcome = if job.platforms.is_empty() {
            Err("No platforms selected".to_string())
        } else {
            let results = join_all(job.platforms.iter().map(|platform| async move {
                (platform.as_str(), self.platforms.post(platform, clip).await)
            }))
            .await;

            let failures: Vec<String> = results
                .into_iter()
                .filter_map(|(platform, result)| {
                    result.err().map(|e| {
                        warn!(job_id = %job.id, platform, "[automation] Platform post failed: {}", e);
                        format!("{platform}: {e}")
                    })
                })
                .collect();

            if failures.is_empty() {
                Ok(())
            } else {
                Err(format!("Some platforms failed to post ({})", failures.join("; ")))
            }
        };

        match outcome {
            Ok(()) => {
                job.status = JobStatus::Posted;
                {
                    let mut counter = lock(&self.counter);
                    counter.roll(self.clock.now().date_naive());
                    counter.posts += 1;
                }

                if let Err(e) = self
                    .clips
                    .update_status(&clip.id, ClipStatus::Posted, &job.platforms)
                    .await
                {
                    error!(clip_id = %clip.id, "[automation] Posted but failed to update clip: {}", e);
                }

                info!(
                    job_id = %job.id,
                    "[automation] Successfully posted clip \"{}\" to {}",
                    clip.title,
                    job.platforms.join(", ")
                );
            }
            Err(message) => {
                job.status = JobStatus::Failed;
                error!(job_id = %job.id, clip_id = %clip.id, "[automation] Posting job failed: {}", message);
                job.error_message = Some(message);
            }
        }

        self.ledger
            .resolve(&job.id, job.status, job.attempts, job.error_message.clone());
        job
    }

    /// Post a clip right away, outside the scheduling rules. The attempt is
    /// still recorded in the ledger.
    pub async fn post_clip_now(
        &self,
        clip_id: &str,
        platforms: Vec<String>,
    ) -> Result<PostingJob, AutomationError> {
        let clip = self
            .clips
            .get(clip_id)
            .await?
            .ok_or_else(|| AutomationError::ClipNotFound(clip_id.to_string()))?;

        let job = PostingJob::new(
            &clip.id,
            platforms,
            JobOrigin::Manual,
            self.clock.now().with_timezone(&Utc),
        );
        self.ledger.append(job.clone());

        Ok(self.execute(job, &clip).await)
    }

    pub fn recent_jobs(&self, limit: usize) -> Vec<PostingJob> {
        self.ledger.recent(limit)
    }

    pub fn job(&self, job_id: &str) -> Option<PostingJob> {
        self.ledger.get(job_id)
    }

    pub async fn stats(&self) -> AutomationStats {
        let settings = self.settings();
        let now = self.clock.now();

        let today = self.ledger.on_date(now.date_naive(), &now.timezone());
        let posts_today = today.iter().filter(|j| j.status == JobStatus::Posted).count();
        let failed_today = today.iter().filter(|j| j.status == JobStatus::Failed).count();
        let success_rate = if today.is_empty() {
            0
        } else {
            (posts_today as f64 / today.len() as f64 * 100.0).round() as u32
        };

        let queue_size = match self
            .clips
            .list_eligible(&self.eligible_filter(settings.min_virality_score))
            .await
        {
            Ok(clips) => clips.len(),
            Err(e) => {
                warn!("[automation] Could not size posting queue: {}", e);
                0
            }
        };

        let next_post_time = if settings.enabled {
            (now + Duration::minutes(i64::from(settings.posting_interval)))
                .format("%H:%M")
                .to_string()
        } else {
            "Paused".to_string()
        };

        AutomationStats {
            posts_today,
            failed_today,
            success_rate,
            queue_size,
            next_post_time,
            is_active: settings.enabled && self.is_running().await,
            phase: self.phase(),
        }
    }

    /// Check that a platform is reachable
    pub async fn test_platform(&self, platform: &str) -> bool {
        info!("[automation] Testing connection to {}...", platform);
        match self.platforms.test_connection(platform).await {
            Ok(()) => true,
            Err(e) => {
                warn!("[automation] Connection test for {} failed: {}", platform, e);
                false
            }
        }
    }
}
