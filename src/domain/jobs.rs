//! Posting job ledger
//!
//! Every posting attempt, automatic or manual, is appended here. The ledger
//! drives throttling (last successful post, clips already posted) and the
//! reporting endpoints. Entries are only ever appended or resolved; the
//! oldest are dropped once the retention cap is exceeded.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Posted,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobOrigin {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingJob {
    pub id: String,
    pub clip_id: String,
    pub platforms: Vec<String>,
    pub scheduled_time: DateTime<Utc>,
    pub status: JobStatus,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub origin: JobOrigin,
    pub created_at: DateTime<Utc>,
}

impl PostingJob {
    pub fn new(clip_id: &str, platforms: Vec<String>, origin: JobOrigin, now: DateTime<Utc>) -> Self {
        let prefix = match origin {
            JobOrigin::Automatic => "job",
            JobOrigin::Manual => "manual",
        };
        Self {
            id: format!("{}_{}", prefix, Uuid::new_v4().simple()),
            clip_id: clip_id.to_string(),
            platforms,
            scheduled_time: now,
            status: JobStatus::Pending,
            attempts: 0,
            error_message: None,
            origin,
            created_at: now,
        }
    }
}

/// Append-only record of posting attempts
pub struct JobLedger {
    retention: usize,
    jobs: Mutex<VecDeque<PostingJob>>,
}

impl JobLedger {
    pub fn new(retention: usize) -> Self {
        Self {
            retention: retention.max(1),
            jobs: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<PostingJob>> {
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Past the retention cap the oldest resolved jobs are dropped. Pending
    /// jobs are never evicted, so their outcome always lands.
    pub fn append(&self, job: PostingJob) {
        let mut jobs = self.lock();
        jobs.push_back(job);
        while jobs.len() > self.retention {
            match jobs.iter().position(|j| j.status != JobStatus::Pending) {
                Some(oldest_resolved) => {
                    jobs.remove(oldest_resolved);
                }
                None => break,
            }
        }
    }

    /// Record the outcome of an attempt. Clip and platforms are fixed at
    /// creation, so only status, attempts and error change.
    pub fn resolve(&self, job_id: &str, status: JobStatus, attempts: u32, error: Option<String>) {
        let mut jobs = self.lock();
        if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
            job.status = status;
            job.attempts = attempts;
            job.error_message = error;
        }
    }

    pub fn get(&self, job_id: &str) -> Option<PostingJob> {
        self.lock().iter().find(|j| j.id == job_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Scheduled time of the most recent successful job
    pub fn last_posted_at(&self) -> Option<DateTime<Utc>> {
        self.lock()
            .iter()
            .filter(|j| j.status == JobStatus::Posted)
            .map(|j| j.scheduled_time)
            .max()
    }

    /// Clips that already have a successful job
    pub fn posted_clip_ids(&self) -> HashSet<String> {
        self.lock()
            .iter()
            .filter(|j| j.status == JobStatus::Posted)
            .map(|j| j.clip_id.clone())
            .collect()
    }

    /// Clips with a job still in flight
    pub fn in_flight_clip_ids(&self) -> HashSet<String> {
        self.lock()
            .iter()
            .filter(|j| j.status == JobStatus::Pending)
            .map(|j| j.clip_id.clone())
            .collect()
    }

    /// Newest first by scheduled time
    pub fn recent(&self, limit: usize) -> Vec<PostingJob> {
        let mut jobs: Vec<PostingJob> = self.lock().iter().cloned().collect();
        jobs.sort_by(|a, b| b.scheduled_time.cmp(&a.scheduled_time));
        jobs.truncate(limit);
        jobs
    }

    /// Jobs scheduled on the given calendar date in `tz`
    pub fn on_date<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> Vec<PostingJob> {
        self.lock()
            .iter()
            .filter(|j| j.scheduled_time.with_timezone(tz).date_naive() == date)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn job(clip_id: &str, at: DateTime<Utc>) -> PostingJob {
        PostingJob::new(clip_id, vec!["TikTok".into()], JobOrigin::Automatic, at)
    }

    #[test]
    fn new_job_is_pending_with_no_attempts() {
        let job = job("clip_1", Utc::now());
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 0);
        assert!(job.error_message.is_none());
        assert!(job.id.starts_with("job_"));

        let manual = PostingJob::new("clip_1", vec![], JobOrigin::Manual, Utc::now());
        assert!(manual.id.starts_with("manual_"));
    }

    #[test]
    fn last_posted_ignores_failed_and_pending() {
        let ledger = JobLedger::new(100);
        let now = Utc::now();

        let posted = job("a", now - Duration::minutes(30));
        let failed = job("b", now - Duration::minutes(5));
        let pending = job("c", now);
        let posted_id = posted.id.clone();
        let failed_id = failed.id.clone();

        ledger.append(posted);
        ledger.append(failed);
        ledger.append(pending);
        ledger.resolve(&posted_id, JobStatus::Posted, 1, None);
        ledger.resolve(&failed_id, JobStatus::Failed, 1, Some("boom".into()));

        assert_eq!(ledger.last_posted_at(), Some(now - Duration::minutes(30)));
        assert_eq!(ledger.posted_clip_ids(), HashSet::from(["a".to_string()]));
        assert_eq!(ledger.get(&failed_id).unwrap().error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let ledger = JobLedger::new(100);
        let now = Utc::now();
        for i in 0..5 {
            ledger.append(job(&format!("clip_{i}"), now + Duration::minutes(i)));
        }

        let recent = ledger.recent(3);
        let clips: Vec<_> = recent.iter().map(|j| j.clip_id.as_str()).collect();
        assert_eq!(clips, vec!["clip_4", "clip_3", "clip_2"]);
    }

    fn resolved(clip_id: &str, at: DateTime<Utc>, status: JobStatus) -> PostingJob {
        let mut job = job(clip_id, at);
        job.status = status;
        job.attempts = 1;
        job
    }

    #[test]
    fn retention_drops_oldest_resolved() {
        let ledger = JobLedger::new(2);
        let now = Utc::now();
        ledger.append(resolved("a", now, JobStatus::Posted));
        ledger.append(resolved("b", now, JobStatus::Failed));
        ledger.append(resolved("c", now, JobStatus::Posted));

        assert_eq!(ledger.len(), 2);
        let clips: HashSet<_> = ledger.recent(10).into_iter().map(|j| j.clip_id).collect();
        assert_eq!(clips, HashSet::from(["b".to_string(), "c".to_string()]));
    }

    #[test]
    fn retention_keeps_pending_jobs_until_resolved() {
        let ledger = JobLedger::new(2);
        let now = Utc::now();
        let pending = job("slow", now);
        let pending_id = pending.id.clone();

        ledger.append(pending);
        ledger.append(resolved("b", now, JobStatus::Failed));
        ledger.append(resolved("c", now, JobStatus::Failed));

        assert_eq!(ledger.len(), 2);
        assert!(ledger.get(&pending_id).is_some());
        assert_eq!(ledger.in_flight_clip_ids(), HashSet::from(["slow".to_string()]));

        ledger.resolve(&pending_id, JobStatus::Posted, 1, None);
        assert_eq!(ledger.posted_clip_ids(), HashSet::from(["slow".to_string()]));
        assert_eq!(ledger.last_posted_at(), Some(now));
        assert!(ledger.in_flight_clip_ids().is_empty());
    }

    #[test]
    fn retention_overflows_while_everything_is_pending() {
        let ledger = JobLedger::new(1);
        let now = Utc::now();
        ledger.append(job("a", now));
        ledger.append(job("b", now));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn on_date_groups_by_calendar_day() {
        let ledger = JobLedger::new(100);
        let day = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        ledger.append(job("a", day));
        ledger.append(job("b", day + Duration::days(1)));

        let today = ledger.on_date(day.date_naive(), &Utc);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].clip_id, "a");
    }
}
