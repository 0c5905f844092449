//! The job registry: the concurrency-safe map of live cron jobs.
//!
//! All mutations are keyed by [`JobId`]. Validation happens before any
//! state changes, so a failed `add_job` leaves no trace. The map lock
//! is a plain `std` `RwLock` and is never held across an await; engine
//! calls happen before insertion or after removal.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::SchedulerError;
use crate::job::{
    AckStatus, CompletionHook, JobAck, JobAction, JobId, JobState, JobStatus, RunStats,
};
use crate::overlap::{OverlapGuard, OverlapPolicy};
use crate::schedule::JobSchedule;
use crate::timer::{TimerHandle, TimerPool};

/// Everything the registry tracks per live job.
struct JobEntry {
    schedule: JobSchedule,
    handle: TimerHandle,
    guard: Arc<OverlapGuard>,
    stats: Arc<RunStats>,
    added_at: DateTime<Utc>,
}

/// Registry of cron jobs sharing one timer engine.
///
/// Clone-free by design; hosts wrap it in an `Arc` and call methods
/// concurrently from any task.
pub struct JobRegistry {
    config: RegistryConfig,
    pool: TimerPool,
    jobs: RwLock<HashMap<JobId, JobEntry>>,
}

impl JobRegistry {
    /// Build a registry and start its timer engine.
    ///
    /// # Errors
    ///
    /// `SchedulerError::InvalidTimezone` if the configured default
    /// timezone does not parse, `SchedulerError::Engine` if the engine
    /// fails to start.
    pub async fn new(config: RegistryConfig) -> Result<Self, SchedulerError> {
        config.parse_timezone()?;
        let pool = TimerPool::new().await?;
        info!(
            default_timezone = %config.default_timezone,
            "job registry started"
        );
        Ok(Self {
            config,
            pool,
            jobs: RwLock::new(HashMap::new()),
        })
    }

    /// Registry defaults and shutdown tuning.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a new job with the default overlap policy.
    ///
    /// The job starts firing immediately on its schedule. `timezone`
    /// falls back to the registry's configured default when `None`.
    ///
    /// # Errors
    ///
    /// `InvalidSchedule` or `InvalidTimezone` if validation fails;
    /// nothing is registered in that case.
    pub async fn add_job(
        &self,
        expression: &str,
        timezone: Option<&str>,
        action: JobAction,
        on_complete: Option<CompletionHook>,
    ) -> Result<JobAck, SchedulerError> {
        self.add_job_with_policy(expression, timezone, action, on_complete, OverlapPolicy::Skip)
            .await
    }

    /// Register a new job with an explicit overlap policy.
    pub async fn add_job_with_policy(
        &self,
        expression: &str,
        timezone: Option<&str>,
        action: JobAction,
        on_complete: Option<CompletionHook>,
        policy: OverlapPolicy,
    ) -> Result<JobAck, SchedulerError> {
        let tz_name = timezone.unwrap_or(&self.config.default_timezone);
        let schedule = JobSchedule::parse(expression, Some(tz_name))?;

        let id = JobId::new();
        let guard = Arc::new(OverlapGuard::new(policy));
        let stats = Arc::new(RunStats::default());

        let handle = self
            .pool
            .schedule(
                id,
                &schedule,
                action,
                on_complete,
                guard.clone(),
                stats.clone(),
                true,
            )
            .await?;

        let entry = JobEntry {
            schedule,
            handle,
            guard,
            stats,
            added_at: Utc::now(),
        };
        self.jobs
            .write()
            .expect("job map lock poisoned")
            .insert(id, entry);

        info!(job_id = %id, expression, timezone = tz_name, "job added");
        Ok(JobAck {
            id,
            status: AckStatus::Added,
        })
    }

    /// Suppress firings for a job. Idempotent; stopping a stopped job
    /// acknowledges again without error.
    ///
    /// # Errors
    ///
    /// `JobNotFound` if the identifier is unknown or already closed.
    pub fn stop_job(&self, id: JobId) -> Result<JobAck, SchedulerError> {
        let jobs = self.jobs.read().expect("job map lock poisoned");
        let entry = jobs.get(&id).ok_or(SchedulerError::JobNotFound(id))?;
        entry.handle.stop();
        debug!(job_id = %id, "job stopped");
        Ok(JobAck {
            id,
            status: AckStatus::Stopped,
        })
    }

    /// Resume firings for a job. Idempotent. The existing timer keeps
    /// its schedule; nothing is re-parsed.
    ///
    /// # Errors
    ///
    /// `JobNotFound` if the identifier is unknown or already closed.
    pub fn start_job(&self, id: JobId) -> Result<JobAck, SchedulerError> {
        let jobs = self.jobs.read().expect("job map lock poisoned");
        let entry = jobs.get(&id).ok_or(SchedulerError::JobNotFound(id))?;
        entry.handle.start();
        debug!(job_id = %id, "job started");
        Ok(JobAck {
            id,
            status: AckStatus::Started,
        })
    }

    /// Permanently remove a job. Its identifier is invalid from the
    /// moment this returns; the timer entry is torn down best-effort.
    ///
    /// # Errors
    ///
    /// `JobNotFound` if the identifier is unknown or already closed.
    pub async fn close_job(&self, id: JobId) -> Result<JobAck, SchedulerError> {
        let entry = self
            .jobs
            .write()
            .expect("job map lock poisoned")
            .remove(&id)
            .ok_or(SchedulerError::JobNotFound(id))?;

        // The id is gone from the map already; an engine fault here
        // must not resurrect it.
        if let Err(e) = self.pool.unschedule(&entry.handle).await {
            warn!(job_id = %id, error = %e, "timer removal failed during close");
        }
        info!(job_id = %id, "job closed");
        Ok(JobAck {
            id,
            status: AckStatus::Closed,
        })
    }

    /// Shut down the whole registry: every job is removed, in-flight
    /// actions get a grace period, then the engine stops.
    ///
    /// Never fails. Safe to call more than once; a second call finds an
    /// empty map and an already-stopped engine.
    pub async fn close(&self) {
        let entries: Vec<(JobId, JobEntry)> = self
            .jobs
            .write()
            .expect("job map lock poisoned")
            .drain()
            .collect();

        info!(jobs = entries.len(), "registry closing");
        for (_, entry) in &entries {
            entry.handle.stop();
        }
        self.pool.cancel();

        // Give running actions a chance to observe cancellation.
        let deadline = Instant::now() + Duration::from_secs(self.config.shutdown_timeout_secs);
        while entries.iter().any(|(_, e)| e.guard.is_running()) {
            if Instant::now() >= deadline {
                warn!("shutdown grace period elapsed with actions still running");
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        for (id, entry) in &entries {
            if let Err(e) = self.pool.unschedule(&entry.handle).await {
                warn!(job_id = %id, error = %e, "timer removal failed during registry close");
            }
        }
        self.pool.shutdown().await;
        info!("registry closed");
    }

    /// Snapshot one job.
    ///
    /// # Errors
    ///
    /// `JobNotFound` if the identifier is unknown or already closed.
    pub fn status(&self, id: JobId) -> Result<JobStatus, SchedulerError> {
        let jobs = self.jobs.read().expect("job map lock poisoned");
        let entry = jobs.get(&id).ok_or(SchedulerError::JobNotFound(id))?;
        Ok(Self::snapshot(id, entry))
    }

    /// Snapshot every live job, in no particular order.
    pub fn all_statuses(&self) -> Vec<JobStatus> {
        let jobs = self.jobs.read().expect("job map lock poisoned");
        jobs.iter()
            .map(|(id, entry)| Self::snapshot(*id, entry))
            .collect()
    }

    /// Number of live jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.read().expect("job map lock poisoned").len()
    }

    /// Whether an identifier refers to a live job.
    pub fn contains(&self, id: JobId) -> bool {
        self.jobs
            .read()
            .expect("job map lock poisoned")
            .contains_key(&id)
    }

    fn snapshot(id: JobId, entry: &JobEntry) -> JobStatus {
        JobStatus {
            id,
            state: if entry.handle.is_firing() {
                JobState::Running
            } else {
                JobState::Stopped
            },
            schedule: entry.schedule.expression().to_string(),
            timezone: entry.schedule.timezone_name().to_string(),
            overlap_policy: entry.guard.policy(),
            fired: entry.stats.fired(),
            completed: entry.stats.completed(),
            skipped: entry.stats.skipped(),
            running_now: entry.guard.is_running(),
            added_at: entry.added_at,
        }
    }
}
