//! Job identity, state, and the callback types a job carries.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::overlap::OverlapPolicy;

/// Opaque identifier for a registered job.
///
/// Generated by the registry on `add_job`; never reused, even after the
/// job is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a registered job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Timer is live and firings execute the action.
    Running,

    /// Timer is live but firings are suppressed.
    Stopped,
}

/// Context passed to the job action on every firing.
#[derive(Debug, Clone)]
pub struct FireContext {
    /// The job being fired.
    pub job_id: JobId,

    /// Wall-clock instant the firing began.
    pub fired_at: DateTime<Utc>,

    /// Cancelled when the registry is closing; long-running actions
    /// should poll it and wind down.
    pub cancel: CancellationToken,
}

/// Boxed future produced by a job action or completion hook.
pub type CallbackFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// The work a job performs on each firing.
pub type JobAction = Arc<dyn Fn(FireContext) -> CallbackFuture + Send + Sync>;

/// Optional callback invoked after each successful firing of the
/// action.
pub type CompletionHook = Arc<dyn Fn(FireContext) -> CallbackFuture + Send + Sync>;

/// Wrap an async closure as a [`JobAction`].
pub fn job_action<F, Fut>(f: F) -> JobAction
where
    F: Fn(FireContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Wrap an async closure as a [`CompletionHook`].
pub fn completion_hook<F, Fut>(f: F) -> CompletionHook
where
    F: Fn(FireContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Status word reported in a [`JobAck`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Added,
    Stopped,
    Started,
    Closed,
}

/// Acknowledgement payload returned by registry mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAck {
    /// Identifier of the job the operation touched.
    pub id: JobId,

    /// What the operation did.
    pub status: AckStatus,
}

/// Per-job firing counters.
///
/// Updated from the timer closure with relaxed atomics; snapshots may
/// trail an in-progress firing by one count.
#[derive(Debug, Default)]
pub struct RunStats {
    fired: AtomicU64,
    completed: AtomicU64,
    skipped: AtomicU64,
}

impl RunStats {
    pub fn record_fired(&self) {
        self.fired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// Point-in-time snapshot of one job, for observability.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub id: JobId,
    pub state: JobState,
    pub schedule: String,
    pub timezone: String,
    pub overlap_policy: OverlapPolicy,
    pub fired: u64,
    pub completed: u64,
    pub skipped: u64,
    /// Whether an action is executing right now.
    pub running_now: bool,
    pub added_at: DateTime<Utc>,
}
