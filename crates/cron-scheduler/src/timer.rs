//! Timer pool: the bridge between the registry and the cron engine.
//!
//! One [`TimerPool`] wraps one `tokio-cron-scheduler` engine shared by
//! every job in a registry. Each scheduled job gets a [`TimerHandle`]
//! whose firing gate toggles execution without touching the engine;
//! the underlying timer keeps ticking while a job is stopped, and
//! stopped ticks are simply ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::SchedulerError;
use crate::job::{CompletionHook, FireContext, JobAction, JobId, RunStats};
use crate::overlap::OverlapGuard;
use crate::schedule::JobSchedule;

/// Handle to one scheduled timer.
///
/// `stop` and `start` flip the firing gate read by the timer closure;
/// the engine entry itself is created once and removed only when the
/// job is closed.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    timer_id: Uuid,
    firing: Arc<AtomicBool>,
}

impl TimerHandle {
    /// Suppress future firings. Idempotent.
    pub fn stop(&self) {
        self.firing.store(false, Ordering::SeqCst);
    }

    /// Resume firings. Idempotent.
    pub fn start(&self) {
        self.firing.store(true, Ordering::SeqCst);
    }

    /// Whether firings currently execute the action.
    pub fn is_firing(&self) -> bool {
        self.firing.load(Ordering::SeqCst)
    }

    /// Identifier of the engine-level timer entry.
    pub fn timer_id(&self) -> Uuid {
        self.timer_id
    }
}

/// Shared cron engine plus the registry-wide cancellation token.
pub struct TimerPool {
    engine: JobScheduler,
    cancel: CancellationToken,
}

impl TimerPool {
    /// Create the engine and start its tick loop.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Engine` if the engine fails to
    /// initialize or start.
    pub async fn new() -> Result<Self, SchedulerError> {
        let engine = JobScheduler::new().await?;
        engine.start().await?;
        Ok(Self {
            engine,
            cancel: CancellationToken::new(),
        })
    }

    /// Token cancelled when the pool shuts down. Cloned into every
    /// [`FireContext`] so actions can observe shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Register a timer for `job_id` and return its handle.
    ///
    /// The timer begins ticking immediately; whether ticks execute the
    /// action is controlled by `auto_start` and the handle's gate.
    #[allow(clippy::too_many_arguments)]
    pub async fn schedule(
        &self,
        job_id: JobId,
        schedule: &JobSchedule,
        action: JobAction,
        on_complete: Option<CompletionHook>,
        guard: Arc<OverlapGuard>,
        stats: Arc<RunStats>,
        auto_start: bool,
    ) -> Result<TimerHandle, SchedulerError> {
        let firing = Arc::new(AtomicBool::new(auto_start));
        let gate = firing.clone();
        let cancel = self.cancel.clone();

        let job = Job::new_async_tz(
            schedule.expression(),
            schedule.timezone(),
            move |_timer_id, _engine| {
                let gate = gate.clone();
                let cancel = cancel.clone();
                let guard = guard.clone();
                let stats = stats.clone();
                let action = action.clone();
                let on_complete = on_complete.clone();
                Box::pin(async move {
                    if cancel.is_cancelled() || !gate.load(Ordering::SeqCst) {
                        return;
                    }
                    let Some(permit) = guard.try_acquire() else {
                        debug!(job_id = %job_id, "previous firing still running, skipping");
                        stats.record_skipped();
                        return;
                    };
                    stats.record_fired();
                    let ctx = FireContext {
                        job_id,
                        fired_at: Utc::now(),
                        cancel,
                    };
                    action(ctx.clone()).await;
                    if let Some(hook) = on_complete {
                        hook(ctx).await;
                    }
                    stats.record_completed();
                    drop(permit);
                })
            },
        )
        .map_err(|e| {
            SchedulerError::InvalidSchedule(format!("'{}': {e}", schedule.expression()))
        })?;

        let timer_id = self.engine.add(job).await?;
        debug!(
            job_id = %job_id,
            timer_id = %timer_id,
            expression = schedule.expression(),
            timezone = schedule.timezone_name(),
            auto_start,
            "timer scheduled"
        );
        Ok(TimerHandle { timer_id, firing })
    }

    /// Remove a timer from the engine. The handle is dead afterwards.
    pub async fn unschedule(&self, handle: &TimerHandle) -> Result<(), SchedulerError> {
        handle.stop();
        self.engine.remove(&handle.timer_id).await?;
        Ok(())
    }

    /// Signal every in-flight action that shutdown has begun.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop the engine's tick loop. Faults are logged, not raised;
    /// shutdown proceeds regardless.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let mut engine = self.engine.clone();
        if let Err(e) = engine.shutdown().await {
            warn!(error = %e, "timer engine shutdown reported an error");
        }
    }
}
