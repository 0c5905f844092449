//! Cron job scheduling with per-job lifecycle control.
//!
//! The crate centers on [`JobRegistry`], a concurrency-safe collection
//! of cron jobs sharing one timer engine. Each job is a cron expression
//! plus an async action; once added it can be stopped, restarted, and
//! closed independently, and the whole registry can be shut down in one
//! call.
//!
//! ```no_run
//! use cron_scheduler::{job_action, JobRegistry, RegistryConfig};
//!
//! # async fn example() -> Result<(), cron_scheduler::SchedulerError> {
//! let registry = JobRegistry::new(RegistryConfig::default()).await?;
//!
//! let ack = registry
//!     .add_job(
//!         "0 */10 * * * *",
//!         Some("America/New_York"),
//!         job_action(|ctx| async move {
//!             tracing::info!(job_id = %ctx.job_id, "tick");
//!         }),
//!         None,
//!     )
//!     .await?;
//!
//! registry.stop_job(ack.id)?;
//! registry.start_job(ack.id)?;
//! registry.close_job(ack.id).await?;
//! registry.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod job;
pub mod overlap;
pub mod registry;
pub mod schedule;
pub mod timer;

pub use config::RegistryConfig;
pub use error::SchedulerError;
pub use job::{
    completion_hook, job_action, AckStatus, CallbackFuture, CompletionHook, FireContext, JobAck,
    JobAction, JobId, JobState, JobStatus, RunStats,
};
pub use overlap::{OverlapGuard, OverlapPolicy};
pub use registry::JobRegistry;
pub use schedule::{parse_timezone, validate_cron_expression, JobSchedule};
pub use timer::{TimerHandle, TimerPool};
