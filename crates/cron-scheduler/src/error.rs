//! Error types for the cron-scheduler crate.
//!
//! All registry operations return value-level errors; nothing in the
//! library panics on bad caller input.

use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

use crate::job::JobId;

/// Errors that can occur during registry and timer operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Cron expression failed to parse.
    ///
    /// Raised by `add_job` before any state is mutated; no partial job
    /// is ever registered.
    #[error("invalid cron schedule: {0}")]
    InvalidSchedule(String),

    /// Timezone is not a recognized IANA identifier.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    /// No live job with this identifier exists in the registry.
    ///
    /// Also returned for identifiers that once existed but were closed;
    /// a closed identifier is never valid again.
    #[error("invalid cron job {0}")]
    JobNotFound(JobId),

    /// Fault reported by the underlying timer engine.
    #[error("timer engine error: {0}")]
    Engine(String),
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        SchedulerError::Engine(err.to_string())
    }
}
