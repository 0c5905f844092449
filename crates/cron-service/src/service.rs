//! Command dispatch over a [`JobRegistry`].
//!
//! Hosts that expose the scheduler behind a message bus or RPC layer
//! decode their wire format into a [`CronRequest`] and hand it to
//! [`CronService::dispatch`]. Every request resolves to a
//! [`CronResponse`] or a [`SchedulerError`]; the service itself holds
//! no state beyond the shared registry.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use cron_scheduler::{
    CompletionHook, JobAck, JobAction, JobId, JobRegistry, SchedulerError,
};

/// Role name under which the service registers its commands.
pub const ROLE: &str = "cron";

/// A decoded scheduler command.
///
/// `AddJob` carries the job callbacks directly; they are host-side
/// closures, not wire data, so the request type is not deserializable
/// as a whole.
pub enum CronRequest {
    /// Register a job: cron expression, optional timezone, the action,
    /// and an optional per-firing completion hook.
    AddJob {
        time: String,
        timezone: Option<String>,
        act: JobAction,
        after: Option<CompletionHook>,
    },

    /// Suppress firings of an existing job.
    StopJob { id: JobId },

    /// Resume firings of an existing job.
    StartJob { id: JobId },

    /// Permanently remove a job.
    CloseJob { id: JobId },

    /// Shut the whole registry down.
    Close,
}

impl CronRequest {
    /// Command verb, as hosts name it on the wire.
    pub fn cmd(&self) -> &'static str {
        match self {
            CronRequest::AddJob { .. } => "addjob",
            CronRequest::StopJob { .. } => "stopjob",
            CronRequest::StartJob { .. } => "startjob",
            CronRequest::CloseJob { .. } => "closejob",
            CronRequest::Close => "close",
        }
    }
}

/// Payload of a successful dispatch.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CronResponse {
    /// Job-level operations acknowledge with the job id and what
    /// happened to it.
    Ack(JobAck),

    /// `close` has no payload.
    Empty(EmptyPayload),
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Serialize)]
pub struct EmptyPayload {}

/// Stateless dispatcher over a shared registry.
#[derive(Clone)]
pub struct CronService {
    registry: Arc<JobRegistry>,
}

impl CronService {
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self { registry }
    }

    /// The underlying registry, for hosts that need direct access.
    pub fn registry(&self) -> Arc<JobRegistry> {
        self.registry.clone()
    }

    /// Execute one command against the registry.
    ///
    /// # Errors
    ///
    /// Propagates the registry's validation and lookup errors
    /// unchanged. `Close` never fails.
    pub async fn dispatch(&self, request: CronRequest) -> Result<CronResponse, SchedulerError> {
        let cmd = request.cmd();
        debug!(role = ROLE, cmd, "dispatching");
        match request {
            CronRequest::AddJob {
                time,
                timezone,
                act,
                after,
            } => {
                let ack = self
                    .registry
                    .add_job(&time, timezone.as_deref(), act, after)
                    .await?;
                Ok(CronResponse::Ack(ack))
            }
            CronRequest::StopJob { id } => Ok(CronResponse::Ack(self.registry.stop_job(id)?)),
            CronRequest::StartJob { id } => Ok(CronResponse::Ack(self.registry.start_job(id)?)),
            CronRequest::CloseJob { id } => {
                Ok(CronResponse::Ack(self.registry.close_job(id).await?))
            }
            CronRequest::Close => {
                self.registry.close().await;
                Ok(CronResponse::Empty(EmptyPayload {}))
            }
        }
    }
}
