//! Cron schedule parsing and validation.
//!
//! A [`JobSchedule`] is validated exactly once, when the job is added;
//! the registry never re-parses or edits a schedule for a live job.
//! Changing a job's schedule means closing it and adding a new one.

use chrono_tz::Tz;
use tokio_cron_scheduler::Job;

use crate::SchedulerError;

/// Validate a cron expression without scheduling anything.
///
/// Accepts the expression syntax of the underlying timer engine
/// (seconds-resolution cron, e.g. `*/5 * * * * *` for every five
/// seconds).
///
/// # Errors
///
/// Returns `SchedulerError::InvalidSchedule` if the expression does not
/// parse.
pub fn validate_cron_expression(expr: &str) -> Result<(), SchedulerError> {
    // A throwaway job is the engine's own parse entry point.
    Job::new_async(expr, |_timer_id, _engine| Box::pin(async {}))
        .map(|_| ())
        .map_err(|e| SchedulerError::InvalidSchedule(format!("'{expr}': {e}")))
}

/// Parse an IANA timezone identifier.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidTimezone` for unrecognized names.
pub fn parse_timezone(name: &str) -> Result<Tz, SchedulerError> {
    name.parse::<Tz>()
        .map_err(|_| SchedulerError::InvalidTimezone(name.to_string()))
}

/// A validated cron expression bound to a timezone.
#[derive(Debug, Clone)]
pub struct JobSchedule {
    expression: String,
    timezone: Tz,
}

impl JobSchedule {
    /// Validate `expression` and `timezone` and build a schedule.
    ///
    /// A missing timezone falls back to UTC; the registry substitutes
    /// its configured default before calling this.
    ///
    /// # Errors
    ///
    /// `SchedulerError::InvalidTimezone` if the timezone is unknown,
    /// `SchedulerError::InvalidSchedule` if the expression is malformed.
    /// Both are detected before any timer state exists.
    pub fn parse(expression: &str, timezone: Option<&str>) -> Result<Self, SchedulerError> {
        let timezone = match timezone {
            Some(name) => parse_timezone(name)?,
            None => chrono_tz::UTC,
        };
        validate_cron_expression(expression)?;
        Ok(Self {
            expression: expression.to_string(),
            timezone,
        })
    }

    /// The cron expression, exactly as supplied by the caller.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The timezone the schedule is evaluated in.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// IANA name of the schedule's timezone.
    pub fn timezone_name(&self) -> &'static str {
        self.timezone.name()
    }
}
