//! Dispatch surface mapping scheduler commands onto a
//! [`cron_scheduler::JobRegistry`].
//!
//! Transport-agnostic: hosts decode their own wire format into
//! [`CronRequest`] values and serialize the resulting [`CronResponse`]
//! back out.

pub mod service;

pub use service::{CronRequest, CronResponse, CronService, EmptyPayload, ROLE};
