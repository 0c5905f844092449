//! End-to-end test infrastructure for the cron scheduler.
//!
//! Provides a shared [`TestHarness`] wrapping a live registry plus
//! counting-callback helpers used by the integration tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cron_scheduler::{
    completion_hook, job_action, CompletionHook, JobAction, JobRegistry, RegistryConfig,
};
use cron_service::CronService;

/// Cron expression that fires every second; the fastest schedule the
/// engine supports, used to keep test wall time down.
pub const EVERY_SECOND: &str = "* * * * * *";

/// Shared harness: one live registry and a dispatch service over it.
pub struct TestHarness {
    pub registry: Arc<JobRegistry>,
    pub service: CronService,
}

impl TestHarness {
    /// Start a registry with default configuration.
    pub async fn new() -> Self {
        Self::with_config(RegistryConfig::default()).await
    }

    /// Start a registry with custom configuration.
    pub async fn with_config(config: RegistryConfig) -> Self {
        init_tracing();
        let registry = Arc::new(
            JobRegistry::new(config)
                .await
                .expect("failed to start test registry"),
        );
        let service = CronService::new(registry.clone());
        Self { registry, service }
    }

    /// Tear the registry down. Tests call this explicitly so leaked
    /// timers never bleed into other tests.
    pub async fn shutdown(&self) {
        self.registry.close().await;
    }
}

fn init_tracing() {
    // Repeated init attempts across tests are expected to fail.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

/// A shared counter plus an action that increments it on every firing.
pub fn counting_action() -> (Arc<AtomicU64>, JobAction) {
    let counter = Arc::new(AtomicU64::new(0));
    let inner = counter.clone();
    let action = job_action(move |_ctx| {
        let counter = inner.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    (counter, action)
}

/// A shared counter plus a completion hook that increments it after
/// each firing.
pub fn counting_hook() -> (Arc<AtomicU64>, CompletionHook) {
    let counter = Arc::new(AtomicU64::new(0));
    let inner = counter.clone();
    let hook = completion_hook(move |_ctx| {
        let counter = inner.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    (counter, hook)
}

/// An action that holds its firing open for `millis` before returning,
/// for overlap and shutdown-grace scenarios.
pub fn slow_action(millis: u64) -> (Arc<AtomicU64>, JobAction) {
    let counter = Arc::new(AtomicU64::new(0));
    let inner = counter.clone();
    let action = job_action(move |_ctx| {
        let counter = inner.clone();
        async move {
            tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    (counter, action)
}
