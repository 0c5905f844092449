//! Registry lifecycle: add, stop, start, close a single job, and full
//! registry shutdown, exercised end to end against live timers.

use e2e_tests::{counting_action, TestHarness, EVERY_SECOND};
use pretty_assertions::assert_eq;

use cron_scheduler::{AckStatus, JobId, JobState, SchedulerError};

#[tokio::test(flavor = "multi_thread")]
async fn test_job_lifecycle_end_to_end() {
    let harness = TestHarness::new().await;
    let (_, action) = counting_action();

    let ack = harness
        .registry
        .add_job("0 0 * * * *", None, action, None)
        .await
        .expect("add_job failed");
    assert_eq!(ack.status, AckStatus::Added);
    assert_eq!(harness.registry.job_count(), 1);

    let stopped = harness.registry.stop_job(ack.id).unwrap();
    assert_eq!(stopped.id, ack.id);
    assert_eq!(stopped.status, AckStatus::Stopped);
    assert_eq!(
        harness.registry.status(ack.id).unwrap().state,
        JobState::Stopped
    );

    let started = harness.registry.start_job(ack.id).unwrap();
    assert_eq!(started.status, AckStatus::Started);
    assert_eq!(
        harness.registry.status(ack.id).unwrap().state,
        JobState::Running
    );

    let closed = harness.registry.close_job(ack.id).await.unwrap();
    assert_eq!(closed.status, AckStatus::Closed);
    assert_eq!(harness.registry.job_count(), 0);

    harness.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_operations_on_closed_job_fail() {
    let harness = TestHarness::new().await;
    let (_, action) = counting_action();

    let ack = harness
        .registry
        .add_job("0 0 * * * *", None, action, None)
        .await
        .unwrap();
    harness.registry.close_job(ack.id).await.unwrap();

    let err = harness.registry.stop_job(ack.id).unwrap_err();
    assert_eq!(err.to_string(), format!("invalid cron job {}", ack.id));
    assert!(matches!(
        harness.registry.start_job(ack.id),
        Err(SchedulerError::JobNotFound(_))
    ));
    assert!(matches!(
        harness.registry.close_job(ack.id).await,
        Err(SchedulerError::JobNotFound(_))
    ));

    harness.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_each_job_gets_a_distinct_id() {
    let harness = TestHarness::new().await;

    let mut ids = Vec::new();
    for _ in 0..5 {
        let (_, action) = counting_action();
        let ack = harness
            .registry
            .add_job(EVERY_SECOND, None, action, None)
            .await
            .unwrap();
        ids.push(ack.id);
    }
    ids.sort_by_key(|id: &JobId| id.to_string());
    ids.dedup();
    assert_eq!(ids.len(), 5);
    assert_eq!(harness.registry.job_count(), 5);

    harness.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_add_leaves_registry_untouched() {
    let harness = TestHarness::new().await;

    let (_, action) = counting_action();
    let err = harness
        .registry
        .add_job("61 * * * * *", None, action, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidSchedule(_)));
    assert_eq!(harness.registry.job_count(), 0);
    assert!(harness.registry.all_statuses().is_empty());

    harness.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_close_is_repeatable_and_total() {
    let harness = TestHarness::new().await;

    for _ in 0..4 {
        let (_, action) = counting_action();
        harness
            .registry
            .add_job("0 0 * * * *", None, action, None)
            .await
            .unwrap();
    }
    assert_eq!(harness.registry.job_count(), 4);

    harness.registry.close().await;
    assert_eq!(harness.registry.job_count(), 0);

    harness.registry.close().await;
    assert_eq!(harness.registry.job_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_one_job_leaves_siblings_running() {
    let harness = TestHarness::new().await;
    let (_, action_a) = counting_action();
    let (_, action_b) = counting_action();

    let a = harness
        .registry
        .add_job("0 0 * * * *", None, action_a, None)
        .await
        .unwrap();
    let b = harness
        .registry
        .add_job("0 0 * * * *", None, action_b, None)
        .await
        .unwrap();

    harness.registry.stop_job(a.id).unwrap();
    assert_eq!(harness.registry.status(a.id).unwrap().state, JobState::Stopped);
    assert_eq!(harness.registry.status(b.id).unwrap().state, JobState::Running);

    harness.shutdown().await;
}
