//! Command dispatch through the service layer: the five verbs, their
//! acknowledgement payloads, and error propagation.

use e2e_tests::{counting_action, TestHarness};
use pretty_assertions::assert_eq;

use cron_scheduler::{AckStatus, JobId, SchedulerError};
use cron_service::{CronRequest, CronResponse, ROLE};

fn ack(response: CronResponse) -> cron_scheduler::JobAck {
    match response {
        CronResponse::Ack(ack) => ack,
        CronResponse::Empty(_) => panic!("expected ack payload"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_verbs_cover_the_command_surface() {
    assert_eq!(ROLE, "cron");
    let (_, action) = counting_action();
    let verbs = [
        CronRequest::AddJob {
            time: "0 0 * * * *".into(),
            timezone: None,
            act: action,
            after: None,
        }
        .cmd(),
        CronRequest::StopJob { id: JobId::new() }.cmd(),
        CronRequest::StartJob { id: JobId::new() }.cmd(),
        CronRequest::CloseJob { id: JobId::new() }.cmd(),
        CronRequest::Close.cmd(),
    ];
    assert_eq!(verbs, ["addjob", "stopjob", "startjob", "closejob", "close"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dispatch_lifecycle_round_trip() {
    let harness = TestHarness::new().await;
    let (_, action) = counting_action();

    let created = ack(harness
        .service
        .dispatch(CronRequest::AddJob {
            time: "0 30 4 * * *".into(),
            timezone: Some("America/New_York".into()),
            act: action,
            after: None,
        })
        .await
        .unwrap());
    assert_eq!(created.status, AckStatus::Added);

    let status = harness.registry.status(created.id).unwrap();
    assert_eq!(status.schedule, "0 30 4 * * *");
    assert_eq!(status.timezone, "America/New_York");

    let stopped = ack(harness
        .service
        .dispatch(CronRequest::StopJob { id: created.id })
        .await
        .unwrap());
    assert_eq!(stopped.status, AckStatus::Stopped);

    let started = ack(harness
        .service
        .dispatch(CronRequest::StartJob { id: created.id })
        .await
        .unwrap());
    assert_eq!(started.status, AckStatus::Started);

    let closed = ack(harness
        .service
        .dispatch(CronRequest::CloseJob { id: created.id })
        .await
        .unwrap());
    assert_eq!(closed.status, AckStatus::Closed);
    assert_eq!(harness.registry.job_count(), 0);

    let response = harness.service.dispatch(CronRequest::Close).await.unwrap();
    assert!(matches!(response, CronResponse::Empty(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ack_payload_shape_on_the_wire() {
    let harness = TestHarness::new().await;
    let (_, action) = counting_action();

    let response = harness
        .service
        .dispatch(CronRequest::AddJob {
            time: "0 0 * * * *".into(),
            timezone: None,
            act: action,
            after: None,
        })
        .await
        .unwrap();

    let json = serde_json::to_value(&response).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object["status"], "added");
    assert!(JobId::parse(object["id"].as_str().unwrap()).is_some());

    let close = harness.service.dispatch(CronRequest::Close).await.unwrap();
    assert_eq!(serde_json::to_value(&close).unwrap(), serde_json::json!({}));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_errors_surface_through_dispatch() {
    let harness = TestHarness::new().await;
    let ghost = JobId::new();

    for request in [
        CronRequest::StopJob { id: ghost },
        CronRequest::StartJob { id: ghost },
        CronRequest::CloseJob { id: ghost },
    ] {
        let err = harness.service.dispatch(request).await.unwrap_err();
        assert_eq!(err.to_string(), format!("invalid cron job {ghost}"));
    }

    let (_, action) = counting_action();
    let err = harness
        .service
        .dispatch(CronRequest::AddJob {
            time: "* * *".into(),
            timezone: None,
            act: action,
            after: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidSchedule(_)));

    harness.shutdown().await;
}
