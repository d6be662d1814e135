//! Unit tests for alert dispatch

use std::sync::Arc;

use chrono::NaiveDate;
use trendwatch::models::{SignalResult, Threshold};
use trendwatch::notify::{AlertDispatcher, RecordingNotifier};

fn result(name: &str, triggered: bool) -> SignalResult {
    SignalResult {
        name: name.to_string(),
        kind: "single",
        indicator_id: Some(1),
        statistic: if triggered { 25.0 } else { 2.0 },
        threshold: Threshold::Scalar(10.0),
        triggered,
        value: 3.5,
        unit: "USD".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        dependencies: Vec::new(),
    }
}

#[tokio::test]
async fn test_only_triggered_results_are_sent() {
    let notifier = Arc::new(RecordingNotifier::new());
    let dispatcher = AlertDispatcher::new(notifier.clone());

    let results = vec![result("quiet", false), result("loud", true)];
    let report = dispatcher.dispatch(&results).await;

    assert_eq!(report.delivered, 1);
    assert_eq!(report.attempted(), 1);
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "TrendForce Alert: loud");
}

#[tokio::test]
async fn test_failed_delivery_does_not_stop_others() {
    let notifier = Arc::new(RecordingNotifier::failing_on(&["first"]));
    let dispatcher = AlertDispatcher::new(notifier.clone());

    let results = vec![result("first", true), result("second", true)];
    let report = dispatcher.dispatch(&results).await;

    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, vec!["first".to_string()]);
    assert_eq!(notifier.sent()[0].0, "TrendForce Alert: second");
}

#[tokio::test]
async fn test_dry_run_suppresses_delivery() {
    let notifier = Arc::new(RecordingNotifier::new());
    let dispatcher = AlertDispatcher::new(notifier.clone()).with_dry_run(true);
    assert!(dispatcher.is_dry_run());

    let results = vec![result("loud", true)];
    let report = dispatcher.dispatch(&results).await;

    assert_eq!(report.suppressed, 1);
    assert_eq!(report.attempted(), 0);
    assert!(notifier.sent().is_empty());
    assert!(!dispatcher.send_message("digest", "body").await);
}

#[tokio::test]
async fn test_send_message_reports_delivery() {
    let notifier = Arc::new(RecordingNotifier::failing_on(&["broken"]));
    let dispatcher = AlertDispatcher::new(notifier.clone());

    assert!(dispatcher.send_message("digest", "all good").await);
    assert!(!dispatcher.send_message("broken digest", "body").await);
    assert_eq!(notifier.sent(), vec![("digest".to_string(), "all good".to_string())]);
}
