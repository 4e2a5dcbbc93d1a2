mod common;

use axum::{routing::get, Json, Router};
use common::{setup_pool, spawn_mock_analyzer, unreachable_base_url};
use proctor_dashboard::services::analyzer_client::AnalyzerClient;
use proctor_dashboard::services::event_log_service::{self, RecordOutcome};
use proctor_dashboard::services::monitor::{ActiveContext, Monitor};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn tick_stores_and_broadcasts_new_events() {
    let (pool, s, e) = setup_pool().await;
    let app = Router::new().route(
        "/latest_event",
        get(|| async { Json(json!({"timestamp": 1700000000.0, "event": "no_face", "suspicion_score": 0.8})) }),
    );
    let base = spawn_mock_analyzer(app).await;
    let client = AnalyzerClient::new(&base, Duration::from_secs(1)).unwrap();
    let monitor = Monitor::new(pool.clone(), client, ActiveContext { student_id: s.id, exam_id: e.id });
    let mut rx = monitor.subscribe();

    let first = monitor.tick().await.unwrap();
    assert!(first.is_stored());

    let published = rx.try_recv().unwrap();
    assert_eq!(published.event_type, "no_face");
    assert_eq!(published.timestamp.timestamp(), 1_700_000_000);
    assert_eq!(published.student_id, s.id);

    // the analyzer keeps reporting the same event between polls
    let second = monitor.tick().await.unwrap();
    assert_eq!(second, RecordOutcome::DiscardedDuplicate);
    assert!(rx.try_recv().is_err());

    let live = monitor.live_event().await.unwrap();
    assert_eq!(live.event.event_label, "no_face");
    assert_eq!(event_log_service::count_for(&pool, s.id, e.id).await.unwrap(), 1);
}

#[tokio::test]
async fn low_score_events_update_live_view_only() {
    let (pool, s, e) = setup_pool().await;
    let app = Router::new().route(
        "/latest_event",
        get(|| async { Json(json!({"timestamp": 1700000000.0, "event": "NORMAL", "suspicion_score": 0.0})) }),
    );
    let base = spawn_mock_analyzer(app).await;
    let client = AnalyzerClient::new(&base, Duration::from_secs(1)).unwrap();
    let monitor = Monitor::new(pool.clone(), client, ActiveContext { student_id: s.id, exam_id: e.id });

    assert_eq!(monitor.tick().await.unwrap(), RecordOutcome::DiscardedLowScore);
    assert_eq!(monitor.live_event().await.unwrap().event.event_label, "NORMAL");
    assert_eq!(event_log_service::count_for(&pool, s.id, e.id).await.unwrap(), 0);
}

#[tokio::test]
async fn unreachable_analyzer_is_just_no_event() {
    let (pool, s, e) = setup_pool().await;
    let client = AnalyzerClient::new(&unreachable_base_url(), Duration::from_millis(300)).unwrap();
    let monitor = Monitor::new(pool, client, ActiveContext { student_id: s.id, exam_id: e.id });

    assert_eq!(monitor.tick().await.unwrap(), RecordOutcome::NoEvent);
    assert!(monitor.live_event().await.is_none());
}

#[tokio::test]
async fn started_loop_keeps_polling() {
    let (pool, s, e) = setup_pool().await;
    let app = Router::new().route(
        "/latest_event",
        get(|| async { Json(json!({"timestamp": 1700000123.0, "event": "look_away", "suspicion_score": 0.95})) }),
    );
    let base = spawn_mock_analyzer(app).await;
    let client = AnalyzerClient::new(&base, Duration::from_secs(1)).unwrap();
    let monitor = Arc::new(Monitor::new(pool.clone(), client, ActiveContext { student_id: s.id, exam_id: e.id }));
    let mut rx = monitor.subscribe();

    let handle = monitor.clone().start(Duration::from_millis(20));
    let stored = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
    assert_eq!(stored.event_type, "look_away");

    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.abort();
    assert_eq!(event_log_service::count_for(&pool, s.id, e.id).await.unwrap(), 1);
}
