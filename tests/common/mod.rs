#![allow(dead_code)]

use axum::Router;
use proctor_dashboard::db;
use proctor_dashboard::models::{Exam, RawEvent, Student};
use proctor_dashboard::services::roster_service;
use sqlx::SqlitePool;

pub async fn setup_pool() -> (SqlitePool, Student, Exam) {
    let pool = db::connect_and_migrate("sqlite::memory:").await.unwrap();
    let student = roster_service::create_student(&pool, "Ada Lovelace", "0001").await.unwrap();
    let exam = roster_service::create_exam(&pool, "Discrete Math", chrono::Utc::now()).await.unwrap();
    (pool, student, exam)
}

pub fn raw(label: &str, score: f64, ts: f64) -> RawEvent {
    RawEvent {
        timestamp: ts,
        event_label: label.to_string(),
        suspicion_score: score,
    }
}

/// Serves `app` on an ephemeral local port and returns its base url.
pub async fn spawn_mock_analyzer(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base url nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
