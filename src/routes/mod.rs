use axum::extract::FromRef;
use axum::response::{Html, IntoResponse};
use axum::{routing::get, Router};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::monitor::Monitor;

pub mod events;
pub mod roster;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub monitor: Arc<Monitor>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Monitor> {
    fn from_ref(state: &AppState) -> Self {
        state.monitor.clone()
    }
}

async fn dashboard_page() -> impl IntoResponse {
    Html(include_str!("../../static/dashboard.html"))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/", get(dashboard_page))
        .route("/api/students", get(roster::list_students))
        .route("/api/exams", get(roster::list_exams))
        .route("/api/context", get(roster::active_context))
        .route("/api/events/recent", get(events::recent_events))
        .route("/api/events/live", get(events::live_event))
        .route("/api/events/stream", get(events::events_stream))
        .route("/api/snapshot", get(events::snapshot))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
