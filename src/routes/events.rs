/// Event history, live event and SSE endpoints
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::models::EventLog;
use crate::services::event_log_service::{self, DEFAULT_RECENT_LIMIT};
use crate::services::monitor::{LiveEvent, Monitor};

pub const MAX_RECENT_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub student_id: Option<i64>,
    pub exam_id: Option<i64>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentEventsResponse {
    pub student_id: i64,
    pub exam_id: i64,
    pub total: i64,
    pub events: Vec<EventLog>,
}

/// GET /api/events/recent - newest first; ids default to the active context
pub async fn recent_events(
    State(pool): State<SqlitePool>,
    State(monitor): State<Arc<Monitor>>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<RecentEventsResponse>, (StatusCode, String)> {
    let ctx = monitor.context();
    let student_id = q.student_id.unwrap_or(ctx.student_id);
    let exam_id = q.exam_id.unwrap_or(ctx.exam_id);
    let limit = q.limit.unwrap_or(DEFAULT_RECENT_LIMIT).min(MAX_RECENT_LIMIT);

    let events = event_log_service::get_recent(&pool, student_id, exam_id, limit)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e)))?;
    let total = event_log_service::count_for(&pool, student_id, exam_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e)))?;

    Ok(Json(RecentEventsResponse {
        student_id,
        exam_id,
        total,
        events,
    }))
}

/// GET /api/events/live - last event the monitor fetched, or null
pub async fn live_event(State(monitor): State<Arc<Monitor>>) -> Json<Option<LiveEvent>> {
    Json(monitor.live_event().await)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub image_url: Option<String>,
}

/// GET /api/snapshot - proxied from the analyzer, null when unavailable
pub async fn snapshot(State(monitor): State<Arc<Monitor>>) -> Json<SnapshotResponse> {
    Json(SnapshotResponse {
        image_url: monitor.client().fetch_snapshot_reference().await,
    })
}

/// GET /api/events/stream - SSE of newly stored events
pub async fn events_stream(
    State(monitor): State<Arc<Monitor>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = monitor.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let json = serde_json::to_string(&event).unwrap_or_default();
                    yield Ok(Event::default().event("event_log").data(json));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "event stream subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
