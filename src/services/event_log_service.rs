/// Event ingestion: gates polled analyzer events and persists the new ones
/// per (student, exam); also serves recent history.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::event_log::EventLogRow;
use crate::models::{EventLog, RawEvent};

/// Events must score strictly above this to be kept.
pub const SCORE_THRESHOLD: f64 = 0.5;
/// Half-width of the dedup window, inclusive on both ends.
pub const DEDUP_WINDOW_MS: i64 = 1_000;
/// Raw timestamps above this are read as milliseconds, the rest as seconds.
pub const MILLIS_THRESHOLD: f64 = 1e12;
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Stored { id: i64 },
    NoEvent,
    DiscardedLowScore,
    DiscardedInvalidTimestamp,
    DiscardedDuplicate,
    /// Insert hit the unique index: a concurrent poll stored the same event first.
    RaceIgnored,
}

impl RecordOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored { .. } => "stored",
            Self::NoEvent => "no_event",
            Self::DiscardedLowScore => "discarded_low_score",
            Self::DiscardedInvalidTimestamp => "discarded_invalid_timestamp",
            Self::DiscardedDuplicate => "discarded_duplicate",
            Self::RaceIgnored => "race_ignored",
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

/// Maps an analyzer timestamp to a UTC instant.
///
/// Values above 1e12 are unix milliseconds (truncated); everything else is
/// unix seconds rounded to the nearest whole second, ties to even.
/// Non-finite or unrepresentable values give `None`.
pub fn normalize_timestamp(ts: f64) -> Option<DateTime<Utc>> {
    if !ts.is_finite() {
        return None;
    }
    if ts > MILLIS_THRESHOLD {
        DateTime::<Utc>::from_timestamp_millis(ts.trunc() as i64)
    } else {
        DateTime::<Utc>::from_timestamp(ts.round_ties_even() as i64, 0)
    }
}

pub async fn record_if_new(
    pool: &SqlitePool,
    student_id: i64,
    exam_id: i64,
    raw_event: Option<&RawEvent>,
) -> Result<RecordOutcome> {
    let Some(ev) = raw_event else {
        return Ok(RecordOutcome::NoEvent);
    };
    // NaN fails this comparison too
    if !(ev.suspicion_score > SCORE_THRESHOLD) {
        return Ok(RecordOutcome::DiscardedLowScore);
    }
    let Some(at) = normalize_timestamp(ev.timestamp) else {
        tracing::warn!(timestamp = ev.timestamp, event_type = %ev.event_label, "unusable event timestamp");
        return Ok(RecordOutcome::DiscardedInvalidTimestamp);
    };
    let at_ms = at.timestamp_millis();

    // One connection for the check and the insert; returned to the pool on drop.
    let mut conn = pool.acquire().await.context("failed to acquire connection")?;

    let existing: Option<i64> = sqlx::query_scalar(
        r#"SELECT id FROM event_logs
           WHERE student_id = ? AND exam_id = ? AND event_type = ?
             AND timestamp_ms BETWEEN ? AND ?
           LIMIT 1"#,
    )
    .bind(student_id)
    .bind(exam_id)
    .bind(&ev.event_label)
    .bind(at_ms - DEDUP_WINDOW_MS)
    .bind(at_ms + DEDUP_WINDOW_MS)
    .fetch_optional(&mut *conn)
    .await
    .context("dedup lookup failed")?;

    if let Some(existing_id) = existing {
        tracing::debug!(student_id, exam_id, event_type = %ev.event_label, existing_id, "duplicate event skipped");
        return Ok(RecordOutcome::DiscardedDuplicate);
    }

    insert_event(&mut conn, student_id, exam_id, &ev.event_label, ev.suspicion_score, at_ms).await
}

pub(crate) async fn insert_event(
    conn: &mut SqliteConnection,
    student_id: i64,
    exam_id: i64,
    event_type: &str,
    suspicion_score: f64,
    timestamp_ms: i64,
) -> Result<RecordOutcome> {
    let res = sqlx::query(
        r#"INSERT INTO event_logs (event_type, suspicion_score, timestamp_ms, student_id, exam_id)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(event_type)
    .bind(suspicion_score)
    .bind(timestamp_ms)
    .bind(student_id)
    .bind(exam_id)
    .execute(&mut *conn)
    .await;

    match res {
        Ok(done) => {
            let id = done.last_insert_rowid();
            tracing::info!(student_id, exam_id, event_type, suspicion_score, id, "event stored");
            Ok(RecordOutcome::Stored { id })
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::debug!(student_id, exam_id, event_type, "concurrent duplicate insert ignored");
            Ok(RecordOutcome::RaceIgnored)
        }
        Err(e) => Err(e).context("failed to insert event log"),
    }
}

/// Most recent events for the pair, newest first, at most `limit` rows.
pub async fn get_recent(
    pool: &SqlitePool,
    student_id: i64,
    exam_id: i64,
    limit: u32,
) -> Result<Vec<EventLog>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let mut conn = pool.acquire().await.context("failed to acquire connection")?;
    let rows = sqlx::query_as::<_, EventLogRow>(
        r#"SELECT id, event_type, suspicion_score, timestamp_ms, student_id, exam_id
           FROM event_logs
           WHERE student_id = ? AND exam_id = ?
           ORDER BY timestamp_ms DESC, id DESC
           LIMIT ?"#,
    )
    .bind(student_id)
    .bind(exam_id)
    .bind(i64::from(limit))
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(EventLog::from).collect())
}

pub async fn count_for(pool: &SqlitePool, student_id: i64, exam_id: i64) -> Result<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_logs WHERE student_id = ? AND exam_id = ?")
        .bind(student_id)
        .bind(exam_id)
        .fetch_one(pool)
        .await?;
    Ok(n)
}
