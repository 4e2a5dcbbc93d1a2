/// Suspicious-activity records and the wire shape they arrive in.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::utc_from_millis;

/// Payload of the analyzer's `GET /latest_event`.
///
/// `timestamp` is either unix seconds (fractional) or unix milliseconds; the
/// analyzer does not say which. See `event_log_service::normalize_timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub timestamp: f64,
    #[serde(rename = "event")]
    pub event_label: String,
    pub suspicion_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub id: i64,
    pub event_type: String,
    pub suspicion_score: f64,
    pub timestamp: DateTime<Utc>,
    pub student_id: i64,
    pub exam_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EventLogRow {
    pub id: i64,
    pub event_type: String,
    pub suspicion_score: f64,
    pub timestamp_ms: i64,
    pub student_id: i64,
    pub exam_id: i64,
}

impl From<EventLogRow> for EventLog {
    fn from(row: EventLogRow) -> Self {
        Self {
            id: row.id,
            event_type: row.event_type,
            suspicion_score: row.suspicion_score,
            timestamp: utc_from_millis(row.timestamp_ms),
            student_id: row.student_id,
            exam_id: row.exam_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_event_uses_analyzer_field_names() {
        let ev: RawEvent = serde_json::from_str(
            r#"{"timestamp": 1700000000.25, "event": "look_away", "suspicion_score": 0.8}"#,
        )
        .unwrap();
        assert_eq!(ev.event_label, "look_away");
        assert_eq!(ev.suspicion_score, 0.8);

        let missing_score = serde_json::from_str::<RawEvent>(r#"{"timestamp": 1, "event": "x"}"#);
        assert!(missing_score.is_err());
    }
}
