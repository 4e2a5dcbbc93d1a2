pub mod event_log;
pub mod exam;
pub mod student;

pub use event_log::{EventLog, RawEvent};
pub use exam::Exam;
pub use student::Student;

use chrono::{DateTime, Utc};

/// Storage keeps instants as unix milliseconds; anything chrono can't
/// represent is clamped to the epoch.
pub(crate) fn utc_from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
}
