use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::utc_from_millis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub course_name: String,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamRow {
    pub id: i64,
    pub course_name: String,
    pub start_time_ms: i64,
}

impl From<ExamRow> for Exam {
    fn from(row: ExamRow) -> Self {
        Self {
            id: row.id,
            course_name: row.course_name,
            start_time: utc_from_millis(row.start_time_ms),
        }
    }
}
