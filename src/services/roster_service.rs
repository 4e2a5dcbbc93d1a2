/// Student and exam lookups. Rows come from seeding; there is no update or delete path.
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::exam::ExamRow;
use crate::models::{Exam, Student};

pub async fn create_student(pool: &SqlitePool, name: &str, student_number: &str) -> Result<Student> {
    let result = sqlx::query("INSERT INTO students (name, student_number) VALUES (?, ?)")
        .bind(name)
        .bind(student_number)
        .execute(pool)
        .await?;

    Ok(Student {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        student_number: student_number.to_string(),
    })
}

pub async fn list_students(pool: &SqlitePool) -> Result<Vec<Student>> {
    let students = sqlx::query_as::<_, Student>(
        "SELECT id, name, student_number FROM students ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(students)
}

pub async fn get_student(pool: &SqlitePool, student_id: i64) -> Result<Option<Student>> {
    let student = sqlx::query_as::<_, Student>(
        "SELECT id, name, student_number FROM students WHERE id = ?",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await?;
    Ok(student)
}

pub async fn create_exam(pool: &SqlitePool, course_name: &str, start_time: DateTime<Utc>) -> Result<Exam> {
    let result = sqlx::query("INSERT INTO exams (course_name, start_time_ms) VALUES (?, ?)")
        .bind(course_name)
        .bind(start_time.timestamp_millis())
        .execute(pool)
        .await?;

    Ok(Exam {
        id: result.last_insert_rowid(),
        course_name: course_name.to_string(),
        start_time,
    })
}

pub async fn list_exams(pool: &SqlitePool) -> Result<Vec<Exam>> {
    let rows = sqlx::query_as::<_, ExamRow>(
        "SELECT id, course_name, start_time_ms FROM exams ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Exam::from).collect())
}

pub async fn get_exam(pool: &SqlitePool, exam_id: i64) -> Result<Option<Exam>> {
    let row = sqlx::query_as::<_, ExamRow>(
        "SELECT id, course_name, start_time_ms FROM exams WHERE id = ?",
    )
    .bind(exam_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Exam::from))
}

/// Resolves the (student, exam) pair the monitor records against: configured
/// ids win, otherwise the first row of each table.
pub async fn resolve_active_context(
    pool: &SqlitePool,
    student_id: Option<i64>,
    exam_id: Option<i64>,
) -> Result<(Student, Exam)> {
    let student = match student_id {
        Some(id) => get_student(pool, id).await?,
        None => list_students(pool).await?.into_iter().next(),
    }
    .ok_or_else(|| anyhow::anyhow!("no student available for the active context"))?;

    let exam = match exam_id {
        Some(id) => get_exam(pool, id).await?,
        None => list_exams(pool).await?.into_iter().next(),
    }
    .ok_or_else(|| anyhow::anyhow!("no exam available for the active context"))?;

    Ok((student, exam))
}
