/// Student / exam listing endpoints
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::models::{Exam, Student};
use crate::services::{monitor::Monitor, roster_service};

/// GET /api/students
pub async fn list_students(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<Student>>, (StatusCode, String)> {
    roster_service::list_students(&pool)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e)))
}

/// GET /api/exams
pub async fn list_exams(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<Exam>>, (StatusCode, String)> {
    roster_service::list_exams(&pool)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e)))
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub student: Option<Student>,
    pub exam: Option<Exam>,
}

/// GET /api/context - the pair the monitor is recording against
pub async fn active_context(
    State(pool): State<SqlitePool>,
    State(monitor): State<Arc<Monitor>>,
) -> Result<Json<ContextResponse>, (StatusCode, String)> {
    let ctx = monitor.context();
    let student = roster_service::get_student(&pool, ctx.student_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e)))?;
    let exam = roster_service::get_exam(&pool, ctx.exam_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e)))?;
    Ok(Json(ContextResponse { student, exam }))
}
