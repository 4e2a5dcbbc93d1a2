use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, SqlitePool};
use std::str::FromStr;

use crate::services::roster_service;

const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", include_str!("../../migrations/0001_init.sql")),
    (
        "0002_event_logs_dedup_index",
        include_str!("../../migrations/0002_event_logs_dedup_index.sql"),
    ),
];

/// Opens the pool. File databases are created on first use; an in-memory
/// database is pinned to one long-lived connection since each sqlite memory
/// connection is its own database.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid database url {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new().connect_with(options).await?
    };
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    for (name, sql) in MIGRATIONS {
        pool.execute(*sql)
            .await
            .with_context(|| format!("migration {name} failed"))?;
        tracing::debug!(migration = name, "migration applied");
    }
    Ok(())
}

/// Creates one student and one exam when the respective table is empty.
pub async fn seed_defaults(pool: &SqlitePool) -> Result<()> {
    if roster_service::list_students(pool).await?.is_empty() {
        let s = roster_service::create_student(pool, "Default Student", "0001").await?;
        tracing::info!(student_id = s.id, "seeded default student");
    }
    if roster_service::list_exams(pool).await?.is_empty() {
        let e = roster_service::create_exam(pool, "Default Exam", chrono::Utc::now()).await?;
        tracing::info!(exam_id = e.id, "seeded default exam");
    }
    Ok(())
}

/// Connects and applies the embedded schema.
pub async fn connect_and_migrate(database_url: &str) -> Result<SqlitePool> {
    let pool = connect(database_url).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
