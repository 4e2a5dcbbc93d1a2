use anyhow::{Context, Result};
use std::sync::Arc;

use proctor_dashboard::config::Config;
use proctor_dashboard::routes::{self, AppState};
use proctor_dashboard::services::analyzer_client::AnalyzerClient;
use proctor_dashboard::services::monitor::{ActiveContext, Monitor};
use proctor_dashboard::services::roster_service;
use proctor_dashboard::{db, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;

    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let pool = db::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open {}", config.database_url))?;
    db::run_migrations(&pool).await?;
    db::seed_defaults(&pool).await?;

    let (student, exam) =
        roster_service::resolve_active_context(&pool, config.active_student_id, config.active_exam_id).await?;
    tracing::info!(student_id = student.id, student = %student.name, exam_id = exam.id, exam = %exam.course_name, "active context");

    let client = AnalyzerClient::new(&config.analyzer_base_url, config.analyzer_timeout)?;
    let monitor = Arc::new(Monitor::new(
        pool.clone(),
        client,
        ActiveContext {
            student_id: student.id,
            exam_id: exam.id,
        },
    ));
    let poller = monitor.clone().start(config.poll_interval);

    let app = routes::router(AppState {
        pool: pool.clone(),
        monitor,
    });

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.abort();
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let term = async {
        if let Ok(mut s) = signal::unix::signal(signal::unix::SignalKind::terminate()) {
            s.recv().await;
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();
    tokio::select! { _ = ctrl_c => {}, _ = term => {} }
    tracing::info!("shutdown signal received");
}
