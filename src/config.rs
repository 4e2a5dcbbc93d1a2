use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://proctor_dashboard.db";
pub const DEFAULT_ANALYZER_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ANALYZER_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_PORT: u16 = 5018;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub analyzer_base_url: String,
    pub analyzer_timeout: Duration,
    pub poll_interval: Duration,
    pub active_student_id: Option<i64>,
    pub active_exam_id: Option<i64>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            analyzer_base_url: DEFAULT_ANALYZER_BASE_URL.to_string(),
            analyzer_timeout: Duration::from_secs(DEFAULT_ANALYZER_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            active_student_id: None,
            active_exam_id: None,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Reads the process environment. Unset keys fall back to defaults,
    /// set-but-unparseable numeric keys are an error.
    pub fn from_env() -> Result<Self> {
        let raw_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        let analyzer_base_url = env::var("ANALYZER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_ANALYZER_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs: u64 = parse_var("ANALYZER_TIMEOUT_SECS")?.unwrap_or(DEFAULT_ANALYZER_TIMEOUT_SECS);
        let poll_ms: u64 = parse_var("POLL_INTERVAL_MS")?.unwrap_or(DEFAULT_POLL_INTERVAL_MS);

        Ok(Config {
            database_url: normalize_sqlite_url(&raw_url),
            analyzer_base_url,
            analyzer_timeout: Duration::from_secs(timeout_secs),
            poll_interval: Duration::from_millis(poll_ms.max(1)),
            active_student_id: parse_var("ACTIVE_STUDENT_ID")?,
            active_exam_id: parse_var("ACTIVE_EXAM_ID")?,
            port: parse_var("PORT")?.unwrap_or(DEFAULT_PORT),
        })
    }
}

fn parse_var<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value for {key}: {v:?}")),
        _ => Ok(None),
    }
}

/// Accepts `sqlite://path`, `sqlite::memory:`, `sqlite:path`, `file:path` or a bare path.
pub fn normalize_sqlite_url(input: &str) -> String {
    if input.starts_with("sqlite://") || input.starts_with("sqlite::memory:") {
        return input.to_string();
    }
    if let Some(rest) = input.strip_prefix("sqlite:") {
        return format!("sqlite://{}", rest);
    }
    if let Some(rest) = input.strip_prefix("file:") {
        return format!("sqlite://{}", rest);
    }
    format!("sqlite://{}", input)
}
