/// HTTP client for the external video/audio analyzer.
///
/// Every call is a single best-effort attempt bounded by the client timeout.
/// Failures are logged here and surface to callers only as `None`.
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::RawEvent;

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    #[serde(default)]
    image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnalyzerClient {
    pub base_url: String,
    client: Client,
}

impl AnalyzerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build analyzer http client")?;
        Ok(AnalyzerClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Latest suspicious-activity event, or `None` when the analyzer is
    /// unreachable, slow, or answers with something that isn't an event.
    pub async fn fetch_latest_event(&self) -> Option<RawEvent> {
        match self.get_latest_event().await {
            Ok(ev) => Some(ev),
            Err(e) => {
                tracing::warn!(base_url = %self.base_url, error = %format!("{e:#}"), "latest_event fetch failed");
                None
            }
        }
    }

    /// Reference to the most recent snapshot image, if the analyzer has one.
    pub async fn fetch_snapshot_reference(&self) -> Option<String> {
        match self.get_snapshot().await {
            Ok(snap) => snap.image_url.filter(|u| !u.trim().is_empty()),
            Err(e) => {
                tracing::warn!(base_url = %self.base_url, error = %format!("{e:#}"), "snapshot fetch failed");
                None
            }
        }
    }

    async fn get_latest_event(&self) -> Result<RawEvent> {
        let url = format!("{}/latest_event", self.base_url);
        let resp = self.client.get(&url).send().await.context("request failed")?;
        let resp = resp.error_for_status()?;
        let ev = resp.json::<RawEvent>().await.context("invalid latest_event payload")?;
        Ok(ev)
    }

    async fn get_snapshot(&self) -> Result<SnapshotResponse> {
        let url = format!("{}/snapshot", self.base_url);
        let resp = self.client.get(&url).send().await.context("request failed")?;
        let resp = resp.error_for_status()?;
        let snap = resp.json::<SnapshotResponse>().await.context("invalid snapshot payload")?;
        Ok(snap)
    }
}
