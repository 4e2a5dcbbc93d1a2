/// Polling loop: pulls the analyzer's latest event on a fixed interval,
/// records it for the active student/exam and fans stored events out to
/// live subscribers.
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::{EventLog, RawEvent};
use crate::services::analyzer_client::AnalyzerClient;
use crate::services::event_log_service::{self, RecordOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveContext {
    pub student_id: i64,
    pub exam_id: i64,
}

/// Whatever the analyzer last reported, stored or not.
#[derive(Debug, Clone, Serialize)]
pub struct LiveEvent {
    #[serde(flatten)]
    pub event: RawEvent,
    pub fetched_at: DateTime<Utc>,
}

pub struct Monitor {
    pool: SqlitePool,
    client: AnalyzerClient,
    context: ActiveContext,
    live: RwLock<Option<LiveEvent>>,
    event_tx: broadcast::Sender<EventLog>,
}

impl Monitor {
    pub fn new(pool: SqlitePool, client: AnalyzerClient, context: ActiveContext) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            pool,
            client,
            context,
            live: RwLock::new(None),
            event_tx,
        }
    }

    pub fn context(&self) -> ActiveContext {
        self.context
    }

    pub fn client(&self) -> &AnalyzerClient {
        &self.client
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventLog> {
        self.event_tx.subscribe()
    }

    pub async fn live_event(&self) -> Option<LiveEvent> {
        self.live.read().await.clone()
    }

    /// One poll: fetch, record, publish.
    pub async fn tick(&self) -> Result<RecordOutcome> {
        let raw = self.client.fetch_latest_event().await;
        if let Some(ev) = &raw {
            *self.live.write().await = Some(LiveEvent {
                event: ev.clone(),
                fetched_at: Utc::now(),
            });
        }

        let ActiveContext { student_id, exam_id } = self.context;
        let outcome = event_log_service::record_if_new(&self.pool, student_id, exam_id, raw.as_ref()).await?;

        if let (RecordOutcome::Stored { id }, Some(ev)) = (outcome, raw) {
            if let Some(timestamp) = event_log_service::normalize_timestamp(ev.timestamp) {
                // no subscribers is fine
                let _ = self.event_tx.send(EventLog {
                    id,
                    event_type: ev.event_label,
                    suspicion_score: ev.suspicion_score,
                    timestamp,
                    student_id,
                    exam_id,
                });
            }
        }
        Ok(outcome)
    }

    /// Spawns the polling loop. A failed tick is logged and the loop carries on.
    pub fn start(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                student_id = self.context.student_id,
                exam_id = self.context.exam_id,
                interval_ms = every.as_millis() as u64,
                analyzer = %self.client.base_url,
                "monitor started"
            );
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match self.tick().await {
                    Ok(outcome) => tracing::trace!(outcome = outcome.as_str(), "monitor tick"),
                    Err(e) => tracing::warn!(error = %format!("{e:#}"), "monitor tick failed"),
                }
            }
        })
    }
}
