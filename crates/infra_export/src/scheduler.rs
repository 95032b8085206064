//! Weekly backup task
//!
//! One long-lived tokio task owned by [`BackupScheduler`]. Each tick re-reads
//! the marker, so a manual weekly backup pushes the schedule out. Failures
//! are logged and retried after the shorter retry delay; the loop never
//! exits on its own.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::exporter::Exporter;

/// Tick and retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub check_interval: Duration,
    pub retry_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60 * 60),
            retry_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Owner of the weekly backup task
pub struct BackupScheduler {
    exporter: Exporter,
    config: SchedulerConfig,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BackupScheduler {
    pub fn new(exporter: Exporter, config: SchedulerConfig) -> Self {
        Self {
            exporter,
            config,
            handle: Mutex::new(None),
        }
    }

    /// Spawns the task; returns `false` when it is already alive
    pub async fn start(&self) -> bool {
        let mut handle = self.handle.lock().await;
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let exporter = self.exporter.clone();
        let config = self.config;
        *handle = Some(tokio::spawn(run(exporter, config)));
        info!(
            check_secs = config.check_interval.as_secs(),
            retry_secs = config.retry_interval.as_secs(),
            "Weekly backup task started"
        );
        true
    }

    pub async fn is_running(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Aborts the task if it is running
    pub async fn stop(&self) {
        if let Some(handle) = self.handle.lock().await.take() {
            handle.abort();
            info!("Weekly backup task stopped");
        }
    }
}

async fn run(exporter: Exporter, config: SchedulerConfig) {
    loop {
        let delay = match exporter.run_weekly_if_due().await {
            Ok(Some(run)) => {
                info!(stem = %run.stem, records = run.records, "Weekly backup completed");
                config.check_interval
            }
            Ok(None) => config.check_interval,
            Err(e) => {
                error!(error = %e, "Weekly backup failed");
                config.retry_interval
            }
        };
        tokio::time::sleep(delay).await;
    }
}
