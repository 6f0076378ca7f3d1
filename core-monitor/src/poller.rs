//! Polling loop
//!
//! Each cycle computes a [`TimeWindow`], lists files created inside it, and
//! runs [`check_public_file`] on every result in provider order. Cycles never
//! fail: provider errors are logged and captured in the [`CycleReport`].

use crate::error::MonitorError;
use crate::inspector::{check_public_file, FileOutcome};
use crate::window::TimeWindow;
use bridge_traits::drive::DriveClient;
use bridge_traits::time::Clock;
use chrono::{DateTime, SecondsFormat, Utc};
use core_runtime::MonitorConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Summary of one polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub window: TimeWindow,
    pub started_at: DateTime<Utc>,
    /// One entry per listed file, in provider order
    pub files: Vec<FileOutcome>,
    /// Set when the listing query failed; `files` is then empty
    pub query_error: Option<MonitorError>,
}

impl CycleReport {
    /// Whether the listing returned no files
    pub fn is_idle(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of `anyone` permissions deleted during the cycle
    pub fn revoked_count(&self) -> usize {
        self.files.iter().map(|f| f.revoked().len()).sum()
    }
}

/// Drives the detect-and-remediate loop against a single account.
pub struct Poller {
    client: Arc<dyn DriveClient>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    safety_margin: Duration,
    folder_id: Option<String>,
}

impl Poller {
    pub fn new(client: Arc<dyn DriveClient>, clock: Arc<dyn Clock>, config: &MonitorConfig) -> Self {
        Self {
            client,
            clock,
            interval: config.interval,
            safety_margin: config.safety_margin,
            folder_id: config.folder_id.clone(),
        }
    }

    /// Run a single detection cycle.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleReport {
        let started_at = self.clock.now();
        let window = TimeWindow::ending_at(started_at, self.interval, self.safety_margin);
        let timestamp = started_at.to_rfc3339_opts(SecondsFormat::Secs, true);

        debug!(window = %window, folder_id = ?self.folder_id, "Querying new files");

        let listed = self
            .client
            .list_files_created_after(window.lower_bound, self.folder_id.as_deref())
            .await
            .map_err(|e| MonitorError::provider("files.list", e));

        let (files, query_error) = match listed {
            Ok(files) => (files, None),
            Err(e) => {
                error!(error = %e, "Failed to list new files");
                (Vec::new(), Some(e))
            }
        };

        if files.is_empty() {
            info!(timestamp = %timestamp, "No new files detected.");
        }

        let mut outcomes = Vec::with_capacity(files.len());
        for file in &files {
            info!(timestamp = %timestamp, "New file detected: {}", file.name);
            outcomes.push(check_public_file(self.client.as_ref(), file).await);
        }

        CycleReport {
            window,
            started_at,
            files: outcomes,
            query_error,
        }
    }

    /// Poll until the process is terminated.
    pub async fn run_forever(&self) {
        info!(
            interval_secs = self.interval.as_secs(),
            folder_id = ?self.folder_id,
            "Starting share monitor"
        );

        loop {
            let report = self.run_cycle().await;
            debug!(
                files = report.files.len(),
                revoked = report.revoked_count(),
                "Cycle complete"
            );

            info!("Waiting {} Seconds", self.interval.as_secs());
            tokio::time::sleep(self.interval).await;
        }
    }
}
