//! Worker scheduler for background tasks.

use std::sync::Arc;
use std::time::Duration;

use kv_store::KvStore;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::report::MetricsReporter;
use crate::retention::SweepWorker;

/// Worker scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Expired-entry sweep interval in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Metrics report interval in seconds
    #[serde(default = "default_metrics_report_interval_secs")]
    pub metrics_report_interval_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_metrics_report_interval_secs() -> u64 {
    60
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            metrics_report_interval_secs: default_metrics_report_interval_secs(),
        }
    }
}

impl WorkerConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn metrics_report_interval(&self) -> Duration {
        Duration::from_secs(self.metrics_report_interval_secs.max(1))
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    config: WorkerConfig,
    store: Arc<dyn KvStore>,
}

impl WorkerScheduler {
    pub fn new(config: WorkerConfig, store: Arc<dyn KvStore>) -> Self {
        Self { config, store }
    }

    /// Starts all background workers. Handles run until aborted.
    pub fn start(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_sweep_worker().await;
        }));

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_metrics_report().await;
        }));

        info!(
            sweep_interval_secs = self.config.sweep_interval_secs,
            metrics_report_interval_secs = self.config.metrics_report_interval_secs,
            "Background workers started"
        );
        handles
    }

    async fn run_sweep_worker(&self) {
        let worker = SweepWorker::new(self.store.clone());
        let mut ticker = interval(self.config.sweep_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Err(e) = worker.run().await {
                error!("Sweep worker error: {}", e);
            }
        }
    }

    async fn run_metrics_report(&self) {
        let reporter = MetricsReporter::new();
        let mut ticker = interval(self.config.metrics_report_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; nothing to report yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            reporter.report();
        }
    }
}
