//! Per-bridge liveness loop.
//!
//! Each cycle waits, probes the bridge, and classifies it online or offline.
//! An offline bridge is retried after an extra delay, indefinitely.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, timeout, Instant};

use super::probe::Prober;
use crate::config::MonitorConfig;
use crate::types::{LivenessReport, LivenessStatus};

/// Called with every classification the monitor makes.
pub type StatusCallback = Arc<dyn Fn(&LivenessReport) + Send + Sync>;

/// Watches the reachability of one bridge.
///
/// At most one probe cycle runs per monitor; restarting aborts the running one.
pub struct LivenessMonitor {
    config: MonitorConfig,
    prober: Arc<dyn Prober>,
    on_status: Option<StatusCallback>,
    reports: Arc<watch::Sender<Option<LivenessReport>>>,
    address: Option<String>,
    task: Option<JoinHandle<()>>,
}

impl LivenessMonitor {
    pub fn new(config: MonitorConfig, prober: Arc<dyn Prober>) -> Self {
        let (reports, _) = watch::channel(None);
        Self {
            config,
            prober,
            on_status: None,
            reports: Arc::new(reports),
            address: None,
            task: None,
        }
    }

    /// Register a callback for status reports. Takes effect on the next start.
    pub fn on_status<F>(self, callback: F) -> Self
    where
        F: Fn(&LivenessReport) + Send + Sync + 'static,
    {
        self.with_callback(Arc::new(callback))
    }

    /// Like [`on_status`](Self::on_status), sharing an existing callback.
    pub fn with_callback(mut self, callback: StatusCallback) -> Self {
        self.on_status = Some(callback);
        self
    }

    /// Start (or restart) monitoring `address`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_monitoring(&mut self, address: impl Into<String>) {
        self.stop();

        let address = address.into();
        if self.address.as_deref() != Some(address.as_str()) {
            // Status of the previous bridge says nothing about this one
            self.reports.send_replace(None);
        }
        tracing::debug!(%address, "liveness monitoring scheduled");

        let cycle = ProbeCycle {
            address: address.clone(),
            config: self.config.clone(),
            prober: self.prober.clone(),
            on_status: self.on_status.clone(),
            reports: self.reports.clone(),
        };
        self.task = Some(tokio::spawn(cycle.run()));
        self.address = Some(address);
    }

    /// Cancel the pending probe cycle, if any.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Address currently (or last) monitored.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Latest classification.
    pub fn status(&self) -> LivenessStatus {
        self.reports
            .borrow()
            .as_ref()
            .map_or(LivenessStatus::Unknown, |report| report.status)
    }

    /// Receive every report as it is published.
    pub fn subscribe(&self) -> watch::Receiver<Option<LivenessReport>> {
        self.reports.subscribe()
    }
}

impl Drop for LivenessMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

struct ProbeCycle {
    address: String,
    config: MonitorConfig,
    prober: Arc<dyn Prober>,
    on_status: Option<StatusCallback>,
    reports: Arc<watch::Sender<Option<LivenessReport>>>,
}

impl ProbeCycle {
    async fn run(self) {
        let mut last = LivenessStatus::Unknown;

        loop {
            sleep(self.config.initial_delay).await;

            let report = self.probe_once().await;
            let status = report.status;
            self.publish(report, last);
            last = status;

            if status == LivenessStatus::Offline {
                sleep(self.config.retry_delay).await;
            }
        }
    }

    /// Race one probe against the guard timer.
    ///
    /// A probe that fails early still waits out the guard, so an unreachable
    /// bridge is retried on the same cadence either way.
    async fn probe_once(&self) -> LivenessReport {
        let guard = Instant::now() + self.config.probe_timeout;
        let probe = self.prober.probe(&self.address);

        let stats = match timeout(self.config.probe_timeout, probe).await {
            Ok(Ok(stats)) => Some(stats),
            Ok(Err(e)) => {
                tracing::debug!(address = %self.address, error = %e, "probe failed");
                sleep_until(guard).await;
                None
            }
            Err(_) => None,
        };

        LivenessReport {
            address: self.address.clone(),
            status: if stats.is_some() {
                LivenessStatus::Online
            } else {
                LivenessStatus::Offline
            },
            stats,
            checked_at: Utc::now(),
        }
    }

    fn publish(&self, report: LivenessReport, previous: LivenessStatus) {
        if report.status != previous {
            tracing::info!(
                address = %report.address,
                status = report.status.as_str(),
                "bridge liveness changed"
            );
        } else {
            tracing::debug!(
                address = %report.address,
                status = report.status.as_str(),
                "bridge liveness unchanged"
            );
        }

        if let Some(callback) = &self.on_status {
            callback(&report);
        }
        self.reports.send_replace(Some(report));
    }
}
