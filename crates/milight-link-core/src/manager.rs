//! Bridge manager.
//!
//! Owns the registry of known bridges and ties discovery, pairing and
//! liveness monitoring together for an embedding application. Create one
//! per process (or per network) and pass it where it is needed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;

use crate::config::{DiscoveryConfig, MonitorConfig};
use crate::discovery::{DiscoveryCoordinator, PairingCoordinator};
use crate::error::PairingError;
use crate::liveness::{LivenessMonitor, Prober, StatusCallback, TcpProber};
use crate::registry::Registry;
use crate::types::{BridgeRecord, LivenessReport, LivenessStatus};

/// Entry point for discovering, pairing and monitoring bridges.
pub struct BridgeManager {
    registry: Registry,
    discovery: DiscoveryCoordinator,
    pairing: PairingCoordinator,
    monitor_config: MonitorConfig,
    prober: Arc<dyn Prober>,
    on_status: Option<StatusCallback>,
    /// One monitor per bridge address
    monitors: HashMap<String, LivenessMonitor>,
}

impl BridgeManager {
    pub fn new(config: DiscoveryConfig, monitor_config: MonitorConfig) -> Self {
        Self::with_prober(config, monitor_config, Arc::new(TcpProber::default()))
    }

    /// Create a manager that probes liveness with `prober`.
    pub fn with_prober(
        config: DiscoveryConfig,
        monitor_config: MonitorConfig,
        prober: Arc<dyn Prober>,
    ) -> Self {
        Self {
            registry: Registry::new(),
            discovery: DiscoveryCoordinator::new(config.clone()),
            pairing: PairingCoordinator::new(config),
            monitor_config,
            prober,
            on_status: None,
            monitors: HashMap::new(),
        }
    }

    /// Report every liveness classification of every monitored bridge to `callback`.
    ///
    /// Applies to monitors started afterwards.
    pub fn on_status<F>(mut self, callback: F) -> Self
    where
        F: Fn(&LivenessReport) + Send + Sync + 'static,
    {
        self.on_status = Some(Arc::new(callback));
        self
    }

    /// Broadcast for bridges and merge them into the registry.
    ///
    /// Returns the bridges that answered during this run; an empty list if
    /// none did or the socket could not be opened.
    pub async fn discover(&mut self) -> Vec<BridgeRecord> {
        let found = self.discovery.discover().await;
        for bridge in &found {
            self.registry.upsert(bridge.clone());
        }
        tracing::info!(
            found = found.len(),
            known = self.registry.len(),
            "bridge discovery complete"
        );
        found
    }

    /// Pair with the bridge at `address` and remember it.
    pub async fn pair(&mut self, address: &str) -> Result<BridgeRecord, PairingError> {
        let bridge = self.pairing.pair(address).await?;
        self.registry.upsert(bridge.clone());
        Ok(bridge)
    }

    /// Find a known bridge by identity.
    pub fn lookup(&self, identity: &str) -> Option<&BridgeRecord> {
        self.registry.lookup(identity)
    }

    /// All known bridges.
    pub fn bridges(&self) -> &[BridgeRecord] {
        self.registry.records()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Start monitoring `address`, restarting its cycle if already monitored.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_monitoring(&mut self, address: &str) {
        let monitor = self.monitors.entry(address.to_string()).or_insert_with(|| {
            let monitor =
                LivenessMonitor::new(self.monitor_config.clone(), self.prober.clone());
            match &self.on_status {
                Some(callback) => monitor.with_callback(callback.clone()),
                None => monitor,
            }
        });
        monitor.start_monitoring(address);
    }

    /// Stop monitoring `address`. Returns false if it was not monitored.
    pub fn stop_monitoring(&mut self, address: &str) -> bool {
        self.monitors.remove(address).is_some()
    }

    /// Latest liveness of `address`; `Unknown` if it is not monitored.
    pub fn liveness(&self, address: &str) -> LivenessStatus {
        self.monitors
            .get(address)
            .map_or(LivenessStatus::Unknown, LivenessMonitor::status)
    }

    /// Follow the reports for a monitored address.
    pub fn subscribe(&self, address: &str) -> Option<watch::Receiver<Option<LivenessReport>>> {
        self.monitors.get(address).map(LivenessMonitor::subscribe)
    }

    pub fn monitor(&self, address: &str) -> Option<&LivenessMonitor> {
        self.monitors.get(address)
    }

    /// Addresses currently monitored.
    pub fn monitored(&self) -> impl Iterator<Item = &str> {
        self.monitors.keys().map(String::as_str)
    }
}

impl Default for BridgeManager {
    fn default() -> Self {
        Self::new(DiscoveryConfig::default(), MonitorConfig::default())
    }
}
