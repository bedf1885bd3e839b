//! Milight bridge discovery and liveness.
//!
//! Finds Milight Wi-Fi bridges on the local network with the UDP discovery
//! protocol on port 48899, pairs with bridges at known addresses, keeps a
//! registry of bridges keyed by hardware address, and monitors whether a
//! bridge is still reachable.

pub mod config;
pub mod discovery;
pub mod error;
pub mod liveness;
pub mod manager;
pub mod protocol;
pub mod registry;
pub mod types;

pub use config::{DiscoveryConfig, MonitorConfig};
pub use discovery::{DiscoveryCoordinator, DiscoveryOutcome, PairingCoordinator};
pub use error::{PairingError, ParseError};
pub use liveness::{LivenessMonitor, Prober, TcpProber};
pub use manager::BridgeManager;
pub use registry::Registry;
pub use types::{BridgeRecord, LivenessReport, LivenessStatus, ProbeStats};
