//! Bridge liveness monitoring.
//!
//! A monitor periodically probes one bridge and reports whether it is online.

pub mod monitor;
pub mod probe;

pub use monitor::{LivenessMonitor, StatusCallback};
pub use probe::{Prober, TcpProber};
