//! Tunables for discovery, pairing and liveness monitoring.
//!
//! Values only; loading them from disk or the environment is left to the
//! embedding application.

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Well-known UDP port bridges listen on for discovery requests
pub const DISCOVERY_PORT: u16 = 48899;

/// Total time discovery listens for responses
pub const DISCOVERY_WINDOW: Duration = Duration::from_millis(3000);

/// Delay before the blind re-broadcast of the discovery request
pub const RETRANSMIT_DELAY: Duration = Duration::from_millis(1500);

/// Time a targeted pairing waits for the first valid response
pub const PAIRING_TIMEOUT: Duration = Duration::from_millis(3000);

/// Discovery and pairing options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryConfig {
    /// Port bridges listen on
    pub port: u16,
    /// Destination for broadcast discovery
    pub broadcast_address: Ipv4Addr,
    #[serde(with = "duration_ms")]
    pub window: Duration,
    #[serde(with = "duration_ms")]
    pub retransmit_delay: Duration,
    #[serde(with = "duration_ms")]
    pub pairing_timeout: Duration,
    /// Receive buffer size for response datagrams
    pub recv_buffer_size: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: DISCOVERY_PORT,
            broadcast_address: Ipv4Addr::BROADCAST,
            window: DISCOVERY_WINDOW,
            retransmit_delay: RETRANSMIT_DELAY,
            pairing_timeout: PAIRING_TIMEOUT,
            recv_buffer_size: 1024,
        }
    }
}

/// Liveness loop timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// Wait before each probe
    #[serde(with = "duration_ms")]
    pub initial_delay: Duration,
    /// Probe guard; a probe still running after this is classified offline
    #[serde(with = "duration_ms")]
    pub probe_timeout: Duration,
    /// Extra wait after an offline classification before rescheduling
    #[serde(with = "duration_ms")]
    pub retry_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(2),
            retry_delay: Duration::from_secs(2),
        }
    }
}

pub(crate) mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
