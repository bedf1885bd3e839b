//! Shared types for Milight bridges.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::duration_ms;

/// A discovered bridge.
///
/// Fields are fixed at construction; a bridge whose address changes (DHCP)
/// is represented by a new record with the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRecord {
    address: String,
    hardware_address: String,
    identity: String,
}

impl BridgeRecord {
    /// Build a record from an address and a colon-separated hardware address.
    ///
    /// The identity is derived from the hardware address, so two records for
    /// the same bridge always share it.
    pub fn new(address: impl Into<String>, hardware_address: impl Into<String>) -> Self {
        let hardware_address = hardware_address.into();
        let identity = Self::identity_for(&hardware_address);
        Self {
            address: address.into(),
            hardware_address,
            identity,
        }
    }

    /// Derive the identity key for a hardware address.
    pub fn identity_for(hardware_address: &str) -> String {
        hex::encode(hardware_address.as_bytes())
    }

    /// Recover the hardware address an identity was derived from.
    pub fn hardware_address_from_identity(identity: &str) -> Option<String> {
        let bytes = hex::decode(identity).ok()?;
        String::from_utf8(bytes).ok()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn hardware_address(&self) -> &str {
        &self.hardware_address
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// Reachability of a monitored bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LivenessStatus {
    /// No probe has completed yet
    Unknown,
    Online,
    Offline,
}

impl LivenessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LivenessStatus::Unknown => "unknown",
            LivenessStatus::Online => "online",
            LivenessStatus::Offline => "offline",
        }
    }
}

/// Round-trip statistics from one reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeStats {
    #[serde(with = "duration_ms")]
    pub min: Duration,
    #[serde(with = "duration_ms")]
    pub max: Duration,
    #[serde(with = "duration_ms")]
    pub avg: Duration,
}

impl ProbeStats {
    /// Summarise a set of round-trip samples. Returns `None` if there are none.
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        let min = samples.iter().min().copied()?;
        let max = samples.iter().max().copied()?;
        let total: Duration = samples.iter().sum();
        Some(Self {
            min,
            max,
            avg: total / samples.len() as u32,
        })
    }
}

/// One liveness classification published by a monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessReport {
    pub address: String,
    pub status: LivenessStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProbeStats>,
    pub checked_at: DateTime<Utc>,
}
