//! UDP bridge discovery module.
//!
//! Provides timed broadcast discovery and targeted single-bridge pairing.

pub mod pairing;
pub mod service;

pub use pairing::PairingCoordinator;
pub use service::{DiscoveryCoordinator, DiscoveryOutcome, DiscoveryPhase};
