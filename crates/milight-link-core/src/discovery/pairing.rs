//! Targeted pairing with a single bridge.
//!
//! Sends one unicast discovery request and settles on the first valid answer.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::time::timeout;

use super::service::open_socket;
use crate::config::DiscoveryConfig;
use crate::error::PairingError;
use crate::protocol::{decode_response, encode_discovery_request};
use crate::types::BridgeRecord;

/// Pairs with a bridge at a known address.
#[derive(Debug, Clone, Default)]
pub struct PairingCoordinator {
    config: DiscoveryConfig,
}

impl PairingCoordinator {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Pair with a bridge given as a dotted-quad string.
    pub async fn pair(&self, target: &str) -> Result<BridgeRecord, PairingError> {
        let ip: IpAddr = target
            .trim()
            .parse()
            .map_err(|_| PairingError::InvalidAddress(target.to_string()))?;
        self.pair_ip(ip).await
    }

    /// Pair with a bridge at `target`.
    ///
    /// Bridges only speak IPv4; an IPv6 target is rejected before any socket
    /// is opened. The socket is dropped as soon as the first valid response
    /// arrives or the timeout expires, so later answers are never read.
    pub async fn pair_ip(&self, target: IpAddr) -> Result<BridgeRecord, PairingError> {
        let target: Ipv4Addr = match target {
            IpAddr::V4(v4) => v4,
            IpAddr::V6(v6) => return Err(PairingError::InvalidAddress(v6.to_string())),
        };
        tracing::info!(%target, "starting bridge pairing");

        let socket = open_socket()?;
        let dest = SocketAddr::new(IpAddr::V4(target), self.config.port);
        socket.send_to(&encode_discovery_request(), dest).await?;

        let mut buf = vec![0u8; self.config.recv_buffer_size];
        let first_response = async {
            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((len, from)) => match decode_response(&buf[..len]) {
                        Ok(bridge) => return bridge,
                        Err(e) => tracing::trace!(%from, error = %e, "ignoring datagram"),
                    },
                    Err(e) => tracing::warn!(error = %e, "UDP receive error"),
                }
            }
        };

        match timeout(self.config.pairing_timeout, first_response).await {
            Ok(bridge) => {
                tracing::info!(
                    address = bridge.address(),
                    mac = bridge.hardware_address(),
                    "bridge paired"
                );
                Ok(bridge)
            }
            Err(_) => {
                tracing::warn!(%target, "bridge pairing timed out");
                Err(PairingError::Timeout(self.config.pairing_timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_rejects_ipv6_target() {
        let coordinator = PairingCoordinator::default();
        let err = coordinator.pair("::1").await.unwrap_err();
        assert!(matches!(err, PairingError::InvalidAddress(ref s) if s == "::1"));

        let err = coordinator
            .pair_ip(IpAddr::V6(std::net::Ipv6Addr::LOCALHOST))
            .await
            .unwrap_err();
        assert!(matches!(err, PairingError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_pair_rejects_invalid_address() {
        let coordinator = PairingCoordinator::default();
        let err = coordinator.pair("not-an-ip").await.unwrap_err();
        assert!(matches!(err, PairingError::InvalidAddress(ref s) if s == "not-an-ip"));
    }
}
