//! Broadcast discovery of bridges.
//!
//! Sends the discovery request to the broadcast address twice and collects
//! every valid response that arrives within a fixed window.

use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::UdpSocket;
use tokio::time::{sleep_until, Instant};

use crate::config::DiscoveryConfig;
use crate::protocol::{decode_response, encode_discovery_request};
use crate::registry::Registry;
use crate::types::BridgeRecord;

/// Create a broadcast-capable UDP socket bound to an ephemeral port.
pub fn create_discovery_socket() -> Result<std::net::UdpSocket, std::io::Error> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

    socket.set_broadcast(true)?;

    let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
    socket.bind(&addr.into())?;

    socket.set_nonblocking(true)?;

    Ok(socket.into())
}

/// Open the discovery socket and register it with the tokio reactor.
pub(crate) fn open_socket() -> Result<UdpSocket, std::io::Error> {
    UdpSocket::from_std(create_discovery_socket()?)
}

/// Progress of one discovery run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPhase {
    Idle,
    Listening,
    Broadcasting,
    Collecting,
    Done,
}

/// Result of a discovery run.
#[derive(Debug)]
pub enum DiscoveryOutcome {
    /// The window elapsed; holds every distinct bridge that answered.
    Completed(Vec<BridgeRecord>),
    /// The socket could not be opened, so nothing was sent.
    SocketUnavailable(std::io::Error),
}

impl DiscoveryOutcome {
    /// Bridges found, empty when the socket was unavailable.
    pub fn into_bridges(self) -> Vec<BridgeRecord> {
        match self {
            DiscoveryOutcome::Completed(bridges) => bridges,
            DiscoveryOutcome::SocketUnavailable(e) => {
                tracing::warn!(error = %e, "discovery socket unavailable, reporting no bridges");
                Vec::new()
            }
        }
    }
}

/// Runs timed broadcast discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryCoordinator {
    config: DiscoveryConfig,
}

impl DiscoveryCoordinator {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discover bridges for one window and return them.
    ///
    /// Never fails: a socket error degrades to an empty result.
    pub async fn discover(&self) -> Vec<BridgeRecord> {
        self.discover_outcome().await.into_bridges()
    }

    /// Discover bridges, keeping socket setup failure visible to the caller.
    pub async fn discover_outcome(&self) -> DiscoveryOutcome {
        let mut phase = DiscoveryPhase::Idle;
        tracing::debug!(?phase, "starting bridge discovery");

        let socket = match open_socket() {
            Ok(socket) => socket,
            Err(e) => return DiscoveryOutcome::SocketUnavailable(e),
        };

        phase = DiscoveryPhase::Listening;
        tracing::debug!(?phase, local = ?socket.local_addr().ok(), "discovery socket open");

        let start = Instant::now();
        let window = sleep_until(start + self.config.window);
        let retransmit = sleep_until(start + self.config.retransmit_delay);
        tokio::pin!(window);
        tokio::pin!(retransmit);

        let target = SocketAddr::V4(SocketAddrV4::new(
            self.config.broadcast_address,
            self.config.port,
        ));
        let request = encode_discovery_request();

        phase = DiscoveryPhase::Broadcasting;
        tracing::debug!(?phase, %target, "sending discovery request");
        send_request(&socket, &request, target).await;

        phase = DiscoveryPhase::Collecting;
        tracing::debug!(?phase, "collecting responses");

        let mut found = Registry::new();
        let mut retransmitted = false;
        let mut buf = vec![0u8; self.config.recv_buffer_size];

        loop {
            tokio::select! {
                _ = &mut window => break,
                _ = &mut retransmit, if !retransmitted => {
                    retransmitted = true;
                    send_request(&socket, &request, target).await;
                }
                received = socket.recv_from(&mut buf) => match received {
                    Ok((len, from)) => match decode_response(&buf[..len]) {
                        Ok(bridge) => {
                            tracing::info!(
                                address = bridge.address(),
                                mac = bridge.hardware_address(),
                                "bridge found"
                            );
                            found.upsert(bridge);
                        }
                        Err(e) => tracing::trace!(%from, error = %e, "ignoring datagram"),
                    },
                    Err(e) => tracing::warn!(error = %e, "UDP receive error"),
                },
            }
        }

        drop(socket);
        phase = DiscoveryPhase::Done;
        tracing::debug!(?phase, count = found.len(), "discovery finished");

        DiscoveryOutcome::Completed(found.into_records())
    }
}

async fn send_request(socket: &UdpSocket, request: &[u8], target: SocketAddr) {
    match socket.send_to(request, target).await {
        Ok(n) => tracing::trace!(bytes = n, %target, "discovery request sent"),
        Err(e) => tracing::warn!(error = %e, %target, "discovery request send failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_socket_is_ephemeral_and_broadcast() {
        let socket = create_discovery_socket().unwrap();
        assert_ne!(socket.local_addr().unwrap().port(), 0);
        assert!(socket.broadcast().unwrap());
    }

    #[test]
    fn test_outcome_into_bridges() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(DiscoveryOutcome::SocketUnavailable(err)
            .into_bridges()
            .is_empty());

        let bridge = BridgeRecord::new("10.0.0.5", "AC:CF:23:11:22:33");
        let bridges = DiscoveryOutcome::Completed(vec![bridge.clone()]).into_bridges();
        assert_eq!(bridges, vec![bridge]);
    }
}
