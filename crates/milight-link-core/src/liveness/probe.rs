//! Reachability probes.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};

use crate::config::duration_ms;
use crate::types::ProbeStats;

/// Checks whether a host answers on the network.
///
/// Implementations return round-trip statistics when the host answered at
/// least once, and an error otherwise.
pub trait Prober: Send + Sync + 'static {
    fn probe(&self, address: &str) -> BoxFuture<'static, io::Result<ProbeStats>>;
}

/// TCP connect "ping".
///
/// Measures how long the host takes to accept or refuse a connection. A
/// refusal still proves the host is up, so it counts as a sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TcpProber {
    pub port: u16,
    pub attempts: u32,
    #[serde(with = "duration_ms")]
    pub attempt_timeout: Duration,
}

impl Default for TcpProber {
    fn default() -> Self {
        Self {
            port: 80,
            attempts: 3,
            attempt_timeout: Duration::from_millis(500),
        }
    }
}

impl TcpProber {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    async fn run(self, address: String) -> io::Result<ProbeStats> {
        let ip: IpAddr = address.parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid address '{}'", address),
            )
        })?;
        let target = SocketAddr::new(ip, self.port);

        let mut samples = Vec::with_capacity(self.attempts as usize);
        let mut last_error = None;

        for _ in 0..self.attempts {
            let started = Instant::now();
            match timeout(self.attempt_timeout, TcpStream::connect(target)).await {
                Ok(Ok(_stream)) => samples.push(started.elapsed()),
                Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                    samples.push(started.elapsed())
                }
                Ok(Err(e)) => last_error = Some(e),
                Err(_) => {
                    last_error = Some(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no answer from {} within {:?}", target, self.attempt_timeout),
                    ))
                }
            }
        }

        ProbeStats::from_samples(&samples).ok_or_else(|| {
            last_error.unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::Other, format!("{} was not probed", target))
            })
        })
    }
}

impl Prober for TcpProber {
    fn probe(&self, address: &str) -> BoxFuture<'static, io::Result<ProbeStats>> {
        self.clone().run(address.to_string()).boxed()
    }
}
