//! Fake bridges for loopback tests.

#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use milight_link_core::config::DiscoveryConfig;
use milight_link_core::protocol::discovery::DISCOVERY_REQUEST;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A UDP responder on 127.0.0.1 that answers every discovery request with a
/// fixed list of replies.
pub struct FakeBridge {
    pub port: u16,
    requests: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl FakeBridge {
    pub async fn spawn(replies: &[&str]) -> Self {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = socket.local_addr().unwrap().port();
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = requests.clone();
        let replies: Vec<Vec<u8>> = replies.iter().map(|r| r.as_bytes().to_vec()).collect();

        let task = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            loop {
                let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                    continue;
                };
                if buf[..len] != DISCOVERY_REQUEST {
                    continue;
                }
                counter.fetch_add(1, Ordering::SeqCst);
                for reply in &replies {
                    let _ = socket.send_to(reply, from).await;
                }
            }
        });

        Self {
            port,
            requests,
            task,
        }
    }

    /// A bridge that listens but never answers.
    pub async fn silent() -> Self {
        Self::spawn(&[]).await
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Discovery settings aimed at this bridge with a short window.
    pub fn config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            port: self.port,
            broadcast_address: Ipv4Addr::LOCALHOST,
            window: Duration::from_millis(600),
            retransmit_delay: Duration::from_millis(200),
            pairing_timeout: Duration::from_millis(400),
            ..DiscoveryConfig::default()
        }
    }
}

impl Drop for FakeBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}
