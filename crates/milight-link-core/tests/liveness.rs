mod common;

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::init_logging;
use futures::future::BoxFuture;
use futures::FutureExt;
use milight_link_core::{
    BridgeManager, DiscoveryConfig, LivenessReport, LivenessStatus, MonitorConfig, ProbeStats,
    Prober, TcpProber,
};
use tokio::net::TcpListener;
use tokio::time::timeout;

fn fast_monitor() -> MonitorConfig {
    MonitorConfig {
        initial_delay: Duration::from_millis(50),
        probe_timeout: Duration::from_millis(200),
        retry_delay: Duration::from_millis(50),
    }
}

struct Unreachable;

impl Prober for Unreachable {
    fn probe(&self, _address: &str) -> BoxFuture<'static, io::Result<ProbeStats>> {
        futures::future::pending::<io::Result<ProbeStats>>().boxed()
    }
}

#[tokio::test]
async fn test_reachable_bridge_reports_online() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let _accept = tokio::spawn(async move {
        loop {
            let _ = listener.accept().await;
        }
    });

    let mut manager = BridgeManager::with_prober(
        DiscoveryConfig::default(),
        fast_monitor(),
        Arc::new(TcpProber::new(port)),
    );
    manager.start_monitoring("127.0.0.1");
    let mut updates = manager.subscribe("127.0.0.1").unwrap();

    timeout(Duration::from_secs(2), updates.changed())
        .await
        .expect("no liveness report")
        .unwrap();

    let report = updates.borrow().clone().unwrap();
    assert_eq!(report.status, LivenessStatus::Online);
    assert!(report.stats.is_some());
    assert_eq!(manager.liveness("127.0.0.1"), LivenessStatus::Online);
}

#[tokio::test]
async fn test_unreachable_bridge_keeps_retrying() {
    init_logging();
    let reports: Arc<Mutex<Vec<LivenessReport>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = reports.clone();

    let mut manager =
        BridgeManager::with_prober(DiscoveryConfig::default(), fast_monitor(), Arc::new(Unreachable))
            .on_status(move |report| sink.lock().unwrap().push(report.clone()));
    manager.start_monitoring("10.0.0.5");

    // Each cycle takes initial + guard + retry = 300ms
    tokio::time::sleep(Duration::from_millis(800)).await;

    let reports = reports.lock().unwrap();
    assert!(reports.len() >= 2, "only {} reports", reports.len());
    assert!(reports
        .iter()
        .all(|r| r.status == LivenessStatus::Offline && r.stats.is_none()));
    assert!(reports.iter().all(|r| r.address == "10.0.0.5"));
    assert!(manager.monitor("10.0.0.5").unwrap().is_running());
}

#[tokio::test]
async fn test_stop_monitoring_ends_reports() {
    init_logging();
    let reports: Arc<Mutex<Vec<LivenessReport>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = reports.clone();

    let mut manager =
        BridgeManager::with_prober(DiscoveryConfig::default(), fast_monitor(), Arc::new(Unreachable))
            .on_status(move |report| sink.lock().unwrap().push(report.clone()));
    manager.start_monitoring("10.0.0.5");
    assert!(manager.stop_monitoring("10.0.0.5"));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_restart_through_manager_keeps_one_cycle() {
    init_logging();
    let reports: Arc<Mutex<Vec<LivenessReport>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = reports.clone();

    let mut manager =
        BridgeManager::with_prober(DiscoveryConfig::default(), fast_monitor(), Arc::new(Unreachable))
            .on_status(move |report| sink.lock().unwrap().push(report.clone()));
    manager.start_monitoring("10.0.0.5");
    manager.start_monitoring("10.0.0.5");
    manager.start_monitoring("10.0.0.5");

    // One cycle reports once at 250ms, a second at 550ms
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(reports.lock().unwrap().len(), 1);
    assert_eq!(manager.monitored().collect::<Vec<_>>(), vec!["10.0.0.5"]);
}
