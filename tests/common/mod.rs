//! Shared utilities for integration tests.

#![allow(dead_code)]

use api_proxy::config::ProxyConfig;
use api_proxy::proxy::{FailureObserver, ProxyFailure};
use api_proxy::{HttpServer, Shutdown};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Start a mock upstream serving `app` on an ephemeral port.
pub async fn start_upstream(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Proxy config pointing at `upstream`, serving static files from `root`.
pub fn config_for(upstream: SocketAddr, root: &Path) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.bind_host = "127.0.0.1".to_string();
    config.port = 0;
    config.root = root.to_string_lossy().into_owned();
    config.api.scheme = "http".to_string();
    config.api.host = upstream.to_string();
    config
}

/// Observer that remembers the kind of every failure reported.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    kinds: Mutex<Vec<&'static str>>,
}

impl RecordingObserver {
    pub fn kinds(&self) -> Vec<&'static str> {
        self.kinds.lock().unwrap().clone()
    }
}

impl FailureObserver for RecordingObserver {
    fn report(&self, failure: &ProxyFailure) {
        self.kinds.lock().unwrap().push(failure.kind());
    }
}

/// A running proxy under test.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub observer: Arc<RecordingObserver>,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy with a recording observer on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> TestProxy {
    let observer = Arc::new(RecordingObserver::default());
    let server = HttpServer::with_observer(config, observer.clone()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy {
        addr,
        observer,
        shutdown,
    }
}

/// Client that never goes through a system proxy and keeps no cookies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// Scratch directory unique to this test process and `name`.
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("api-proxy-it-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
