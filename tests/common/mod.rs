//! Shared utilities for integration testing.

use pistachio::{Capabilities, Pistachio, PistachioConfig, RunningServer};

/// A live server on an ephemeral port plus a client pointed at it.
pub struct TestServer {
    pub running: RunningServer,
    pub client: reqwest::Client,
    base: String,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

/// Start a server with `config` and `capabilities` on a free port.
pub async fn spawn(mut config: PistachioConfig, capabilities: Capabilities) -> TestServer {
    config.port = 0;
    let running = Pistachio::new(config, capabilities)
        .unwrap()
        .start()
        .await
        .unwrap();
    let base = format!("http://127.0.0.1:{}", running.local_addr().port());

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap();

    TestServer {
        running,
        client,
        base,
    }
}
