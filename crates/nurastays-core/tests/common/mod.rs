#![allow(dead_code)]

use std::sync::Arc;

use nurastays_core::auth::{MemoryTokenStore, RecordingRedirect};
use nurastays_core::config::Config;
use nurastays_core::ApiClient;
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub tokens: Arc<MemoryTokenStore>,
    pub redirect: Arc<RecordingRedirect>,
    pub api: ApiClient,
}

pub fn config_for(server: &MockServer) -> Config {
    Config {
        api_url: format!("{}/api", server.uri()),
        timeout_secs: 5,
        ..Config::default()
    }
}

impl Harness {
    pub async fn start(tokens: MemoryTokenStore) -> Self {
        let server = MockServer::start().await;
        let tokens = Arc::new(tokens);
        let redirect = Arc::new(RecordingRedirect::new());
        let api = ApiClient::new(&config_for(&server), tokens.clone())
            .expect("client should build")
            .with_redirect(redirect.clone());
        Self {
            server,
            tokens,
            redirect,
            api,
        }
    }

    /// Requests the mock server saw for `path`
    pub async fn requests_to(&self, path: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == path)
            .collect()
    }
}
