//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::config::InferenceSettings;
use crate::model::{Amount, Draft, Transaction, TransactionType};
use crate::Config;
use axum::extract::State;
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use chrono::{TimeZone, Utc};
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::Url;

/// Test environment that sets up a ledger home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with the default inference settings.
    pub async fn new() -> Self {
        Self::with_settings(InferenceSettings::default()).await
    }

    /// Creates a test environment whose inference endpoint is `endpoint`.
    pub async fn with_endpoint(endpoint: &Url) -> Self {
        Self::with_settings(InferenceSettings {
            endpoint: Some(endpoint.to_string()),
            timeout_secs: Some(5),
            ..Default::default()
        })
        .await
    }

    async fn with_settings(settings: InferenceSettings) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ledger");
        let config = Config::create(&root, &settings).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Inserts a transaction dated `y-m-d` directly through the ledger and returns it.
    pub async fn insert_test_transaction(
        &self,
        label: &str,
        amount: &str,
        (y, m, d): (i32, u32, u32),
    ) -> Transaction {
        let mut ledger = self.config.ledger().await.unwrap();
        let draft = Draft::new(
            TransactionType::Expense,
            label,
            Amount::from_str(amount).unwrap(),
            Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(),
        );
        ledger.create(draft).await.unwrap()
    }

    /// Reads the transactions currently stored on disk.
    pub async fn stored(&self) -> Vec<Transaction> {
        self.config.ledger().await.unwrap().transactions().to_vec()
    }
}

/// Canned state for `MockInference`.
#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<String>>>,
}

/// A mock inference service that answers `POST /api/generate` with the same canned status and
/// body every time and records the request bodies it received.
pub struct MockInference {
    endpoint: Url,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockInference {
    pub async fn start(status: u16, body: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/api/generate", post(generate))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            endpoint: Url::parse(&format!("http://{addr}/api/generate")).unwrap(),
            requests,
        }
    }

    /// An endpoint on a local port that nothing listens on.
    pub async fn unused_endpoint() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{addr}/api/generate")).unwrap()
    }

    pub fn endpoint(&self) -> Url {
        self.endpoint.clone()
    }

    /// The bodies of all requests received so far.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

async fn generate(
    State(state): State<MockState>,
    request: String,
) -> (StatusCode, [(HeaderName, &'static str); 1], String) {
    state.requests.lock().await.push(request);
    (
        state.status,
        [(CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}
