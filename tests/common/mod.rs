//! Common test utilities
//!
//! - `VisionaryTest` spawns a real server on a random port, backed by a
//!   scripted `MockGenerator`
//! - `MockGemini` is a stand-in `generateContent` upstream for exercising
//!   the real `GeminiClient`

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use parking_lot::Mutex;
use reqwest::Client;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use visionary::gemini::{GenerationError, GenerationOutcome, GenerationRequest, ImageGenerator};
use visionary::{Config, Server};

/// Image returned by the mock when nothing else is scripted
pub const MOCK_IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

/// Scripted outcome for one mock call
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Image(String),
    Empty,
    Fail,
    /// Panic inside the generation call
    Panic,
}

/// Image generator that replays scripted outcomes and records requests
#[derive(Default)]
pub struct MockGenerator {
    outcomes: Mutex<VecDeque<MockOutcome>>,
    requests: Mutex<Vec<GenerationRequest>>,
    gate: Option<Arc<Notify>>,
}

impl MockGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Mock that waits for `gate.notify_one()` before answering
    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn push(&self, outcome: MockOutcome) {
        self.outcomes.lock().push_back(outcome);
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ImageGenerator for MockGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        self.requests.lock().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let outcome = self.outcomes.lock().pop_front();
        match outcome.unwrap_or(MockOutcome::Image(MOCK_IMAGE.to_string())) {
            MockOutcome::Image(uri) => Ok(GenerationOutcome::Image(uri)),
            MockOutcome::Empty => Ok(GenerationOutcome::Empty),
            MockOutcome::Fail => Err(GenerationError::Api {
                status: 500,
                body: "mock failure".to_string(),
            }),
            MockOutcome::Panic => panic!("mock generator panicked"),
        }
    }
}

/// Find a free local port
fn free_addr() -> Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Test harness that spawns a real visionary server on a random port
pub struct VisionaryTest {
    pub addr: SocketAddr,
    pub client: Client,
    pub generator: Arc<MockGenerator>,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
}

impl VisionaryTest {
    /// Start a server with a default mock generator
    pub async fn start() -> Result<Self> {
        Self::start_with(MockGenerator::new()).await
    }

    /// Start a server around the given mock generator
    pub async fn start_with(generator: Arc<MockGenerator>) -> Result<Self> {
        let addr = free_addr()?;
        let config = Config {
            bind_addr: addr,
            ..Config::default()
        };

        let server = Arc::new(Server::with_generator(config, generator.clone()));
        let server_clone = server.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            generator,
            server,
            _handle: handle,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// POST with no body
    pub async fn post_empty(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    pub async fn put<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .put(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .delete(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Create an asset in a category and return its id
    pub async fn create_asset(&self, name: &str, category: &str, prompt: &str) -> Result<String> {
        let resp = self
            .post(
                "/assets",
                &serde_json::json!({
                    "name": name,
                    "category": category,
                    "prompt": prompt,
                    "image": "data:image/png;base64,AAAA"
                }),
            )
            .await?;
        anyhow::ensure!(resp.status() == 201, "create asset failed: {}", resp.status());
        let body: serde_json::Value = resp.json().await?;
        Ok(body["id"].as_str().unwrap_or_default().to_string())
    }

    /// Shutdown the server gracefully
    pub fn shutdown(&self) {
        self.server.shutdown();
    }
}

impl Drop for VisionaryTest {
    fn drop(&mut self) {
        self.server.shutdown();
    }
}

/// A request received by the mock upstream
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub path: String,
    pub api_key: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct UpstreamState {
    status: StatusCode,
    body: String,
    calls: Arc<Mutex<Vec<CapturedCall>>>,
}

/// Stand-in Gemini upstream answering every call with a fixed response
pub struct MockGemini {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<CapturedCall>>>,
    _handle: JoinHandle<()>,
}

impl MockGemini {
    /// Respond with a JSON body
    pub async fn start(status: u16, body: serde_json::Value) -> Result<Self> {
        Self::start_raw(status, body.to_string()).await
    }

    /// Respond with a raw body
    pub async fn start_raw(status: u16, body: String) -> Result<Self> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = UpstreamState {
            status: StatusCode::from_u16(status)?,
            body,
            calls: calls.clone(),
        };

        let router = Router::new()
            .route("/v1beta/models/{call}", post(generate_content))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Ok(Self {
            addr,
            calls,
            _handle: handle,
        })
    }

    /// Base URL to configure the client with
    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    pub fn calls(&self) -> Vec<CapturedCall> {
        self.calls.lock().clone()
    }
}

async fn generate_content(
    State(state): State<UpstreamState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, String) {
    state.calls.lock().push(CapturedCall {
        path: call,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    });
    (state.status, state.body.clone())
}
