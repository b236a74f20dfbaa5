//! The assistant backend contract and its implementations.
//!
//! - [`HttpBackend`] - The Pocket AI HTTP API via reqwest
//! - [`MockBackend`] - Scripted responses for tests and offline demos
//!
//! Both endpoints are called at most once per user action; nothing here
//! retries.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use ::async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::time::Duration;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::{CommandRequest, CommandResponse, ConfigSnapshot};

/// Path of the command endpoint.
pub const COMMAND_PATH: &str = "/command";

/// Path of the configuration endpoint.
pub const CONFIG_PATH: &str = "/config";

/// What the client needs from the assistant backend.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// `POST /command` with the user's text.
    async fn send_command(&self, text: &str) -> Result<CommandResponse>;

    /// `GET /config`.
    async fn fetch_config(&self) -> Result<ConfigSnapshot>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============ HTTP Backend ============

/// Backend speaking the Pocket AI HTTP API.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpBackend {
    /// Create a backend from client config.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ClientError::HttpError)?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the status, then decode the body as a JSON object of type `T`.
    async fn decode<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout_secs))?;

        if !status.is_success() {
            return Err(ClientError::from_http_status(status.as_u16(), &body));
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ClientError::malformed(endpoint, e.to_string()))?;
        if !value.is_object() {
            return Err(ClientError::malformed(endpoint, "expected a JSON object"));
        }

        serde_json::from_value(value).map_err(|e| ClientError::malformed(endpoint, e.to_string()))
    }
}

#[async_trait]
impl AssistantBackend for HttpBackend {
    async fn send_command(&self, text: &str) -> Result<CommandResponse> {
        debug!(base_url = %self.base_url, chars = text.len(), "sending command");

        let request = CommandRequest {
            text: text.to_string(),
        };
        let response = self
            .client
            .post(self.url(COMMAND_PATH))
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout_secs))?;

        self.decode(COMMAND_PATH, response).await
    }

    async fn fetch_config(&self) -> Result<ConfigSnapshot> {
        debug!(base_url = %self.base_url, "fetching backend config");

        let response = self
            .client
            .get(self.url(CONFIG_PATH))
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout_secs))?;

        self.decode(CONFIG_PATH, response).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============ Mock Backend ============

/// One scripted command outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this payload
    Respond(CommandResponse),
    /// Fail as if the connection was refused, with this message
    Fail(String),
}

/// Mock backend for testing.
///
/// Command replies are served from a queue; once it drains, the default
/// reply is used. Every call is counted.
pub struct MockBackend {
    replies: Mutex<VecDeque<MockReply>>,
    default_reply: MockReply,
    config: Option<ConfigSnapshot>,
    delay_ms: u64,
    command_calls: AtomicUsize,
    config_calls: AtomicUsize,
}

impl MockBackend {
    /// A backend that answers every command with an empty payload and has no config.
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: MockReply::Respond(CommandResponse::default()),
            config: None,
            delay_ms: 0,
            command_calls: AtomicUsize::new(0),
            config_calls: AtomicUsize::new(0),
        }
    }

    /// Queue a successful reply.
    pub fn with_response(self, response: CommandResponse) -> Self {
        self.push(MockReply::Respond(response));
        self
    }

    /// Queue a successful reply carrying only `response_text`.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_response(CommandResponse {
            response_text: Some(text.into()),
            ..Default::default()
        })
    }

    /// Queue a transport failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(MockReply::Fail(message.into()));
        self
    }

    /// Make every unscripted command fail.
    pub fn failing(mut self) -> Self {
        self.default_reply = MockReply::Fail("mock backend offline".to_string());
        self
    }

    /// Serve `snapshot` from `fetch_config`; without it the fetch fails.
    pub fn with_config(mut self, snapshot: ConfigSnapshot) -> Self {
        self.config = Some(snapshot);
        self
    }

    /// Delay every command reply.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Number of `send_command` calls seen.
    pub fn command_calls(&self) -> usize {
        self.command_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_config` calls seen.
    pub fn config_calls(&self) -> usize {
        self.config_calls.load(Ordering::SeqCst)
    }

    fn push(&self, reply: MockReply) {
        if let Ok(mut queue) = self.replies.lock() {
            queue.push_back(reply);
        }
    }

    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistantBackend for MockBackend {
    async fn send_command(&self, _text: &str) -> Result<CommandResponse> {
        self.command_calls.fetch_add(1, Ordering::SeqCst);

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        match self.next_reply() {
            MockReply::Respond(response) => Ok(response),
            MockReply::Fail(message) => Err(ClientError::ConnectionFailed(message)),
        }
    }

    async fn fetch_config(&self) -> Result<ConfigSnapshot> {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        self.config
            .clone()
            .ok_or_else(|| ClientError::ConnectionFailed("mock backend has no config".to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
