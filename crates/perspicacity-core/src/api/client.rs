//! Answer service client
//!
//! Issues one POST per session and hands back the raw body stream. Decoding
//! and interpretation happen in the session driver.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{error, info};

use super::types::{Mode, QueryRequest};
use crate::config::ClientConfig;
use crate::constants;
use crate::error::{EngineError, Result};

/// Raw response body as transport chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// An opened response
pub struct AnswerResponse {
    /// Whether the server declared an event stream. Anything else carries no
    /// streamable content.
    pub is_event_stream: bool,
    pub body: ByteStream,
}

impl std::fmt::Debug for AnswerResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerResponse")
            .field("is_event_stream", &self.is_event_stream)
            .finish_non_exhaustive()
    }
}

/// Opens a response for a query. Implemented over HTTP in production and by
/// scripted streams in tests.
#[async_trait]
pub trait AnswerTransport: Send + Sync {
    async fn open(&self, mode: Mode, request: &QueryRequest) -> Result<AnswerResponse>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    http: Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create the HTTP client with settings suited to long-lived streams
    fn create_http_client(config: &ClientConfig) -> Client {
        Client::builder()
            .user_agent(constants::http::USER_AGENT)
            .connect_timeout(config.connect_timeout())
            .timeout(config.stream_timeout())
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build HTTP client: {}. Using default client.", e);
                Client::new()
            })
    }

    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: Self::create_http_client(&config),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl AnswerTransport for HttpTransport {
    async fn open(&self, mode: Mode, request: &QueryRequest) -> Result<AnswerResponse> {
        let url = self.config.endpoint(mode.endpoint_path());
        info!(
            "Sending {} request to {} ({} history messages)",
            mode,
            url,
            request.conversation_history.len()
        );

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        info!("Answer service response: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Answer service error response: {} - {}", status, error_text);
            return Err(EngineError::Status(status.as_u16(), error_text));
        }

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("text/event-stream"))
            .unwrap_or(false);

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(EngineError::from))
            .boxed();

        Ok(AnswerResponse {
            is_event_stream,
            body,
        })
    }
}
