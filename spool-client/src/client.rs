//! HTTP client for the Spool API.
//!
//! Thin typed wrapper over the service routes. Failures carry the
//! server's error code so callers can tell a transient generation
//! failure from anything else; the client performs no retries because
//! `submit` is not idempotent.

use serde::{Deserialize, Serialize};
use spool_common::{Error, Result};
use spool_core::{Thread, ThreadToken};

/// Default endpoint for a local Spool API.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Spool API endpoint.
    pub endpoint: String,
    /// Owner id forwarded as the identity header. In production this is
    /// injected by the identity collaborator instead.
    pub owner_id: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            owner_id: owner_id.into(),
            timeout_secs: 180,
        }
    }
}

/// Server-confirmed outcome of one chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub title: String,
    pub created: bool,
}

/// One sidebar entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummaryView {
    pub token: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    token: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListThreadsBody {
    threads: Vec<ThreadSummaryView>,
}

#[derive(Debug, Deserialize)]
struct ThreadBody {
    thread: Thread,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

/// Typed Spool API client.
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    /// Submit a message on a thread and wait for the complete reply.
    pub async fn chat(&self, token: &ThreadToken, message: &str) -> Result<ChatReply> {
        let url = format!("{}/api/chat", self.config.endpoint);
        let response = self
            .http
            .post(&url)
            .header("x-owner-id", &self.config.owner_id)
            .json(&ChatRequestBody {
                token: token.as_str(),
                message,
            })
            .send()
            .await
            .map_err(transport_error)?;

        Self::parse(response).await
    }

    /// The caller's thread summaries, most recently updated first.
    pub async fn threads(&self) -> Result<Vec<ThreadSummaryView>> {
        let url = format!("{}/api/threads", self.config.endpoint);
        let response = self
            .http
            .get(&url)
            .header("x-owner-id", &self.config.owner_id)
            .send()
            .await
            .map_err(transport_error)?;

        let body: ListThreadsBody = Self::parse(response).await?;
        Ok(body.threads)
    }

    /// Fetch a full thread for history replay.
    pub async fn thread(&self, token: &ThreadToken) -> Result<Thread> {
        let url = format!("{}/api/threads/{}", self.config.endpoint, token);
        let response = self
            .http
            .get(&url)
            .header("x-owner-id", &self.config.owner_id)
            .send()
            .await
            .map_err(transport_error)?;

        let body: ThreadBody = Self::parse(response).await?;
        Ok(body.thread)
    }

    /// Delete a thread.
    pub async fn delete_thread(&self, token: &ThreadToken) -> Result<()> {
        let url = format!("{}/api/threads/{}", self.config.endpoint, token);
        let response = self
            .http
            .delete(&url)
            .header("x-owner-id", &self.config.owner_id)
            .send()
            .await
            .map_err(transport_error)?;

        let _: serde_json::Value = Self::parse(response).await?;
        Ok(())
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| Error::Persistence(format!("Invalid response body: {e}")));
        }

        // Map the server's envelope back onto the shared error type.
        let body = response.text().await.unwrap_or_default();
        let envelope: ErrorBody = serde_json::from_str(&body).unwrap_or(ErrorBody {
            error: format!("HTTP {}", status.as_u16()),
            code: "INTERNAL".into(),
        });

        Err(match envelope.code.as_str() {
            "INVALID_INPUT" => Error::InvalidInput(envelope.error),
            "NOT_FOUND" => Error::NotFound(envelope.error),
            "UNAUTHORIZED" => Error::Unauthorized(envelope.error),
            "GENERATION_FAILED" => Error::Generation(envelope.error),
            _ => Error::Persistence(envelope.error),
        })
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    Error::Persistence(format!("Request failed: {e}"))
}
