//! Generation collaborator abstraction.
//!
//! The core treats text generation as an opaque function over an
//! ordered `{role, content}` sequence. Failures are transient
//! `Error::Generation` values; the core never retries.

mod gemini;

pub use gemini::GeminiGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use spool_common::Result;

use crate::thread::{Message, Role};

/// A message in the shape the generation collaborator expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for PromptMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Text-generation backend.
///
/// Implementations handle authentication, request formatting, and
/// response parsing for a specific generation API. Output is treated
/// as an opaque string by the core.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate a complete reply for the given context, oldest message
    /// first. The collaborator never streams partial tokens.
    async fn generate(&self, context: &[PromptMessage]) -> Result<String>;

    /// One-shot generation from a bare prompt, used for titling.
    async fn generate_prompt(&self, prompt: &str) -> Result<String> {
        self.generate(&[PromptMessage {
            role: Role::Human,
            content: prompt.to_string(),
        }])
        .await
    }
}
