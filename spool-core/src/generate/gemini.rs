//! Google Gemini generation backend.
//!
//! Calls the `generateContent` endpoint with the windowed conversation
//! context. Authentication comes from the config or the
//! `GEMINI_API_KEY` / `GOOGLE_API_KEY` environment variables.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use spool_common::{Error, GenerationConfig, Result};

use super::{Generator, PromptMessage};
use crate::thread::Role;

/// Gemini generation backend.
pub struct GeminiGenerator {
    api_key: Option<String>,
    client: Client,
    model: String,
    base_url: String,
    temperature: f64,
    max_output_tokens: i64,
}

// ============================================================================
// API request/response types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct ApiGenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: i64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiGenerator {
    /// Create a backend for conversation replies using `config.model`.
    pub fn new(config: &GenerationConfig) -> Self {
        Self::with_model(config, config.model.clone())
    }

    /// Create a backend for title derivation using `config.title_model`.
    pub fn for_titles(config: &GenerationConfig) -> Self {
        Self::with_model(config, config.title_model.clone())
    }

    fn with_model(config: &GenerationConfig, model: String) -> Self {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok());

        Self {
            api_key,
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            model,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// Gemini only accepts "user" and "model" roles.
    fn api_role(role: Role) -> &'static str {
        match role {
            Role::Human => "user",
            Role::Assistant => "model",
        }
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, context: &[PromptMessage]) -> Result<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            Error::Generation(
                "Gemini API key not found. Set GEMINI_API_KEY or configure generation.api_key."
                    .into(),
            )
        })?;

        let contents: Vec<Content> = context
            .iter()
            .map(|msg| Content {
                role: Self::api_role(msg.role).to_string(),
                parts: vec![Part {
                    text: msg.content.clone(),
                }],
            })
            .collect();

        let request = GenerateContentRequest {
            contents,
            generation_config: ApiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Failed to parse response: {e}")))?;

        if let Some(err) = result.error {
            return Err(Error::Generation(format!("API error: {}", err.message)));
        }

        let text = result
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| Error::Generation("No response candidates".into()))?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> GenerationConfig {
        GenerationConfig {
            api_key: Some("test-key".into()),
            base_url,
            ..GenerationConfig::default()
        }
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": text } ] } }
            ]
        })
    }

    #[tokio::test]
    async fn generate_maps_roles_and_extracts_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-lite:generateContent"))
            .and(body_partial_json(serde_json::json!({
                "contents": [
                    { "role": "user", "parts": [ { "text": "Hi" } ] },
                    { "role": "model", "parts": [ { "text": "Hello!" } ] },
                    { "role": "user", "parts": [ { "text": "What is 2+2?" } ] }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("4")))
            .expect(1)
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&test_config(server.uri()));
        let context = vec![
            PromptMessage {
                role: Role::Human,
                content: "Hi".into(),
            },
            PromptMessage {
                role: Role::Assistant,
                content: "Hello!".into(),
            },
            PromptMessage {
                role: Role::Human,
                content: "What is 2+2?".into(),
            },
        ];

        let reply = generator.generate(&context).await.unwrap();
        assert_eq!(reply, "4");
    }

    #[tokio::test]
    async fn http_error_becomes_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&test_config(server.uri()));
        let err = generator.generate_prompt("Hi").await.unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn error_in_response_body_becomes_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": { "message": "model overloaded" }
            })))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&test_config(server.uri()));
        let err = generator.generate_prompt("Hi").await.unwrap_err();
        assert!(err.to_string().contains("model overloaded"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let config = GenerationConfig {
            api_key: None,
            base_url: "http://127.0.0.1:1".into(),
            ..GenerationConfig::default()
        };
        // Only meaningful when the environment carries no fallback key.
        if std::env::var("GEMINI_API_KEY").is_ok() || std::env::var("GOOGLE_API_KEY").is_ok() {
            return;
        }
        let generator = GeminiGenerator::new(&config);
        let err = generator.generate_prompt("Hi").await.unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[tokio::test]
    async fn title_backend_uses_title_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("A Title")))
            .expect(1)
            .mount(&server)
            .await;

        let generator = GeminiGenerator::for_titles(&test_config(server.uri()));
        let reply = generator.generate_prompt("first message").await.unwrap();
        assert_eq!(reply, "A Title");
    }
}
