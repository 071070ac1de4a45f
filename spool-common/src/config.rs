//! Configuration management for the Spool chat service.
//!
//! All Spool binaries share a single configuration file at
//! `~/.spool/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Explicit config file values
//! 2. Environment variables (SPOOL_* prefix)
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `SPOOL_PORT` → server.port
//! - `SPOOL_BIND_ADDRESS` → server.bind
//! - `SPOOL_LOG_LEVEL` → observability.log_level
//! - `GEMINI_API_KEY` / `GOOGLE_API_KEY` → generation.api_key

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".spool"),
        |dirs| dirs.home_dir().join(".spool"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address. Default: "127.0.0.1" (local only)
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            port: default_port(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8000
}

// ============================================================================
// Generation Configuration
// ============================================================================

/// Text-generation collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model used for conversation replies.
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used for one-shot title derivation.
    #[serde(default = "default_title_model")]
    pub title_model: String,

    /// API key. Falls back to GEMINI_API_KEY / GOOGLE_API_KEY env vars.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL. Overridable for tests against a local mock.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature (0.0 - 1.0).
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Hard cap on generated tokens per reply.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: i64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            title_model: default_title_model(),
            api_key: None,
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash-lite".into()
}

fn default_title_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_output_tokens() -> i64 {
    8192
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "json" or "pretty".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Unified configuration for Spool services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Text-generation collaborator settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Number of recent messages sent as context to generation.
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Client-side playback tick interval in milliseconds.
    #[serde(default = "default_playback_tick_ms")]
    pub playback_tick_ms: u64,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            generation: GenerationConfig::default(),
            context_window: default_context_window(),
            playback_tick_ms: default_playback_tick_ms(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_context_window() -> usize {
    10
}

fn default_playback_tick_ms() -> u64 {
    40
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific path. Env overrides are not applied.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("SPOOL_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(bind) = std::env::var("SPOOL_BIND_ADDRESS") {
            self.server.bind = bind;
        }
        if let Ok(level) = std::env::var("SPOOL_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if self.generation.api_key.is_none() {
            self.generation.api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .ok();
        }
    }

    /// Address the HTTP server binds to, as "host:port".
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}
