//! Spool Common - Shared types for the Spool chat service.
//!
//! This crate provides:
//! - The unified error type used across all Spool crates
//! - Configuration types and loading
//! - Logging setup with noise suppression

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, GenerationConfig, ObservabilityConfig, ServerConfig};
pub use error::{Error, Result};
pub use logging::init_logging;
