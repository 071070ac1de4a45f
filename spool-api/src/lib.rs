//! Spool API - HTTP surface for the chat thread service.
//!
//! Routes:
//! - `POST /api/chat` — submit a message, get the assistant reply
//! - `GET /api/threads` — the caller's thread summaries, newest first
//! - `GET /api/threads/:token` — one full thread
//! - `DELETE /api/threads/:token` — delete a thread
//! - `GET /health` — liveness check
//!
//! The caller's identity arrives as the `x-owner-id` header, placed by
//! the upstream identity collaborator; this service trusts it and does
//! no credential validation of its own.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod identity;
pub mod routes;

pub use routes::{build_router, AppState};

use std::sync::Arc;

use spool_common::Config;
use spool_core::{
    GeminiGenerator, MemoryThreadStore, ReplyOrchestrator, ThreadIndex, TitleGenerator,
};
use tower_http::cors::{Any, CorsLayer};

/// Wire up production state from the configuration.
pub fn build_state(config: &Config) -> AppState {
    let store = Arc::new(MemoryThreadStore::new());
    let index = Arc::new(ThreadIndex::new(store.clone()));
    let generator = Arc::new(GeminiGenerator::new(&config.generation));
    let titler = TitleGenerator::new(Arc::new(GeminiGenerator::for_titles(&config.generation)));
    let orchestrator = Arc::new(ReplyOrchestrator::new(
        store,
        index.clone(),
        generator,
        titler,
        config.context_window,
    ));

    AppState {
        orchestrator,
        index,
    }
}

/// Start the HTTP server and run until ctrl-c.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(build_state(config)).layer(cors);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Spool API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
    }
    tracing::info!("Shutdown signal received");
}
