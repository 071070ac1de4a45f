//! Spool Core - conversational-thread synchronization.
//!
//! Provides the server-side core of the chat service:
//! - Durable, ordered threads keyed by a client-generated token
//! - A `ThreadStore` trait with an in-memory adapter
//! - Bounded context windowing over the recent message history
//! - One-shot thread title derivation
//! - The reply orchestrator that ties a submitted message, the store,
//!   and the generation collaborator together
//! - A per-owner thread index with lazy back-reference cleanup
//!
//! ## Example
//!
//! ```ignore
//! use spool_core::{MemoryThreadStore, ReplyOrchestrator, ThreadIndex};
//!
//! let store = Arc::new(MemoryThreadStore::new());
//! let index = Arc::new(ThreadIndex::new(store.clone()));
//! let orchestrator = ReplyOrchestrator::new(store, index, generator, titler, 10);
//!
//! let outcome = orchestrator.submit(&token, &owner, "Hi").await?;
//! println!("{}: {}", outcome.title, outcome.reply);
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod context;
pub mod generate;
pub mod index;
pub mod orchestrator;
pub mod store;
pub mod thread;
pub mod title;

pub use context::{window, DEFAULT_CONTEXT_WINDOW};
pub use generate::{GeminiGenerator, Generator, PromptMessage};
pub use index::ThreadIndex;
pub use orchestrator::{ReplyOrchestrator, TurnOutcome};
pub use store::{InsertOutcome, MemoryThreadStore, ThreadStore};
pub use thread::{Message, OwnerId, Role, Thread, ThreadSummary, ThreadToken};
pub use title::{TitleGenerator, DEFAULT_TITLE};
