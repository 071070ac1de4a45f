//! Thread persistence trait and adapters.

mod memory;

pub use memory::MemoryThreadStore;

use async_trait::async_trait;
use spool_common::Result;

use crate::thread::{Message, OwnerId, Thread, ThreadSummary, ThreadToken};

/// Result of an insert under the `(token, owner)` uniqueness constraint.
///
/// Modeled as a tagged value rather than an error so the concurrent
/// duplicate-create race has an explicit, testable fallback path.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// The thread was created.
    Created,
    /// A thread with this `(token, owner)` already existed; the stored
    /// thread is returned so the caller can fall through to append.
    AlreadyExists(Thread),
}

/// Persistence collaborator for threads and their ordered message lists.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Look up a thread by `(token, owner)`.
    async fn find(&self, token: &ThreadToken, owner: &OwnerId) -> Result<Option<Thread>>;

    /// Insert a new thread under the `(token, owner)` uniqueness
    /// constraint. Never overwrites an existing thread.
    async fn insert_new(&self, thread: &Thread) -> Result<InsertOutcome>;

    /// Append a message to an existing thread, bumping `updated_at`.
    /// Returns the updated thread, or `NotFound` if it does not exist.
    async fn append(
        &self,
        token: &ThreadToken,
        owner: &OwnerId,
        message: Message,
    ) -> Result<Thread>;

    /// All of an owner's thread summaries, most-recently-updated first.
    async fn list_summaries(&self, owner: &OwnerId) -> Result<Vec<ThreadSummary>>;

    /// Delete a thread. Returns whether it existed.
    async fn delete(&self, token: &ThreadToken, owner: &OwnerId) -> Result<bool>;
}
