//! Per-owner thread index.
//!
//! Keeps the owner-side back-references consistent with the store.
//! Deletion runs as two ordered best-effort steps (store first, then
//! back-reference); a dangling back-reference is treated as already
//! gone and cleaned up lazily on the next read, never as an error.

use std::collections::HashMap;
use std::sync::Arc;

use spool_common::{Error, Result};
use tokio::sync::RwLock;

use crate::store::ThreadStore;
use crate::thread::{OwnerId, Thread, ThreadSummary, ThreadToken};

/// Owner-side thread back-references, newest first.
#[derive(Default)]
struct OwnerDirectory {
    refs: RwLock<HashMap<OwnerId, Vec<ThreadToken>>>,
}

impl OwnerDirectory {
    async fn register(&self, owner: &OwnerId, token: &ThreadToken) {
        let mut refs = self.refs.write().await;
        let tokens = refs.entry(owner.clone()).or_default();
        if !tokens.contains(token) {
            tokens.insert(0, token.clone());
        }
    }

    async fn remove(&self, owner: &OwnerId, token: &ThreadToken) {
        let mut refs = self.refs.write().await;
        if let Some(tokens) = refs.get_mut(owner) {
            tokens.retain(|t| t != token);
        }
    }

    async fn tokens(&self, owner: &OwnerId) -> Vec<ThreadToken> {
        let refs = self.refs.read().await;
        refs.get(owner).cloned().unwrap_or_default()
    }
}

/// Per-owner list of thread summaries, sorted by recency.
pub struct ThreadIndex {
    store: Arc<dyn ThreadStore>,
    owners: OwnerDirectory,
}

impl ThreadIndex {
    pub fn new(store: Arc<dyn ThreadStore>) -> Self {
        Self {
            store,
            owners: OwnerDirectory::default(),
        }
    }

    /// Record a newly created thread against its owner.
    pub async fn register(&self, owner: &OwnerId, token: &ThreadToken) {
        self.owners.register(owner, token).await;
    }

    /// The owner's thread summaries, most-recently-updated first.
    ///
    /// Back-references whose thread no longer exists are skipped and
    /// removed (lazy, idempotent cleanup).
    pub async fn list(&self, owner: &OwnerId) -> Result<Vec<ThreadSummary>> {
        let mut summaries = Vec::new();

        for token in self.owners.tokens(owner).await {
            match self.store.find(&token, owner).await? {
                Some(thread) => summaries.push(thread.summary()),
                None => {
                    tracing::debug!(%token, %owner, "Dropping dangling thread reference");
                    self.owners.remove(owner, &token).await;
                }
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Fetch a full thread for its owner.
    pub async fn get(&self, token: &ThreadToken, owner: &OwnerId) -> Result<Thread> {
        self.store
            .find(token, owner)
            .await?
            .ok_or_else(|| Error::NotFound(format!("thread {token}")))
    }

    /// Delete a thread and its owner back-reference, in that order.
    ///
    /// If the back-reference removal were to fail the reference would
    /// simply dangle until the next `list` cleans it up.
    pub async fn delete(&self, token: &ThreadToken, owner: &OwnerId) -> Result<()> {
        if !self.store.delete(token, owner).await? {
            return Err(Error::NotFound(format!("thread {token}")));
        }

        self.owners.remove(owner, token).await;
        Ok(())
    }
}
