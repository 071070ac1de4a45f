//! In-memory thread store.
//!
//! Backs tests and single-process deployments. The whole map sits
//! behind one `RwLock`, so every operation is atomic with respect to
//! the uniqueness constraint.

use std::collections::HashMap;

use async_trait::async_trait;
use spool_common::{Error, Result};
use tokio::sync::RwLock;

use super::{InsertOutcome, ThreadStore};
use crate::thread::{Message, OwnerId, Thread, ThreadSummary, ThreadToken};

type Key = (OwnerId, ThreadToken);

/// Thread store keeping everything in process memory.
#[derive(Default)]
pub struct MemoryThreadStore {
    threads: RwLock<HashMap<Key, Thread>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(token: &ThreadToken, owner: &OwnerId) -> Key {
        (owner.clone(), token.clone())
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn find(&self, token: &ThreadToken, owner: &OwnerId) -> Result<Option<Thread>> {
        let threads = self.threads.read().await;
        Ok(threads.get(&Self::key(token, owner)).cloned())
    }

    async fn insert_new(&self, thread: &Thread) -> Result<InsertOutcome> {
        let mut threads = self.threads.write().await;
        let key = Self::key(&thread.token, &thread.owner);

        match threads.get(&key) {
            Some(existing) => Ok(InsertOutcome::AlreadyExists(existing.clone())),
            None => {
                threads.insert(key, thread.clone());
                Ok(InsertOutcome::Created)
            }
        }
    }

    async fn append(
        &self,
        token: &ThreadToken,
        owner: &OwnerId,
        message: Message,
    ) -> Result<Thread> {
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(&Self::key(token, owner))
            .ok_or_else(|| Error::NotFound(format!("thread {token}")))?;

        thread.push(message);
        Ok(thread.clone())
    }

    async fn list_summaries(&self, owner: &OwnerId) -> Result<Vec<ThreadSummary>> {
        let threads = self.threads.read().await;
        let mut summaries: Vec<ThreadSummary> = threads
            .values()
            .filter(|t| &t.owner == owner)
            .map(Thread::summary)
            .collect();

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn delete(&self, token: &ThreadToken, owner: &OwnerId) -> Result<bool> {
        let mut threads = self.threads.write().await;
        Ok(threads.remove(&Self::key(token, owner)).is_some())
    }
}
