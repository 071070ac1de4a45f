//! Reply orchestration: the `submit` operation.
//!
//! Composes find-or-create, titling, context windowing, the generation
//! call, and the assistant append into one logical turn.

use std::collections::HashMap;
use std::sync::Arc;

use spool_common::{Error, Result};
use tokio::sync::Mutex;

use crate::context::window;
use crate::generate::Generator;
use crate::index::ThreadIndex;
use crate::store::{InsertOutcome, ThreadStore};
use crate::thread::{Message, OwnerId, Thread, ThreadToken};
use crate::title::TitleGenerator;

/// Result of one successful `submit` call.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The assistant's complete reply.
    pub reply: String,
    /// The thread's title (derived at creation, unchanged afterwards).
    pub title: String,
    /// Whether this call created the thread.
    pub created: bool,
}

/// Drives a submitted message through storage and generation.
///
/// Each `submit` is request-scoped. As a hardening beyond the weak
/// last-writer-wins baseline, submits against the same `(token, owner)`
/// are serialized through a keyed mutex so concurrent appends cannot
/// interleave message order; each entry is pruned again once its turn
/// finishes and no other submit holds it. Creation correctness does not
/// depend on that lock: it rests on the store's uniqueness constraint
/// and the explicit `AlreadyExists` fallback.
pub struct ReplyOrchestrator {
    store: Arc<dyn ThreadStore>,
    index: Arc<ThreadIndex>,
    generator: Arc<dyn Generator>,
    titler: TitleGenerator,
    context_window: usize,
    turn_locks: Mutex<HashMap<(OwnerId, ThreadToken), Arc<Mutex<()>>>>,
}

impl ReplyOrchestrator {
    pub fn new(
        store: Arc<dyn ThreadStore>,
        index: Arc<ThreadIndex>,
        generator: Arc<dyn Generator>,
        titler: TitleGenerator,
        context_window: usize,
    ) -> Self {
        Self {
            store,
            index,
            generator,
            titler,
            context_window,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Record a human message on the thread identified by `token`
    /// (creating it on first contact), generate the assistant's reply
    /// over the recent context, and append it.
    ///
    /// Repeated identical calls are *not* deduplicated; every call is a
    /// new logical turn. If generation fails the human message recorded
    /// here remains persisted and the error is surfaced to the caller.
    pub async fn submit(&self, token: &str, owner: &OwnerId, text: &str) -> Result<TurnOutcome> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("message must not be empty".into()));
        }
        let token = ThreadToken::parse(token)?;

        let lock = self.lock_for(owner, &token).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.run_turn(&token, owner, text).await
        };
        drop(lock);
        self.prune_lock(owner, &token).await;
        outcome
    }

    async fn run_turn(
        &self,
        token: &ThreadToken,
        owner: &OwnerId,
        text: &str,
    ) -> Result<TurnOutcome> {
        let (thread, created) = self.record_human_message(token, owner, text).await?;

        let context = window(&thread.messages, self.context_window);
        let reply = self.generator.generate(&context).await.inspect_err(|e| {
            // The human message stays persisted; only the reply is lost.
            tracing::warn!(%token, error = %e, "Reply generation failed");
        })?;

        self.store
            .append(token, owner, Message::assistant(reply.clone()))
            .await?;

        tracing::info!(%token, %owner, created, "Turn completed");
        Ok(TurnOutcome {
            reply,
            title: thread.title,
            created,
        })
    }

    /// Find-or-create plus the human-message append.
    ///
    /// Returns the thread as of the human append (the state the context
    /// window is built from) and whether this call created it.
    async fn record_human_message(
        &self,
        token: &ThreadToken,
        owner: &OwnerId,
        text: &str,
    ) -> Result<(Thread, bool)> {
        if let Some(_existing) = self.store.find(token, owner).await? {
            let thread = self.store.append(token, owner, Message::human(text)).await?;
            return Ok((thread, false));
        }

        // First contact for this token: derive the title (best effort)
        // and create the thread with the human message as first entry.
        let title = self.titler.derive(text).await;
        let thread = Thread::new(token.clone(), owner.clone(), title, Message::human(text));

        match self.store.insert_new(&thread).await? {
            InsertOutcome::Created => {
                self.index.register(owner, token).await;
                tracing::info!(%token, %owner, title = %thread.title, "Thread created");
                Ok((thread, true))
            }
            InsertOutcome::AlreadyExists(_) => {
                // Lost the creation race: treat as present and append.
                tracing::debug!(%token, %owner, "Concurrent create, falling through to append");
                let thread = self.store.append(token, owner, Message::human(text)).await?;
                Ok((thread, false))
            }
        }
    }

    async fn lock_for(&self, owner: &OwnerId, token: &ThreadToken) -> Arc<Mutex<()>> {
        let mut locks = self.turn_locks.lock().await;
        locks
            .entry((owner.clone(), token.clone()))
            .or_default()
            .clone()
    }

    /// Drop the keyed lock entry once no other submit holds a clone of
    /// it, so the map does not grow with thread churn. A concurrent
    /// submit that already cloned the entry keeps it alive and prunes
    /// it on its own way out.
    async fn prune_lock(&self, owner: &OwnerId, token: &ThreadToken) {
        let mut locks = self.turn_locks.lock().await;
        let key = (owner.clone(), token.clone());
        if let Some(entry) = locks.get(&key) {
            if Arc::strong_count(entry) == 1 {
                locks.remove(&key);
            }
        }
    }
}
