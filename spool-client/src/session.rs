//! Client-side conversation session.
//!
//! The client mints the thread token before the first message is sent,
//! so it can render its own message immediately instead of waiting for
//! a server-assigned id. Local state is optimistic: the human message
//! is appended before the request goes out and reconciled against the
//! server's confirmed reply and title afterwards.

use spool_common::{Error, Result};
use spool_core::{Message, Thread, ThreadToken, DEFAULT_TITLE};
use uuid::Uuid;

use crate::client::{ApiClient, ChatReply};
use crate::playback::{drive, TypingPlayback, DEFAULT_TICK};

/// Mint a fresh thread token.
///
/// Hyphenated v4 UUIDs are 36 chars of `[0-9a-f-]` and always satisfy
/// the token grammar.
pub fn new_thread_token() -> ThreadToken {
    let raw = Uuid::new_v4().to_string();
    ThreadToken::parse(&raw).expect("hyphenated UUIDs satisfy the token grammar")
}

/// Optimistic local view of one conversation.
///
/// At most one turn is in flight at a time. The local message list is a
/// render model, not the source of truth; the server's persisted thread
/// is authoritative and a session can be rebuilt from it at any point.
#[derive(Debug)]
pub struct ChatSession {
    token: ThreadToken,
    title: Option<String>,
    messages: Vec<Message>,
    pending: bool,
}

impl ChatSession {
    /// Start a brand-new conversation with a freshly minted token.
    pub fn new() -> Self {
        Self::with_token(new_thread_token())
    }

    /// Resume a conversation under an existing token.
    pub fn with_token(token: ThreadToken) -> Self {
        Self {
            token,
            title: None,
            messages: Vec::new(),
            pending: false,
        }
    }

    /// Rebuild a session from a server-fetched thread, e.g. when the
    /// user reopens a conversation from the sidebar.
    pub fn from_thread(thread: Thread) -> Self {
        Self {
            token: thread.token,
            title: Some(thread.title),
            messages: thread.messages,
            pending: false,
        }
    }

    pub fn token(&self) -> &ThreadToken {
        &self.token
    }

    /// Server-confirmed title, if a turn has completed yet.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Optimistically record the outgoing human message.
    ///
    /// Rejects empty input locally so a request the server would refuse
    /// anyway is never sent, and refuses to overlap turns.
    pub fn begin_turn(&mut self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("message must not be empty".into()));
        }
        if self.pending {
            return Err(Error::Conflict("a turn is already in flight".into()));
        }
        self.messages.push(Message::human(text));
        self.pending = true;
        Ok(())
    }

    /// Adopt the server-confirmed title for this turn.
    pub fn reconcile(&mut self, reply: &ChatReply) {
        if self.title.is_none() || reply.created {
            self.title = Some(reply.title.clone());
        }
    }

    /// Append the assistant reply once playback has handed it back.
    pub fn commit_reply(&mut self, full: impl Into<String>) {
        self.messages.push(Message::assistant(full));
        self.pending = false;
    }

    /// The request failed after the optimistic append. The human
    /// message stays: the server persists it before generation runs,
    /// so dropping it locally would desync the histories.
    pub fn fail_turn(&mut self) {
        self.pending = false;
    }

    /// Drop local state and mint a new token for the next conversation.
    pub fn new_conversation(&mut self) {
        self.token = new_thread_token();
        self.title = None;
        self.messages.clear();
        self.pending = false;
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one full turn: optimistic append, server round trip, word-by-word
/// reveal, then commit of the complete reply. Returns the reply text.
pub async fn send_message(
    client: &ApiClient,
    session: &mut ChatSession,
    playback: &mut TypingPlayback,
    text: &str,
) -> Result<String> {
    session.begin_turn(text)?;

    let reply = match client.chat(session.token(), text).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(token = %session.token(), error = %e, "Chat turn failed");
            session.fail_turn();
            return Err(e);
        }
    };

    session.reconcile(&reply);

    // Reveal, then commit the full original text to the history. If the
    // playback was cancelled out from under us the reply still commits.
    playback.start(&reply.reply);
    let full = drive(playback, DEFAULT_TICK)
        .await
        .unwrap_or_else(|| reply.reply.clone());
    session.commit_reply(full);

    Ok(reply.reply)
}
