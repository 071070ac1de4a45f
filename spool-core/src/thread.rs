//! Thread types: tokens, messages, and the persisted thread record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spool_common::{Error, Result};

/// Identifier of the owning user, supplied by the identity collaborator.
pub type OwnerId = String;

/// Token length bounds accepted as well-formed.
const TOKEN_MIN_LEN: usize = 8;
const TOKEN_MAX_LEN: usize = 128;

/// Client-generated conversation identifier.
///
/// Generated before the first message of a new conversation is sent, so
/// the client can render its own message without waiting for a
/// server-assigned id. Unique per owner, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadToken(String);

impl ThreadToken {
    /// Parse a raw token, rejecting malformed input before it reaches
    /// storage. Accepts 8-128 chars of `[A-Za-z0-9_-]`, which covers
    /// hyphenated UUIDs and URL-safe random identifiers.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.len() < TOKEN_MIN_LEN || raw.len() > TOKEN_MAX_LEN {
            return Err(Error::InvalidInput(format!(
                "thread token must be {TOKEN_MIN_LEN}-{TOKEN_MAX_LEN} characters, got {}",
                raw.len()
            )));
        }
        if !raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(Error::InvalidInput(
                "thread token contains invalid characters".into(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThreadToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ThreadToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Role of a message within a thread.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Human,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn stored in strict append order within a thread.
///
/// Messages are never reordered or individually deleted; only
/// whole-thread deletion is supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A persisted conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    /// Client-generated token, unique within the owner's scope.
    pub token: ThreadToken,
    /// Owning user.
    pub owner: OwnerId,
    /// Set once at creation.
    pub title: String,
    /// Append-only message list; order equals submission order.
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    /// Monotonically non-decreasing; bumped on every append.
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    /// Create a thread with the first human message as its only entry.
    pub fn new(
        token: ThreadToken,
        owner: impl Into<OwnerId>,
        title: impl Into<String>,
        first_message: Message,
    ) -> Self {
        let now = Utc::now();
        Self {
            token,
            owner: owner.into(),
            title: title.into(),
            messages: vec![first_message],
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`, never moving it backwards.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Per-owner summary used by the thread index.
    pub fn summary(&self) -> ThreadSummary {
        ThreadSummary {
            token: self.token.clone(),
            title: self.title.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Lightweight view of a thread for sidebar-style listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub token: ThreadToken,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}
