//! Spool Client - client-side conversation state.
//!
//! Provides:
//! - Session identity: the client-generated thread token
//! - `ChatSession`: explicit optimistic conversation state that is
//!   reconciled against the server's confirmed reply and title
//! - `TypingPlayback`: the cancellable word-by-word reveal of a
//!   completed reply
//! - `ApiClient`: HTTP client for the Spool API

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod client;
pub mod playback;
pub mod session;

pub use client::{ApiClient, ChatReply, ClientConfig, ThreadSummaryView};
pub use playback::{PlaybackState, StartOutcome, Tick, TypingPlayback};
pub use session::{new_thread_token, send_message, ChatSession};
