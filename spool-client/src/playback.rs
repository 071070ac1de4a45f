//! Typing playback: cancellable word-by-word reveal of a complete reply.
//!
//! The server never streams partial tokens; playback is purely a
//! client-side animation over an already-complete string. The transient
//! buffer is cosmetic and never the source of truth for message order
//! or content — that role belongs to the persisted message list.
//!
//! At most one playback is active per conversation view. Starting a new
//! playback cancels any in-flight one synchronously, before the new
//! state is initialized, so two tick sources can never write into the
//! same buffer.

use std::time::Duration;

/// Default reveal interval, matching one word per 40ms.
pub const DEFAULT_TICK: Duration = Duration::from_millis(40);

/// Playback lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// What `start` replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// No playback was running.
    Started,
    /// A prior playback was still revealing and has been cancelled.
    SupersededPrior,
}

/// Result of advancing the playback by one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Nothing is playing.
    Idle,
    /// The visible prefix grew by one word.
    Revealed,
    /// All words are shown; the full reply is handed back for the
    /// permanent history and the transient buffer has been cleared.
    Completed(String),
}

/// Cooperative, single-threaded reveal state machine.
///
/// The owner drives it from a timer loop; the only suspension points
/// are between ticks, and cancellation is synchronous.
#[derive(Debug)]
pub struct TypingPlayback {
    state: PlaybackState,
    full: String,
    tokens: Vec<String>,
    shown: usize,
    buffer: String,
}

impl Default for TypingPlayback {
    fn default() -> Self {
        Self {
            state: PlaybackState::Idle,
            full: String::new(),
            tokens: Vec::new(),
            shown: 0,
            buffer: String::new(),
        }
    }
}

impl TypingPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The transient reveal buffer. Cosmetic only.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Begin revealing `reply`, cancelling any in-flight playback
    /// first. The cancellation completes before the new playback's
    /// state is initialized.
    pub fn start(&mut self, reply: &str) -> StartOutcome {
        let outcome = match self.state {
            PlaybackState::Playing => StartOutcome::SupersededPrior,
            PlaybackState::Idle => StartOutcome::Started,
        };

        self.cancel();
        self.state = PlaybackState::Playing;
        self.full = reply.to_string();
        self.tokens = reply.split_whitespace().map(String::from).collect();
        outcome
    }

    /// Synchronously stop and clear the transient state.
    pub fn cancel(&mut self) {
        self.state = PlaybackState::Idle;
        self.full.clear();
        self.tokens.clear();
        self.shown = 0;
        self.buffer.clear();
    }

    /// Advance by one tick: reveal the next word, or complete.
    ///
    /// On the tick that shows the last word the full original text is
    /// returned for the permanent history and the buffer is cleared.
    pub fn tick(&mut self) -> Tick {
        if self.state == PlaybackState::Idle {
            return Tick::Idle;
        }

        self.shown = (self.shown + 1).min(self.tokens.len());
        self.buffer = self.tokens[..self.shown].join(" ");

        if self.shown >= self.tokens.len() {
            let full = std::mem::take(&mut self.full);
            self.cancel();
            Tick::Completed(full)
        } else {
            Tick::Revealed
        }
    }
}

/// Drive a playback to completion on a fixed-interval timer.
///
/// Returns the full reply once all words are shown, or `None` if the
/// playback was cancelled out from under the driver.
pub async fn drive(playback: &mut TypingPlayback, tick_interval: Duration) -> Option<String> {
    let mut interval = tokio::time::interval(tick_interval);
    loop {
        interval.tick().await;
        match playback.tick() {
            Tick::Idle => return None,
            Tick::Revealed => {}
            Tick::Completed(full) => return Some(full),
        }
    }
}
