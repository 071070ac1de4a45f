//! Bounded context windowing over a thread's message history.

use crate::generate::PromptMessage;
use crate::thread::Message;

/// Default number of recent messages sent to the generation collaborator.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Select the last `min(k, len)` messages, oldest-first, mapped to the
/// `{role, content}` shape the generation collaborator expects.
///
/// Pure function: no side effects, no mutation of the source list, and
/// it never crosses thread boundaries because it only sees one thread's
/// messages.
pub fn window(messages: &[Message], k: usize) -> Vec<PromptMessage> {
    let start = messages.len().saturating_sub(k);
    messages[start..].iter().map(PromptMessage::from).collect()
}
