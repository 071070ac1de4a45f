//! One-shot thread title derivation.
//!
//! Invoked exactly once, at thread creation, with the first human
//! message. Best effort: any failure degrades to the default title and
//! never fails thread creation.

use std::sync::Arc;

use crate::generate::Generator;

/// Title used when derivation fails or produces nothing usable.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Hard cap on derived title length, in characters.
pub const TITLE_MAX_CHARS: usize = 50;

/// Characters that end a title; anything after the first one is dropped.
const TITLE_TERMINATORS: &[char] = &[':', '.', ';', '!', '?'];

fn title_prompt(first_message: &str) -> String {
    format!(
        "Generate ONE concise, clear, descriptive title (max 6 words) for this conversation:\n\
         \"{first_message}\"\n\
         Return ONLY the title. Do NOT add explanations, options, or extra text."
    )
}

/// Clean up a raw generated title: collapse whitespace runs to single
/// spaces, cut at the first terminator, and hard-truncate to
/// [`TITLE_MAX_CHARS`]. May return an empty string; the caller falls
/// back to [`DEFAULT_TITLE`].
pub fn sanitize_title(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut title = match collapsed.find(TITLE_TERMINATORS) {
        Some(idx) => collapsed[..idx].trim_end().to_string(),
        None => collapsed,
    };

    if let Some((idx, _)) = title.char_indices().nth(TITLE_MAX_CHARS) {
        title.truncate(idx);
        let trimmed = title.trim_end().len();
        title.truncate(trimmed);
    }
    title
}

/// Derives a short thread title from the first human message.
pub struct TitleGenerator {
    generator: Arc<dyn Generator>,
}

impl TitleGenerator {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Derive a title. Infallible by design: generation failures and
    /// empty results yield [`DEFAULT_TITLE`].
    pub async fn derive(&self, first_message: &str) -> String {
        let raw = match self
            .generator
            .generate_prompt(&title_prompt(first_message))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Title generation failed, using default");
                return DEFAULT_TITLE.to_string();
            }
        };

        let title = sanitize_title(&raw);
        if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title
        }
    }
}
