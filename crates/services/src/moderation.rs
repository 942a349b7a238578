//! Content screening applied before any post or comment is persisted.
//! A static substring blocklist; the moderation workflow around reports
//! lives outside the engine.

use domains::{AppError, Result};
use once_cell::sync::Lazy;

static BANNED_WORDS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["badword", "offensive", "hate", "kill", "attack"]);

/// Maximum content length for posts and comments.
pub const MAX_CONTENT_CHARS: usize = 300;

pub fn contains_banned_words(text: &str) -> bool {
    let lower = text.to_lowercase();
    BANNED_WORDS.iter().any(|word| lower.contains(word))
}

/// Validates user-submitted content: non-empty after trimming, within
/// the length cap, and free of screened words.
pub fn screen_content(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::ValidationError("content must not be empty".into()));
    }
    if text.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::ValidationError(format!(
            "content exceeds {MAX_CONTENT_CHARS} characters"
        )));
    }
    if contains_banned_words(text) {
        return Err(AppError::ValidationError(
            "content contains prohibited words".into(),
        ));
    }
    Ok(())
}
