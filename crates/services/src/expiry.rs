//! # ExpiryFilter
//!
//! Time-bounded visibility for ghost content. Expired items are hidden,
//! not deleted: every read path consults this filter so a ghost post
//! vanishes from lists and single-item fetches at the same instant.

use chrono::{DateTime, Utc};
use domains::Post;

/// Visibility rule for an optional expiry stamp. Permanent content
/// (no stamp) is always visible; a stamped item is visible strictly
/// before its stamp. `now == expires_at` is already invisible.
pub fn is_visible_at(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expires_at {
        None => true,
        Some(expiry) => now < expiry,
    }
}

/// Convenience wrapper for posts.
pub fn post_visible(post: &Post, now: DateTime<Utc>) -> bool {
    is_visible_at(post.expires_at, now)
}
