//! # FeedComposer
//!
//! The read pipeline: expiry filter, then geofence, then recency order,
//! with authoritative scores attached last. Score never reorders the
//! feed; it is display data. A viewer without coordinates gets an
//! explicit "location required" failure, never a silently unscoped or
//! empty feed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{AppError, FeedHints, GeoPoint, Post, PostStore, Result, VoteSubject};
use tracing::debug;

use crate::{expiry, geo, VoteService};

#[derive(Clone)]
pub struct FeedComposer {
    posts: Arc<dyn PostStore>,
    votes: VoteService,
}

impl FeedComposer {
    pub fn new(posts: Arc<dyn PostStore>, votes: VoteService) -> Self {
        FeedComposer { posts, votes }
    }

    /// Composes the visible, ordered feed for a viewer at a location.
    ///
    /// Posts scoped to a community bypass the radius check (membership
    /// implies visibility) but still pass through the expiry filter.
    pub async fn compose(
        &self,
        viewer: Option<GeoPoint>,
        now: DateTime<Utc>,
        radius_meters: f64,
        hints: FeedHints,
    ) -> Result<Vec<Post>> {
        let viewer = viewer.ok_or_else(|| {
            AppError::ValidationError("viewer location required to scope the feed".into())
        })?;
        viewer.validate()?;
        if !(radius_meters > 0.0) {
            return Err(AppError::ValidationError(format!(
                "feed radius must be positive, got {radius_meters}"
            )));
        }

        let candidates = self
            .posts
            .list_candidate_posts(hints.clone())
            .await
            .map_err(AppError::internal)?;
        let fetched = candidates.len();

        let mut visible: Vec<Post> = candidates
            .into_iter()
            .filter(|post| expiry::post_visible(post, now))
            .filter(|post| {
                post.community_id.is_some()
                    || geo::within_radius(post.location, viewer, radius_meters)
            })
            .collect();

        // Most recent first; stable sort keeps store order on ties.
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = hints.limit {
            visible.truncate(limit.max(0) as usize);
        }

        for post in &mut visible {
            post.score = self.votes.score(VoteSubject::post(post.id)).await?;
        }

        debug!(fetched, visible = visible.len(), "feed composed");
        Ok(visible)
    }
}
