//! # PostService
//!
//! Post lifecycle around the engine's filters: creation (with ghost
//! expiry resolution and content screening), visibility-aware fetch,
//! and hard delete gated on author or moderator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    AppError, CommunityStore, GeoPoint, GhostDuration, MemberRole, Post, PostStore, Result,
};
use tracing::info;
use uuid::Uuid;

use crate::{expiry, moderation};

/// Input for a new post. Location is mandatory; a ghost duration makes
/// the post time-bounded.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub content: String,
    pub location: GeoPoint,
    pub community_id: Option<Uuid>,
    pub ghost: Option<GhostDuration>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
    communities: Arc<dyn CommunityStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>, communities: Arc<dyn CommunityStore>) -> Self {
        PostService { posts, communities }
    }

    /// Validates and persists a new post. Ghost durations resolve to an
    /// absolute `expires_at` here, once, so every later read agrees on
    /// the window.
    pub async fn create(&self, new: NewPost, now: DateTime<Utc>) -> Result<Post> {
        moderation::screen_content(&new.content)?;
        new.location.validate()?;

        if let Some(community_id) = new.community_id {
            self.communities
                .get_community(community_id)
                .await
                .map_err(AppError::internal)?
                .ok_or_else(|| AppError::not_found("Community", community_id))?;
        }

        let post = Post {
            id: Uuid::now_v7(),
            author_id: new.author_id,
            content: new.content,
            location: new.location,
            community_id: new.community_id,
            expires_at: new.ghost.map(|g| g.expires_from(now)),
            score: 0,
            created_at: now,
        };

        self.posts
            .insert_post(post.clone())
            .await
            .map_err(AppError::internal)?;
        info!(post_id = %post.id, ghost = post.is_ghost(), "post created");
        Ok(post)
    }

    /// Visibility-aware fetch: an expired ghost answers exactly like an
    /// absent id, so expiry never leaks content or its existence.
    pub async fn fetch(&self, id: Uuid, now: DateTime<Utc>) -> Result<Post> {
        self.posts
            .get_post(id)
            .await
            .map_err(AppError::internal)?
            .filter(|post| expiry::post_visible(post, now))
            .ok_or_else(|| AppError::not_found("Post", id))
    }

    /// Hard delete, allowed for the author or a moderator of the post's
    /// herd. Irreversible.
    pub async fn delete(&self, id: Uuid, requester_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        let post = self.fetch(id, now).await?;

        if post.author_id != requester_id && !self.is_moderator(&post, requester_id).await? {
            return Err(AppError::Unauthorized(
                "only the author or a moderator may delete a post".into(),
            ));
        }

        self.posts.delete_post(id).await.map_err(AppError::internal)?;
        info!(post_id = %id, requester = %requester_id, "post deleted");
        Ok(())
    }

    async fn is_moderator(&self, post: &Post, requester_id: Uuid) -> Result<bool> {
        let Some(community_id) = post.community_id else {
            return Ok(false);
        };
        let member = self
            .communities
            .get_member(community_id, requester_id)
            .await
            .map_err(AppError::internal)?;
        Ok(matches!(member, Some(m) if m.role == MemberRole::Moderator))
    }
}
