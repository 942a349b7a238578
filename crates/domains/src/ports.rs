//! # Core Traits (Ports)
//!
//! The narrow storage boundary the engine reads and writes through.
//! Any adapter must implement these traits to be wired into the binary.
//!
//! Ports return `anyhow::Result`: a failure here is an infrastructure
//! problem, not a domain outcome. Services translate into `AppError`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Comment, Community, CommunityMember, FeedHints, MemberRole, Post, Profile, VoteSubject,
    VoteValue,
};

/// The authoritative vote ledger: one row per (voter, subject).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Current vote value for this (voter, subject), if a row exists.
    async fn get_vote(
        &self,
        voter_id: Uuid,
        subject: VoteSubject,
    ) -> anyhow::Result<Option<VoteValue>>;

    /// Atomic replace-or-delete for the (voter, subject) key.
    /// `Some(v)` upserts the single row to `v`; `None` deletes it.
    /// Concurrent writes for the same key must serialize to exactly one
    /// surviving row (or none), never two.
    async fn write_vote(
        &self,
        voter_id: Uuid,
        subject: VoteSubject,
        new_value: Option<VoteValue>,
    ) -> anyhow::Result<()>;

    /// Authoritative sum of all current vote values for a subject.
    async fn sum_votes(&self, subject: VoteSubject) -> anyhow::Result<i64>;
}

/// Persistence for posts, including the derived-score cache column.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: Post) -> anyhow::Result<()>;

    /// Raw fetch. Expiry is policy, not storage: expired ghosts are
    /// still returned here and filtered by the engine.
    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>>;

    /// Hard delete, irreversible.
    async fn delete_post(&self, id: Uuid) -> anyhow::Result<()>;

    /// Flat candidate set for feed composition, newest first. The store
    /// may apply `hints` loosely; the composer re-filters.
    async fn list_candidate_posts(&self, hints: FeedHints) -> anyhow::Result<Vec<Post>>;

    /// Writes the aggregator's output into the score cache.
    async fn set_post_score(&self, id: Uuid, score: i64) -> anyhow::Result<()>;
}

/// Persistence for comments (flat rows with parent pointers).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, comment: Comment) -> anyhow::Result<()>;

    async fn get_comment(&self, id: Uuid) -> anyhow::Result<Option<Comment>>;

    /// All comments for a post as a flat list; the engine builds the
    /// reply forest.
    async fn list_comments(&self, post_id: Uuid) -> anyhow::Result<Vec<Comment>>;

    async fn set_comment_score(&self, id: Uuid, score: i64) -> anyhow::Result<()>;
}

/// Persistence for herds and the membership relation.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommunityStore: Send + Sync {
    async fn insert_community(&self, community: Community) -> anyhow::Result<()>;

    async fn get_community(&self, id: Uuid) -> anyhow::Result<Option<Community>>;

    async fn list_communities(&self) -> anyhow::Result<Vec<Community>>;

    async fn add_member(
        &self,
        community_id: Uuid,
        voter_id: Uuid,
        role: MemberRole,
        joined_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    async fn get_member(
        &self,
        community_id: Uuid,
        voter_id: Uuid,
    ) -> anyhow::Result<Option<CommunityMember>>;

    async fn list_members(&self, community_id: Uuid) -> anyhow::Result<Vec<CommunityMember>>;
}

/// Identity records for anonymous handles and ban checks.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>>;

    async fn upsert_profile(&self, profile: Profile) -> anyhow::Result<()>;
}
