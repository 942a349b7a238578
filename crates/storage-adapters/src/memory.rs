//! # In-memory adapter
//!
//! `dashmap`-backed implementation of every port. The vote ledger is
//! keyed by (voter, subject), so an insert or remove on that key is the
//! atomic replace-or-delete the `VoteStore` contract requires: two rows
//! for one key cannot exist, racing writers just overwrite each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use domains::{
    Comment, CommentStore, Community, CommunityMember, CommunityStore, FeedHints, MemberRole,
    Post, PostStore, Profile, ProfileStore, VoteStore, VoteSubject, VoteValue,
};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    posts: DashMap<Uuid, Post>,
    comments: DashMap<Uuid, Comment>,
    communities: DashMap<Uuid, Community>,
    members: DashMap<(Uuid, Uuid), CommunityMember>,
    votes: DashMap<(Uuid, VoteSubject), (VoteValue, DateTime<Utc>)>,
    profiles: DashMap<Uuid, Profile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surviving ledger rows for a subject. Test hook for the
    /// one-row-per-(voter, subject) invariant.
    pub fn vote_rows(&self, subject: VoteSubject) -> usize {
        self.votes
            .iter()
            .filter(|entry| entry.key().1 == subject)
            .count()
    }
}

#[async_trait]
impl VoteStore for MemoryStore {
    async fn get_vote(
        &self,
        voter_id: Uuid,
        subject: VoteSubject,
    ) -> anyhow::Result<Option<VoteValue>> {
        Ok(self
            .votes
            .get(&(voter_id, subject))
            .map(|entry| entry.value().0))
    }

    async fn write_vote(
        &self,
        voter_id: Uuid,
        subject: VoteSubject,
        new_value: Option<VoteValue>,
    ) -> anyhow::Result<()> {
        let key = (voter_id, subject);
        match new_value {
            Some(value) => {
                self.votes.insert(key, (value, Utc::now()));
            }
            None => {
                self.votes.remove(&key);
            }
        }
        Ok(())
    }

    async fn sum_votes(&self, subject: VoteSubject) -> anyhow::Result<i64> {
        Ok(self
            .votes
            .iter()
            .filter(|entry| entry.key().1 == subject)
            .map(|entry| entry.value().0.as_i64())
            .sum())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: Post) -> anyhow::Result<()> {
        self.posts.insert(post.id, post);
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<()> {
        self.posts.remove(&id);
        Ok(())
    }

    async fn list_candidate_posts(&self, hints: FeedHints) -> anyhow::Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|post| match hints.community_id {
                Some(community) => post.community_id == Some(community),
                None => true,
            })
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = hints.limit {
            posts.truncate(limit.max(0) as usize);
        }
        Ok(posts)
    }

    async fn set_post_score(&self, id: Uuid, score: i64) -> anyhow::Result<()> {
        if let Some(mut entry) = self.posts.get_mut(&id) {
            entry.score = score;
        }
        Ok(())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(&self, comment: Comment) -> anyhow::Result<()> {
        self.comments.insert(comment.id, comment);
        Ok(())
    }

    async fn get_comment(&self, id: Uuid) -> anyhow::Result<Option<Comment>> {
        Ok(self.comments.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_comments(&self, post_id: Uuid) -> anyhow::Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|comment| comment.post_id == post_id)
            .collect();
        comments.sort_by_key(|comment| (comment.created_at, comment.id));
        Ok(comments)
    }

    async fn set_comment_score(&self, id: Uuid, score: i64) -> anyhow::Result<()> {
        if let Some(mut entry) = self.comments.get_mut(&id) {
            entry.score = score;
        }
        Ok(())
    }
}

#[async_trait]
impl CommunityStore for MemoryStore {
    async fn insert_community(&self, community: Community) -> anyhow::Result<()> {
        self.communities.insert(community.id, community);
        Ok(())
    }

    async fn get_community(&self, id: Uuid) -> anyhow::Result<Option<Community>> {
        Ok(self.communities.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_communities(&self) -> anyhow::Result<Vec<Community>> {
        let mut all: Vec<Community> = self
            .communities
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|c| c.created_at);
        Ok(all)
    }

    async fn add_member(
        &self,
        community_id: Uuid,
        voter_id: Uuid,
        role: MemberRole,
        joined_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.members.insert(
            (community_id, voter_id),
            CommunityMember { community_id, voter_id, role, joined_at },
        );
        Ok(())
    }

    async fn get_member(
        &self,
        community_id: Uuid,
        voter_id: Uuid,
    ) -> anyhow::Result<Option<CommunityMember>> {
        Ok(self
            .members
            .get(&(community_id, voter_id))
            .map(|entry| entry.value().clone()))
    }

    async fn list_members(&self, community_id: Uuid) -> anyhow::Result<Vec<CommunityMember>> {
        let mut members: Vec<CommunityMember> = self
            .members
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|member| member.community_id == community_id)
            .collect();
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        Ok(self.profiles.get(&id).map(|entry| entry.value().clone()))
    }

    async fn upsert_profile(&self, profile: Profile) -> anyhow::Result<()> {
        self.profiles.insert(profile.id, profile);
        Ok(())
    }
}
