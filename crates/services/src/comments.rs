//! # CommentService
//!
//! Reply submission and forest reads. Writes validate that a supplied
//! parent belongs to the same post; reads go through the post's expiry
//! filter first, then build the ordered forest with fresh scores.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{AppError, Comment, CommentStore, Result, VoteSubject};
use tracing::info;
use uuid::Uuid;

use crate::{moderation, thread, CommentNode, PostService, VoteService};

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    posts: PostService,
    votes: VoteService,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentStore>, posts: PostService, votes: VoteService) -> Self {
        CommentService { comments, posts, votes }
    }

    /// Persists a reply. The target post must be visible; a parent that
    /// resolves to a different post is rejected. A parent id that
    /// matches nothing is allowed through: the read side heals it to a
    /// root, and refusing the write would drop a user's reply over a
    /// concurrent delete.
    pub async fn add(&self, new: NewComment, now: DateTime<Utc>) -> Result<Comment> {
        moderation::screen_content(&new.content)?;
        self.posts.fetch(new.post_id, now).await?;

        if let Some(parent_id) = new.parent_id {
            let parent = self
                .comments
                .get_comment(parent_id)
                .await
                .map_err(AppError::internal)?;
            if let Some(parent) = parent {
                if parent.post_id != new.post_id {
                    return Err(AppError::ValidationError(
                        "parent comment belongs to a different post".into(),
                    ));
                }
            }
        }

        let comment = Comment {
            id: Uuid::now_v7(),
            post_id: new.post_id,
            author_id: new.author_id,
            content: new.content,
            parent_id: new.parent_id,
            score: 0,
            created_at: now,
        };
        self.comments
            .insert_comment(comment.clone())
            .await
            .map_err(AppError::internal)?;
        info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");
        Ok(comment)
    }

    /// The ordered reply forest for a visible post, with authoritative
    /// scores attached per comment.
    pub async fn forest(&self, post_id: Uuid, now: DateTime<Utc>) -> Result<Vec<CommentNode>> {
        self.posts.fetch(post_id, now).await?;

        let mut comments = self
            .comments
            .list_comments(post_id)
            .await
            .map_err(AppError::internal)?;

        for comment in &mut comments {
            comment.score = self.votes.score(VoteSubject::comment(comment.id)).await?;
        }

        Ok(thread::build_forest(comments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{
        GeoPoint, MockCommentStore, MockCommunityStore, MockPostStore, MockVoteStore, Post,
    };

    fn visible_post(id: Uuid) -> Post {
        Post {
            id,
            author_id: Uuid::now_v7(),
            content: "op".into(),
            location: GeoPoint { latitude: 0.0, longitude: 0.0 },
            community_id: None,
            expires_at: None,
            score: 0,
            created_at: Utc::now(),
        }
    }

    fn service(
        comments: MockCommentStore,
        posts: MockPostStore,
        votes: MockVoteStore,
    ) -> CommentService {
        let comments: Arc<dyn CommentStore> = Arc::new(comments);
        let posts = Arc::new(posts);
        let post_service = PostService::new(posts.clone(), Arc::new(MockCommunityStore::new()));
        let vote_service =
            VoteService::new(Arc::new(votes), posts, Arc::new(MockCommentStore::new()));
        CommentService::new(comments, post_service, vote_service)
    }

    #[tokio::test]
    async fn reply_to_parent_on_other_post_is_rejected() {
        let post_id = Uuid::now_v7();
        let parent_id = Uuid::now_v7();

        let mut posts = MockPostStore::new();
        posts.expect_get_post().returning(move |id| Ok(Some(visible_post(id))));

        let mut comments = MockCommentStore::new();
        comments.expect_get_comment().returning(move |id| {
            Ok(Some(Comment {
                id,
                post_id: Uuid::now_v7(), // some other post
                author_id: Uuid::now_v7(),
                content: "elsewhere".into(),
                parent_id: None,
                score: 0,
                created_at: Utc::now(),
            }))
        });
        comments.expect_insert_comment().never();

        let svc = service(comments, posts, MockVoteStore::new());
        let err = svc
            .add(
                NewComment {
                    post_id,
                    author_id: Uuid::now_v7(),
                    content: "reply".into(),
                    parent_id: Some(parent_id),
                },
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn reply_with_vanished_parent_is_accepted() {
        let post_id = Uuid::now_v7();

        let mut posts = MockPostStore::new();
        posts.expect_get_post().returning(move |id| Ok(Some(visible_post(id))));

        let mut comments = MockCommentStore::new();
        comments.expect_get_comment().returning(|_| Ok(None));
        comments.expect_insert_comment().once().returning(|_| Ok(()));

        let svc = service(comments, posts, MockVoteStore::new());
        let comment = svc
            .add(
                NewComment {
                    post_id,
                    author_id: Uuid::now_v7(),
                    content: "reply to a ghost".into(),
                    parent_id: Some(Uuid::now_v7()),
                },
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(comment.parent_id.is_some());
    }

    #[tokio::test]
    async fn forest_on_expired_post_is_not_found() {
        let now = Utc::now();
        let mut posts = MockPostStore::new();
        posts.expect_get_post().returning(move |id| {
            let mut post = visible_post(id);
            post.expires_at = Some(now - chrono::Duration::minutes(1));
            Ok(Some(post))
        });

        let svc = service(MockCommentStore::new(), posts, MockVoteStore::new());
        let err = svc.forest(Uuid::now_v7(), now).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }
}
