//! # VoteLedger + ScoreAggregator
//!
//! One vote per (voter, subject), toggle-off on a repeated tap, replace
//! on a switch. The ledger is the only truth; the score column on posts
//! and comments is a cache the aggregator refreshes after every write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    AppError, CommentStore, PostStore, Result, SubjectKind, VoteStore, VoteSubject, VoteValue,
};
use tracing::debug;
use uuid::Uuid;

use crate::expiry;

/// Result of a cast: the surviving ledger state, the authoritative
/// score after the write, and the delta the write contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    /// `None` means the tap toggled the vote off.
    pub vote: Option<VoteValue>,
    pub score: i64,
    pub delta: i64,
}

#[derive(Clone)]
pub struct VoteService {
    votes: Arc<dyn VoteStore>,
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
}

impl VoteService {
    pub fn new(
        votes: Arc<dyn VoteStore>,
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
    ) -> Self {
        VoteService { votes, posts, comments }
    }

    /// Casts a vote under the toggle/replace policy:
    /// same value as the current row removes it, anything else replaces
    /// it. The ledger write is a single atomic replace-or-delete, so
    /// racing casts by one voter collapse to one surviving state.
    pub async fn cast_vote(
        &self,
        voter_id: Uuid,
        subject: VoteSubject,
        value: VoteValue,
        now: DateTime<Utc>,
    ) -> Result<VoteOutcome> {
        self.ensure_subject_visible(subject, now).await?;

        let current = self
            .votes
            .get_vote(voter_id, subject)
            .await
            .map_err(AppError::internal)?;

        let new_value = if current == Some(value) { None } else { Some(value) };

        self.votes
            .write_vote(voter_id, subject, new_value)
            .await
            .map_err(AppError::internal)?;

        let delta = raw(new_value) - raw(current);
        let score = self.recompute(subject).await?;
        debug!(
            voter = %voter_id,
            kind = subject.kind.as_str(),
            subject_id = %subject.id,
            delta,
            score,
            "vote applied"
        );

        Ok(VoteOutcome { vote: new_value, score, delta })
    }

    /// Authoritative recompute: sums the ledger and refreshes the cache.
    /// This is the reconciliation point for any optimistic delta a
    /// client applied for latency.
    pub async fn score(&self, subject: VoteSubject) -> Result<i64> {
        self.recompute(subject).await
    }

    /// The voter's current ledger row for a subject, if any.
    pub async fn current_vote(
        &self,
        voter_id: Uuid,
        subject: VoteSubject,
    ) -> Result<Option<VoteValue>> {
        self.votes
            .get_vote(voter_id, subject)
            .await
            .map_err(AppError::internal)
    }

    async fn recompute(&self, subject: VoteSubject) -> Result<i64> {
        let score = self
            .votes
            .sum_votes(subject)
            .await
            .map_err(AppError::internal)?;
        match subject.kind {
            SubjectKind::Post => self
                .posts
                .set_post_score(subject.id, score)
                .await
                .map_err(AppError::internal)?,
            SubjectKind::Comment => self
                .comments
                .set_comment_score(subject.id, score)
                .await
                .map_err(AppError::internal)?,
        }
        Ok(score)
    }

    /// Voting on something absent is NotFound; voting on an expired
    /// ghost answers identically, so expiry never leaks through the
    /// vote path.
    async fn ensure_subject_visible(&self, subject: VoteSubject, now: DateTime<Utc>) -> Result<()> {
        match subject.kind {
            SubjectKind::Post => {
                let post = self
                    .posts
                    .get_post(subject.id)
                    .await
                    .map_err(AppError::internal)?
                    .filter(|p| expiry::post_visible(p, now));
                post.map(|_| ())
                    .ok_or_else(|| AppError::not_found("Post", subject.id))
            }
            SubjectKind::Comment => {
                let comment = self
                    .comments
                    .get_comment(subject.id)
                    .await
                    .map_err(AppError::internal)?
                    .ok_or_else(|| AppError::not_found("Comment", subject.id))?;
                // A comment is only visible while its post is: an expired
                // or deleted post takes its whole thread out of reach.
                self.posts
                    .get_post(comment.post_id)
                    .await
                    .map_err(AppError::internal)?
                    .filter(|p| expiry::post_visible(p, now))
                    .map(|_| ())
                    .ok_or_else(|| AppError::not_found("Comment", subject.id))
            }
        }
    }
}

/// Display-side incremental update: applies Δ = new − current to a
/// cached score. Clients may use this for latency but must reconcile
/// against [`VoteService::score`] on the next authoritative read.
pub fn apply_optimistic_delta(
    cached: i64,
    current: Option<VoteValue>,
    new: Option<VoteValue>,
) -> i64 {
    cached + raw(new) - raw(current)
}

fn raw(value: Option<VoteValue>) -> i64 {
    value.map(|v| v.as_i64()).unwrap_or(0)
}
