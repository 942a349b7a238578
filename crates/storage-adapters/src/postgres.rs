//! # Postgres adapter
//!
//! Maps the relational model onto the domain ports. The vote ledger's
//! atomicity comes from a keyed `INSERT ... ON CONFLICT DO UPDATE` /
//! keyed `DELETE`: one statement per write, one row per key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    Comment, CommentStore, Community, CommunityMember, CommunityStore, FeedHints, GeoPoint,
    MemberRole, Post, PostStore, Profile, ProfileStore, SubjectKind, VoteStore, VoteSubject,
    VoteValue,
};
use sqlx::postgres::PgPool;
use sqlx::Row;
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id           UUID PRIMARY KEY,
    author_id    UUID NOT NULL,
    content      TEXT NOT NULL,
    latitude     DOUBLE PRECISION NOT NULL,
    longitude    DOUBLE PRECISION NOT NULL,
    community_id UUID,
    expires_at   TIMESTAMPTZ,
    score        BIGINT NOT NULL DEFAULT 0,
    created_at   TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id         UUID PRIMARY KEY,
    post_id    UUID NOT NULL,
    author_id  UUID NOT NULL,
    content    TEXT NOT NULL,
    parent_id  UUID,
    score      BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS votes (
    voter_id     UUID NOT NULL,
    subject_kind TEXT NOT NULL,
    subject_id   UUID NOT NULL,
    value        SMALLINT NOT NULL,
    created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (voter_id, subject_kind, subject_id)
);

CREATE TABLE IF NOT EXISTS communities (
    id            UUID PRIMARY KEY,
    name          TEXT NOT NULL,
    description   TEXT,
    creator_id    UUID NOT NULL,
    latitude      DOUBLE PRECISION NOT NULL,
    longitude     DOUBLE PRECISION NOT NULL,
    radius_meters DOUBLE PRECISION NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS community_members (
    community_id UUID NOT NULL,
    voter_id     UUID NOT NULL,
    role         TEXT NOT NULL,
    joined_at    TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (community_id, voter_id)
);

CREATE TABLE IF NOT EXISTS profiles (
    id         UUID PRIMARY KEY,
    handle     TEXT NOT NULL,
    karma      BIGINT NOT NULL DEFAULT 0,
    is_banned  BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_post ON comments (post_id);
CREATE INDEX IF NOT EXISTS idx_votes_subject ON votes (subject_kind, subject_id);
CREATE INDEX IF NOT EXISTS idx_posts_community ON posts (community_id);
"#;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(url).await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(PgStore { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

fn kind_str(kind: SubjectKind) -> &'static str {
    kind.as_str()
}

fn role_str(role: MemberRole) -> &'static str {
    match role {
        MemberRole::Member => "member",
        MemberRole::Moderator => "moderator",
    }
}

fn role_from(raw: &str) -> MemberRole {
    match raw {
        "moderator" => MemberRole::Moderator,
        _ => MemberRole::Member,
    }
}

fn post_from_row(row: &sqlx::postgres::PgRow) -> Post {
    Post {
        id: row.get("id"),
        author_id: row.get("author_id"),
        content: row.get("content"),
        location: GeoPoint {
            latitude: row.get("latitude"),
            longitude: row.get("longitude"),
        },
        community_id: row.get("community_id"),
        expires_at: row.get("expires_at"),
        score: row.get("score"),
        created_at: row.get("created_at"),
    }
}

fn comment_from_row(row: &sqlx::postgres::PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        content: row.get("content"),
        parent_id: row.get("parent_id"),
        score: row.get("score"),
        created_at: row.get("created_at"),
    }
}

fn community_from_row(row: &sqlx::postgres::PgRow) -> Community {
    Community {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        creator_id: row.get("creator_id"),
        center: GeoPoint {
            latitude: row.get("latitude"),
            longitude: row.get("longitude"),
        },
        radius_meters: row.get("radius_meters"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl VoteStore for PgStore {
    async fn get_vote(
        &self,
        voter_id: Uuid,
        subject: VoteSubject,
    ) -> anyhow::Result<Option<VoteValue>> {
        let row = sqlx::query(
            "SELECT value FROM votes WHERE voter_id = $1 AND subject_kind = $2 AND subject_id = $3",
        )
        .bind(voter_id)
        .bind(kind_str(subject.kind))
        .bind(subject.id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let raw: i16 = row.get("value");
                Ok(Some(VoteValue::try_from(raw as i64)?))
            }
            None => Ok(None),
        }
    }

    async fn write_vote(
        &self,
        voter_id: Uuid,
        subject: VoteSubject,
        new_value: Option<VoteValue>,
    ) -> anyhow::Result<()> {
        match new_value {
            Some(value) => {
                sqlx::query(
                    "INSERT INTO votes (voter_id, subject_kind, subject_id, value)
                     VALUES ($1, $2, $3, $4)
                     ON CONFLICT (voter_id, subject_kind, subject_id)
                     DO UPDATE SET value = EXCLUDED.value, created_at = now()",
                )
                .bind(voter_id)
                .bind(kind_str(subject.kind))
                .bind(subject.id)
                .bind(value.as_i64() as i16)
                .execute(&self.pool)
                .await?;
            }
            None => {
                sqlx::query(
                    "DELETE FROM votes WHERE voter_id = $1 AND subject_kind = $2 AND subject_id = $3",
                )
                .bind(voter_id)
                .bind(kind_str(subject.kind))
                .bind(subject.id)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }

    async fn sum_votes(&self, subject: VoteSubject) -> anyhow::Result<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(value), 0)::BIGINT AS total
             FROM votes WHERE subject_kind = $1 AND subject_id = $2",
        )
        .bind(kind_str(subject.kind))
        .bind(subject.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("total"))
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn insert_post(&self, post: Post) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO posts (id, author_id, content, latitude, longitude, community_id, expires_at, score, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(post.content)
        .bind(post.location.latitude)
        .bind(post.location.longitude)
        .bind(post.community_id)
        .bind(post.expires_at)
        .bind(post.score)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_candidate_posts(&self, hints: FeedHints) -> anyhow::Result<Vec<Post>> {
        let limit = hints.limit.unwrap_or(200).max(0);
        let rows = match hints.community_id {
            Some(community_id) => {
                sqlx::query(
                    "SELECT * FROM posts WHERE community_id = $1
                     ORDER BY created_at DESC LIMIT $2",
                )
                .bind(community_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM posts ORDER BY created_at DESC LIMIT $1")
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn set_post_score(&self, id: Uuid, score: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE posts SET score = $2 WHERE id = $1")
            .bind(id)
            .bind(score)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(&self, comment: Comment) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, post_id, author_id, content, parent_id, score, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(comment.content)
        .bind(comment.parent_id)
        .bind(comment.score)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_comment(&self, id: Uuid) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(comment_from_row))
    }

    async fn list_comments(&self, post_id: Uuid) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT * FROM comments WHERE post_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn set_comment_score(&self, id: Uuid, score: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE comments SET score = $2 WHERE id = $1")
            .bind(id)
            .bind(score)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CommunityStore for PgStore {
    async fn insert_community(&self, community: Community) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO communities (id, name, description, creator_id, latitude, longitude, radius_meters, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(community.id)
        .bind(community.name)
        .bind(community.description)
        .bind(community.creator_id)
        .bind(community.center.latitude)
        .bind(community.center.longitude)
        .bind(community.radius_meters)
        .bind(community.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_community(&self, id: Uuid) -> anyhow::Result<Option<Community>> {
        let row = sqlx::query("SELECT * FROM communities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(community_from_row))
    }

    async fn list_communities(&self) -> anyhow::Result<Vec<Community>> {
        let rows = sqlx::query("SELECT * FROM communities ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(community_from_row).collect())
    }

    async fn add_member(
        &self,
        community_id: Uuid,
        voter_id: Uuid,
        role: MemberRole,
        joined_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO community_members (community_id, voter_id, role, joined_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (community_id, voter_id) DO NOTHING",
        )
        .bind(community_id)
        .bind(voter_id)
        .bind(role_str(role))
        .bind(joined_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_member(
        &self,
        community_id: Uuid,
        voter_id: Uuid,
    ) -> anyhow::Result<Option<CommunityMember>> {
        let row = sqlx::query(
            "SELECT * FROM community_members WHERE community_id = $1 AND voter_id = $2",
        )
        .bind(community_id)
        .bind(voter_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| CommunityMember {
            community_id: row.get("community_id"),
            voter_id: row.get("voter_id"),
            role: role_from(row.get::<String, _>("role").as_str()),
            joined_at: row.get("joined_at"),
        }))
    }

    async fn list_members(&self, community_id: Uuid) -> anyhow::Result<Vec<CommunityMember>> {
        let rows = sqlx::query(
            "SELECT * FROM community_members WHERE community_id = $1 ORDER BY joined_at ASC",
        )
        .bind(community_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| CommunityMember {
                community_id: row.get("community_id"),
                voter_id: row.get("voter_id"),
                role: role_from(row.get::<String, _>("role").as_str()),
                joined_at: row.get("joined_at"),
            })
            .collect())
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| Profile {
            id: row.get("id"),
            handle: row.get("handle"),
            karma: row.get("karma"),
            is_banned: row.get("is_banned"),
            created_at: row.get("created_at"),
        }))
    }

    async fn upsert_profile(&self, profile: Profile) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO profiles (id, handle, karma, is_banned, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE
             SET handle = EXCLUDED.handle, karma = EXCLUDED.karma, is_banned = EXCLUDED.is_banned",
        )
        .bind(profile.id)
        .bind(profile.handle)
        .bind(profile.karma)
        .bind(profile.is_banned)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
