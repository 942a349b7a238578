//! Request handlers. Thin: decode, identify the caller, call the
//! engine with an explicit clock and viewer location, encode.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use domains::{
    AppError, Community, CommunityMember, GeoPoint, GhostDuration, Post, Profile, SubjectKind,
    VoteSubject, VoteValue,
};
use serde::{Deserialize, Serialize};
use services::handles;
use services::{CommentNode, NewComment, NewCommunity, NewPost};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const VOTER_HEADER: &str = "x-voter-id";

/// Resolves the writing caller from the `x-voter-id` header. Anonymous
/// or banned writers stop here; the engine itself never sees them.
async fn require_voter(state: &AppState, headers: &HeaderMap) -> ApiResult<Uuid> {
    let raw = headers
        .get(VOTER_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("authentication required".into()))?;
    let voter_id: Uuid = raw
        .parse()
        .map_err(|_| AppError::Unauthorized("malformed voter id".into()))?;

    let profile = state
        .profiles
        .get_profile(voter_id)
        .await
        .map_err(AppError::internal)?;
    match profile {
        Some(profile) if profile.is_banned => {
            Err(AppError::Unauthorized("account is banned".into()).into())
        }
        Some(_) => Ok(voter_id),
        None => {
            // First write from this id: seed an anonymous profile.
            let profile = Profile {
                id: voter_id,
                handle: handles::generate_handle(),
                karma: 0,
                is_banned: false,
                created_at: Utc::now(),
            };
            state
                .profiles
                .upsert_profile(profile)
                .await
                .map_err(AppError::internal)?;
            Ok(voter_id)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius: Option<f64>,
    pub limit: Option<i64>,
}

impl LocationQuery {
    fn viewer(&self) -> Option<GeoPoint> {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint { latitude, longitude }),
            _ => None,
        }
    }
}

// ── Feed ────────────────────────────────────────────────────────────────────

pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> ApiResult<Json<Vec<Post>>> {
    let radius = query.radius.unwrap_or(state.feed_config.default_radius_meters);
    let limit = query.limit.unwrap_or(state.feed_config.candidate_limit);
    let feed = state
        .feed
        .compose(
            query.viewer(),
            Utc::now(),
            radius,
            domains::FeedHints { community_id: None, limit: Some(limit) },
        )
        .await?;
    Ok(Json(feed))
}

// ── Posts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
    pub community_id: Option<Uuid>,
    pub ghost_duration: Option<GhostDuration>,
}

pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreatePostBody>,
) -> ApiResult<Json<Post>> {
    let author_id = require_voter(&state, &headers).await?;
    let post = state
        .posts
        .create(
            NewPost {
                author_id,
                content: body.content,
                location: GeoPoint { latitude: body.latitude, longitude: body.longitude },
                community_id: body.community_id,
                ghost: body.ghost_duration,
            },
            Utc::now(),
        )
        .await?;
    Ok(Json(post))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Post>> {
    let mut post = state.posts.fetch(id, Utc::now()).await?;
    // Fresh read across the storage boundary reconciles the score cache.
    post.score = state.votes.score(VoteSubject::post(post.id)).await?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let requester = require_voter(&state, &headers).await?;
    state.posts.delete(id, requester, Utc::now()).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

// ── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCommentBody {
    pub content: String,
    pub parent_id: Option<Uuid>,
}

pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<Uuid>,
    Json(body): Json<CreateCommentBody>,
) -> ApiResult<Json<domains::Comment>> {
    let author_id = require_voter(&state, &headers).await?;
    let comment = state
        .comments
        .add(
            NewComment {
                post_id,
                author_id,
                content: body.content,
                parent_id: body.parent_id,
            },
            Utc::now(),
        )
        .await?;
    Ok(Json(comment))
}

pub async fn get_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentNode>>> {
    let forest = state.comments.forest(post_id, Utc::now()).await?;
    Ok(Json(forest))
}

// ── Votes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CastVoteBody {
    pub subject_kind: SubjectKind,
    pub subject_id: Uuid,
    /// Raw weight; anything outside {-1, 1} is a validation failure.
    pub value: i64,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    /// Surviving vote after the cast; null means toggled off.
    pub vote: Option<i64>,
    pub score: i64,
    pub delta: i64,
}

pub async fn cast_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CastVoteBody>,
) -> ApiResult<Json<VoteResponse>> {
    let voter_id = require_voter(&state, &headers).await?;
    let value = VoteValue::try_from(body.value).map_err(ApiError::from)?;
    let subject = VoteSubject { kind: body.subject_kind, id: body.subject_id };
    let outcome = state
        .votes
        .cast_vote(voter_id, subject, value, Utc::now())
        .await?;
    Ok(Json(VoteResponse {
        vote: outcome.vote.map(|v| v.as_i64()),
        score: outcome.score,
        delta: outcome.delta,
    }))
}

// ── Communities ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCommunityBody {
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

pub async fn create_community(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateCommunityBody>,
) -> ApiResult<Json<Community>> {
    let creator_id = require_voter(&state, &headers).await?;
    let community = state
        .communities
        .create(
            NewCommunity {
                name: body.name,
                description: body.description,
                creator_id,
                center: GeoPoint { latitude: body.latitude, longitude: body.longitude },
                radius_meters: body.radius_meters,
            },
            Utc::now(),
        )
        .await?;
    Ok(Json(community))
}

pub async fn list_communities(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> ApiResult<Json<Vec<Community>>> {
    let viewer = query.viewer().ok_or_else(|| {
        AppError::ValidationError("viewer location required to scope communities".into())
    })?;
    let radius = query.radius.unwrap_or(state.feed_config.default_radius_meters);
    let nearby = state.communities.nearby(viewer, radius).await?;
    Ok(Json(nearby))
}

#[derive(Debug, Deserialize)]
pub struct JoinBody {
    pub latitude: f64,
    pub longitude: f64,
}

pub async fn join_community(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<JoinBody>,
) -> ApiResult<Json<CommunityMember>> {
    let voter_id = require_voter(&state, &headers).await?;
    let member = state
        .communities
        .join(
            id,
            voter_id,
            GeoPoint { latitude: body.latitude, longitude: body.longitude },
            Utc::now(),
        )
        .await?;
    Ok(Json(member))
}

pub async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommunityMember>>> {
    Ok(Json(state.communities.members(id).await?))
}

/// A herd's own feed: community posts bypass the radius filter but the
/// viewer location is still required, keeping "no results" distinct
/// from "cannot scope results".
pub async fn community_feed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LocationQuery>,
) -> ApiResult<Json<Vec<Post>>> {
    state.communities.get(id).await?;
    let radius = query.radius.unwrap_or(state.feed_config.default_radius_meters);
    let limit = query.limit.unwrap_or(state.feed_config.candidate_limit);
    let feed = state
        .feed
        .compose(
            query.viewer(),
            Utc::now(),
            radius,
            domains::FeedHints { community_id: Some(id), limit: Some(limit) },
        )
        .await?;
    Ok(Json(feed))
}
