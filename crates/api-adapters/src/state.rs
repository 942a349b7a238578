//! Shared state and route table.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use configs::FeedConfig;
use domains::ProfileStore;
use services::{CommentService, CommunityService, FeedComposer, PostService, VoteService};
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Everything the handlers need, shared across workers.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub comments: CommentService,
    pub votes: VoteService,
    pub feed: FeedComposer,
    pub communities: CommunityService,
    pub profiles: Arc<dyn ProfileStore>,
    pub feed_config: FeedConfig,
}

/// Builds the engine's route table.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/feed", get(handlers::get_feed))
        .route("/posts", post(handlers::create_post))
        .route(
            "/posts/{id}",
            get(handlers::get_post).delete(handlers::delete_post),
        )
        .route(
            "/posts/{id}/comments",
            get(handlers::get_comments).post(handlers::create_comment),
        )
        .route("/votes", post(handlers::cast_vote))
        .route(
            "/communities",
            get(handlers::list_communities).post(handlers::create_community),
        )
        .route("/communities/{id}/join", post(handlers::join_community))
        .route("/communities/{id}/members", get(handlers::list_members))
        .route("/communities/{id}/posts", get(handlers::community_feed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
