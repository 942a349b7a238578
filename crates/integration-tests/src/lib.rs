//! Shared fixtures for the integration test targets: a fully wired
//! engine over the in-memory adapter.

use std::sync::Arc;

use services::{CommentService, CommunityService, FeedComposer, PostService, VoteService};
use storage_adapters::MemoryStore;

pub struct Engine {
    pub store: Arc<MemoryStore>,
    pub votes: VoteService,
    pub posts: PostService,
    pub comments: CommentService,
    pub communities: CommunityService,
    pub feed: FeedComposer,
}

pub fn engine() -> Engine {
    let store = Arc::new(MemoryStore::new());
    let votes = VoteService::new(store.clone(), store.clone(), store.clone());
    let posts = PostService::new(store.clone(), store.clone());
    let comments = CommentService::new(store.clone(), posts.clone(), votes.clone());
    let communities = CommunityService::new(store.clone());
    let feed = FeedComposer::new(store.clone(), votes.clone());
    Engine { store, votes, posts, comments, communities, feed }
}

#[cfg(feature = "web-axum")]
pub mod web {
    use super::*;
    use api_adapters::{build_router, AppState};
    use axum::Router;
    use configs::FeedConfig;

    pub fn router() -> (Router, Arc<MemoryStore>) {
        let engine = engine();
        let store = engine.store.clone();
        let state = AppState {
            posts: engine.posts,
            comments: engine.comments,
            votes: engine.votes,
            feed: engine.feed,
            communities: engine.communities,
            profiles: store.clone(),
            feed_config: FeedConfig::default(),
        };
        (build_router(state), store)
    }
}
