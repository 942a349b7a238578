//! # yakboard binary
//!
//! Assembles the engine: configuration, adapter wiring, HTTP surface.
//! The in-memory adapter backs a single-node run; compile with
//! `--features db-postgres` and set `YAKBOARD__DATABASE__URL` for a
//! durable store.

use std::sync::Arc;

use api_adapters::{build_router, AppState};
use configs::AppConfig;
use services::{CommentService, CommunityService, FeedComposer, PostService, VoteService};
use storage_adapters::MemoryStore;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "db-postgres")]
use secrecy::ExposeSecret;
#[cfg(feature = "db-postgres")]
use storage_adapters::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load()?;

    let state = build_state(&config).await?;
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(%addr, "yakboard listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(feature = "db-postgres")]
async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    match &config.database.url {
        Some(url) => {
            let store = Arc::new(PgStore::connect(url.expose_secret()).await?);
            tracing::info!("using postgres store");
            Ok(wire(store.clone(), store.clone(), store.clone(), store.clone(), store, config))
        }
        None => {
            tracing::warn!("db-postgres enabled but no database url; falling back to memory");
            Ok(memory_state(config))
        }
    }
}

#[cfg(not(feature = "db-postgres"))]
async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    Ok(memory_state(config))
}

fn memory_state(config: &AppConfig) -> AppState {
    let store = Arc::new(MemoryStore::new());
    wire(store.clone(), store.clone(), store.clone(), store.clone(), store, config)
}

fn wire(
    votes: Arc<dyn domains::VoteStore>,
    posts: Arc<dyn domains::PostStore>,
    comments: Arc<dyn domains::CommentStore>,
    communities: Arc<dyn domains::CommunityStore>,
    profiles: Arc<dyn domains::ProfileStore>,
    config: &AppConfig,
) -> AppState {
    let vote_service = VoteService::new(votes, posts.clone(), comments.clone());
    let post_service = PostService::new(posts.clone(), communities.clone());
    let comment_service =
        CommentService::new(comments, post_service.clone(), vote_service.clone());
    let feed = FeedComposer::new(posts, vote_service.clone());
    let community_service = CommunityService::new(communities);

    AppState {
        posts: post_service,
        comments: comment_service,
        votes: vote_service,
        feed,
        communities: community_service,
        profiles,
        feed_config: config.feed.clone(),
    }
}
