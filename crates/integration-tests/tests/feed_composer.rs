//! Feed pipeline end-to-end: expiry, geofence, ordering, scoring.

use chrono::{Duration, Utc};
use domains::{AppError, FeedHints, GeoPoint, GhostDuration};
use integration_tests::{engine, Engine};
use services::NewPost;
use uuid::Uuid;

fn p(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint { latitude: lat, longitude: lon }
}

async fn post_at(engine: &Engine, lon: f64, ghost: Option<GhostDuration>) -> Uuid {
    engine
        .posts
        .create(
            NewPost {
                author_id: Uuid::now_v7(),
                content: "local yak".into(),
                location: p(0.0, lon),
                community_id: None,
                ghost,
            },
            Utc::now(),
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn scenario_d_radius_scoping() {
    let engine = engine();
    let far = post_at(&engine, 0.05, None).await; // ~5.5 km
    let near = post_at(&engine, 0.02, None).await; // ~2.2 km

    let feed = engine
        .feed
        .compose(Some(p(0.0, 0.0)), Utc::now(), 5_000.0, FeedHints::default())
        .await
        .unwrap();
    let ids: Vec<_> = feed.iter().map(|post| post.id).collect();
    assert!(ids.contains(&near));
    assert!(!ids.contains(&far));
}

#[tokio::test]
async fn scenario_c_one_hour_ghost_vanishes_everywhere() {
    let engine = engine();
    let ghost = post_at(&engine, 0.0, Some(GhostDuration::OneHour)).await;
    let later = Utc::now() + Duration::minutes(61);

    let feed = engine
        .feed
        .compose(Some(p(0.0, 0.0)), later, 5_000.0, FeedHints::default())
        .await
        .unwrap();
    assert!(feed.iter().all(|post| post.id != ghost));

    let err = engine.posts.fetch(ghost, later).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));
}

#[tokio::test]
async fn ghost_is_visible_inside_its_window() {
    let engine = engine();
    let ghost = post_at(&engine, 0.0, Some(GhostDuration::OneHour)).await;
    let soon = Utc::now() + Duration::minutes(59);

    let feed = engine
        .feed
        .compose(Some(p(0.0, 0.0)), soon, 5_000.0, FeedHints::default())
        .await
        .unwrap();
    assert!(feed.iter().any(|post| post.id == ghost));
}

#[tokio::test]
async fn feed_is_newest_first_with_scores_attached() {
    let engine = engine();
    let first = post_at(&engine, 0.0, None).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = post_at(&engine, 0.01, None).await;

    engine
        .votes
        .cast_vote(
            Uuid::now_v7(),
            domains::VoteSubject::post(first),
            domains::VoteValue::Up,
            Utc::now(),
        )
        .await
        .unwrap();

    let feed = engine
        .feed
        .compose(Some(p(0.0, 0.0)), Utc::now(), 5_000.0, FeedHints::default())
        .await
        .unwrap();
    let ids: Vec<_> = feed.iter().map(|post| post.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(feed[1].score, 1);
    assert_eq!(feed[0].score, 0);
}

#[tokio::test]
async fn missing_location_is_an_error_not_an_empty_feed() {
    let engine = engine();
    post_at(&engine, 0.0, None).await;

    let err = engine
        .feed
        .compose(None, Utc::now(), 5_000.0, FeedHints::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn deleted_post_leaves_the_feed_immediately() {
    let engine = engine();
    let author = Uuid::now_v7();
    let post = engine
        .posts
        .create(
            NewPost {
                author_id: author,
                content: "regret this already".into(),
                location: p(0.0, 0.0),
                community_id: None,
                ghost: None,
            },
            Utc::now(),
        )
        .await
        .unwrap()
        .id;

    engine.posts.delete(post, author, Utc::now()).await.unwrap();
    let feed = engine
        .feed
        .compose(Some(p(0.0, 0.0)), Utc::now(), 5_000.0, FeedHints::default())
        .await
        .unwrap();
    assert!(feed.is_empty());
}
