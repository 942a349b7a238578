//! HTTP surface: feed scoping, post lifecycle, expiry leakage.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use domains::{GeoPoint, Post, PostStore};
use integration_tests::web::router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_request(voter: Uuid, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/posts")
        .header("content-type", "application/json")
        .header("x-voter-id", voter.to_string())
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn feed_without_location_is_unprocessable() {
    let (app, _store) = router();
    let response = app
        .oneshot(Request::builder().uri("/feed").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("location"));
}

#[tokio::test]
async fn anonymous_post_is_unauthorized() {
    let (app, _store) = router();
    let request = Request::builder()
        .method("POST")
        .uri("/posts")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "content": "hi", "latitude": 0.0, "longitude": 0.0 }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn posted_yak_shows_up_in_a_nearby_feed() {
    let (app, _store) = router();
    let voter = Uuid::now_v7();

    let response = app
        .clone()
        .oneshot(post_request(
            voter,
            json!({ "content": "first yak", "latitude": 0.0, "longitude": 0.01 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/feed?lat=0.0&lon=0.0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let feed = body_json(response).await;
    let ids: Vec<&str> = feed
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&id.as_str()));
}

#[tokio::test]
async fn screened_content_is_rejected_at_the_boundary() {
    let (app, _store) = router();
    let response = app
        .oneshot(post_request(
            Uuid::now_v7(),
            json!({ "content": "I hate this place", "latitude": 0.0, "longitude": 0.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn expired_ghost_by_id_is_a_plain_404() {
    let (app, store) = router();

    let expired = Post {
        id: Uuid::now_v7(),
        author_id: Uuid::now_v7(),
        content: "long gone".into(),
        location: GeoPoint { latitude: 0.0, longitude: 0.0 },
        community_id: None,
        expires_at: Some(Utc::now() - Duration::minutes(1)),
        score: 0,
        created_at: Utc::now() - Duration::hours(2),
    };
    let id = expired.id;
    store.insert_post(expired).await.unwrap();

    let expired_response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/posts/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(expired_response.status(), StatusCode::NOT_FOUND);
    let expired_body = body_json(expired_response).await;

    // A never-existing id answers identically.
    let absent_response = app
        .oneshot(
            Request::builder()
                .uri(format!("/posts/{}", Uuid::now_v7()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(absent_response.status(), StatusCode::NOT_FOUND);
    let absent_body = body_json(absent_response).await;
    assert_eq!(
        expired_body["error"].as_str().unwrap().split("ID").next(),
        absent_body["error"].as_str().unwrap().split("ID").next()
    );
}

#[tokio::test]
async fn comment_forest_round_trip_over_http() {
    let (app, _store) = router();
    let voter = Uuid::now_v7();

    let response = app
        .clone()
        .oneshot(post_request(
            voter,
            json!({ "content": "op", "latitude": 0.0, "longitude": 0.0 }),
        ))
        .await
        .unwrap();
    let post_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let root = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/posts/{post_id}/comments"))
                .header("content-type", "application/json")
                .header("x-voter-id", voter.to_string())
                .body(Body::from(json!({ "content": "root reply" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(root.status(), StatusCode::OK);
    let root_id = body_json(root).await["id"].as_str().unwrap().to_string();

    let nested = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/posts/{post_id}/comments"))
                .header("content-type", "application/json")
                .header("x-voter-id", voter.to_string())
                .body(Body::from(
                    json!({ "content": "nested", "parent_id": root_id }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(nested.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/posts/{post_id}/comments"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let forest = body_json(response).await;
    assert_eq!(forest.as_array().unwrap().len(), 1);
    assert_eq!(forest[0]["replies"].as_array().unwrap().len(), 1);
    assert_eq!(forest[0]["replies"][0]["comment"]["content"], "nested");
}
