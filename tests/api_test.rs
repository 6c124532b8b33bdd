use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shorty::{config::AppConfig, router, AppState};
use tower::ServiceExt;

fn build_test_app() -> Router {
    let config = AppConfig::from_vars(|key| match key {
        "SHORT_URL_BASE" => Some("https://shor.ty".to_string()),
        _ => None,
    })
    .unwrap();
    router(Arc::new(AppState::new(config)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Percent-encode a URL for use as a query parameter value.
fn q(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[tokio::test]
async fn health_check_ok() {
    let app = build_test_app();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn shorten_redirect_and_stats_flow() {
    let app = build_test_app();

    let (status, body) = send(
        &app,
        post_json("/links", json!({ "url": "https://example.com/page" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["long_url"], "https://example.com/page");
    let short_url = body["short_url"].as_str().unwrap().to_string();
    assert!(short_url.starts_with("https://shor.ty/"));

    let code = short_url.trim_start_matches("https://shor.ty/");
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get(&format!("/{code}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/page"
        );
    }

    let (status, body) = send(&app, get(&format!("/stats?short_url={}", q(&short_url)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usage"], 3);
    assert_eq!(body["long_url"], "https://example.com/page");
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn reuse_and_force_new() {
    let app = build_test_app();
    let create = |force_new: bool| {
        post_json(
            "/links",
            json!({ "url": "https://example.com/page", "force_new": force_new }),
        )
    };

    let (_, first) = send(&app, create(false)).await;
    let (_, again) = send(&app, create(false)).await;
    assert_eq!(first["short_url"], again["short_url"]);

    let (_, forced) = send(&app, create(true)).await;
    assert_ne!(first["short_url"], forced["short_url"]);

    let (status, body) = send(
        &app,
        get(&format!("/links?long_url={}", q("https://example.com/page"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["short_urls"],
        json!([first["short_url"], forced["short_url"]])
    );
}

#[tokio::test]
async fn preferred_short_url_conflict_is_409() {
    let app = build_test_app();
    let (status, body) = send(
        &app,
        post_json(
            "/links",
            json!({ "url": "https://example.com/one", "preferred_short_url": "https://shor.ty/mine" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["short_url"], "https://shor.ty/mine");

    let (status, body) = send(
        &app,
        post_json(
            "/links",
            json!({ "url": "https://example.com/two", "preferred_short_url": "https://shor.ty/mine" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (_, body) = send(
        &app,
        get(&format!("/links?long_url={}", q("https://example.com/two"))),
    )
    .await;
    assert_eq!(body["short_urls"], json!([]));
}

#[tokio::test]
async fn delete_removes_mapping() {
    let app = build_test_app();
    let (_, body) = send(
        &app,
        post_json("/links", json!({ "url": "https://example.com/page" })),
    )
    .await;
    let short_url = body["short_url"].as_str().unwrap().to_string();

    let (status, _) = send(&app, delete(&format!("/links?short_url={}", q(&short_url)))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, delete(&format!("/links?short_url={}", q(&short_url)))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (_, body) = send(
        &app,
        get(&format!("/links?long_url={}", q("https://example.com/page"))),
    )
    .await;
    assert_eq!(body["short_urls"], json!([]));

    let code = short_url.trim_start_matches("https://shor.ty/");
    let (status, _) = send(&app, get(&format!("/{code}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_short_url_has_zero_usage() {
    let app = build_test_app();
    let (status, body) = send(
        &app,
        get(&format!("/stats?short_url={}", q("https://shor.ty/nothing"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usage"], 0);
    assert!(body.get("long_url").is_none());
}

#[tokio::test]
async fn malformed_input_is_rejected() {
    let app = build_test_app();

    let (status, body) = send(&app, post_json("/links", json!({ "url": "not a url" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = send(&app, post_json("/links", json!({ "nope": true }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_json");

    let (status, body) = send(&app, get("/links")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_query");
}
