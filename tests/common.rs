/// Common test utilities for Recall integration tests
///
/// This file contains shared functions for all integration tests: building a
/// test application, sending JSON requests, and registering review items.

use recall::{
    create_app,
    db::init_pool,
    models::ReviewItem,
    AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service;

/// Creates a test application backed by a fresh in-memory SQLite database
///
/// Each call gets its own shared-cache database, so tests never see each
/// other's rows while every pooled connection sees the same one.
///
/// ### Returns
///
/// An Axum Router configured with all routes
pub fn create_test_app() -> Router {
    let database_url = format!(
        "file:integration_{}?mode=memory&cache=shared",
        uuid::Uuid::new_v4()
    );
    let pool = Arc::new(init_pool(&database_url).unwrap());

    let conn = &mut pool.get().unwrap();
    recall::run_migrations(conn).unwrap();

    create_app(AppState::new(pool))
}

/// Sends a request with an optional JSON body
///
/// ### Returns
///
/// The status code and the raw response body
pub async fn send(app: &mut Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.call(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

/// Sends a request and decodes the JSON response, asserting the status first
pub async fn send_json<T: DeserializeOwned>(
    app: &mut Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    expected: StatusCode,
) -> T {
    let (status, bytes) = send(app, method, uri, body).await;
    assert_eq!(
        status,
        expected,
        "unexpected status for {} {}: {}",
        method,
        uri,
        String::from_utf8_lossy(&bytes)
    );
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers a wrong-answer note as a review item for `owner`
///
/// ### Arguments
///
/// * `app` - The test application
/// * `owner` - The learner the item belongs to
/// * `source_id` - The wrong note's ID
/// * `course_id` - The course the note belongs to
///
/// ### Returns
///
/// The registered ReviewItem
pub async fn register_note(app: &mut Router, owner: &str, source_id: &str, course_id: &str) -> ReviewItem {
    send_json(
        app,
        "POST",
        &format!("/learners/{}/review_items", owner),
        Some(json!({
            "course_id": course_id,
            "source_type": "wrong_note",
            "source_id": source_id,
        })),
        StatusCode::OK,
    )
    .await
}

/// Today's date in UTC, the default as-of date of every endpoint
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
