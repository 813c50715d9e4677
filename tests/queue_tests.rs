/// Integration tests for the due queue and dashboard counts
///
/// Registered items are due on the day they are registered, so these tests
/// move the as-of date instead of the items.

use axum::http::StatusCode;
use chrono::Days;
use recall::models::{ReviewItem, ReviewSummaryCounts};
use serde_json::json;

mod common;
use common::*;

/// Tests that a fresh item is in today's queue and not in the overdue one
#[tokio::test]
async fn test_queue_filters_on_registration_day() {
    let mut app = create_test_app();
    let item = register_note(&mut app, "alice", "note-1", "bio-101").await;

    let queue: Vec<ReviewItem> = send_json(&mut app, "GET", "/learners/alice/queue", None, StatusCode::OK).await;
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].get_id(), item.get_id());

    let queue: Vec<ReviewItem> =
        send_json(&mut app, "GET", "/learners/alice/queue?filter=today", None, StatusCode::OK).await;
    assert_eq!(queue.len(), 1);

    let queue: Vec<ReviewItem> =
        send_json(&mut app, "GET", "/learners/alice/queue?filter=overdue", None, StatusCode::OK).await;
    assert!(queue.is_empty());
}

/// Tests that the same item turns overdue once the as-of date passes it
#[tokio::test]
async fn test_queue_overdue_as_of_later_date() {
    let mut app = create_test_app();
    register_note(&mut app, "alice", "note-1", "bio-101").await;
    let later = today() + Days::new(5);

    let overdue: Vec<ReviewItem> = send_json(
        &mut app,
        "GET",
        &format!("/learners/alice/queue?filter=overdue&as_of={}", later),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(overdue.len(), 1);

    let due_today: Vec<ReviewItem> = send_json(
        &mut app,
        "GET",
        &format!("/learners/alice/queue?filter=today&as_of={}", later),
        None,
        StatusCode::OK,
    )
    .await;
    assert!(due_today.is_empty());
}

/// Tests that a rated item leaves the queue until its new due date
#[tokio::test]
async fn test_rated_item_leaves_queue() {
    let mut app = create_test_app();
    let item = register_note(&mut app, "alice", "note-1", "bio-101").await;
    register_note(&mut app, "alice", "note-2", "bio-101").await;

    let _: ReviewItem = send_json(
        &mut app,
        "POST",
        &format!("/learners/alice/review_items/{}/ratings", item.get_id()),
        Some(json!({ "rating": "know" })),
        StatusCode::OK,
    )
    .await;

    let queue: Vec<ReviewItem> = send_json(&mut app, "GET", "/learners/alice/queue", None, StatusCode::OK).await;
    assert_eq!(queue.len(), 1);
    assert_ne!(queue[0].get_id(), item.get_id());

    let queue: Vec<ReviewItem> = send_json(
        &mut app,
        "GET",
        &format!("/learners/alice/queue?as_of={}", today() + Days::new(3)),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(queue.len(), 2);
}

/// Tests the course filter, the limit and owner scoping together
#[tokio::test]
async fn test_queue_course_limit_and_owner() {
    let mut app = create_test_app();
    for i in 0..4 {
        register_note(&mut app, "alice", &format!("bio-{}", i), "bio-101").await;
    }
    register_note(&mut app, "alice", "chem-0", "chem-200").await;
    register_note(&mut app, "bob", "bio-0", "bio-101").await;

    let queue: Vec<ReviewItem> =
        send_json(&mut app, "GET", "/learners/alice/queue?filter=chem-200", None, StatusCode::OK).await;
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].get_source_id(), "chem-0");

    let queue: Vec<ReviewItem> =
        send_json(&mut app, "GET", "/learners/alice/queue?limit=3", None, StatusCode::OK).await;
    assert_eq!(queue.len(), 3);
    assert!(queue.iter().all(|item| item.get_owner_id() == "alice"));

    let queue: Vec<ReviewItem> = send_json(&mut app, "GET", "/learners/bob/queue", None, StatusCode::OK).await;
    assert_eq!(queue.len(), 1);
}

/// Tests that an oversized limit is capped rather than rejected
#[tokio::test]
async fn test_queue_limit_is_capped() {
    let mut app = create_test_app();
    register_note(&mut app, "alice", "note-1", "bio-101").await;

    let queue: Vec<ReviewItem> =
        send_json(&mut app, "GET", "/learners/alice/queue?limit=100000", None, StatusCode::OK).await;
    assert_eq!(queue.len(), 1);
}

/// Tests that a malformed as-of date is a client error
#[tokio::test]
async fn test_queue_rejects_bad_date() {
    let mut app = create_test_app();

    let (status, _) = send(&mut app, "GET", "/learners/alice/queue?as_of=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Tests the dashboard counts across overdue, today and upcoming
#[tokio::test]
async fn test_summary_counts() {
    let mut app = create_test_app();
    let rated = register_note(&mut app, "alice", "note-1", "bio-101").await;
    register_note(&mut app, "alice", "note-2", "bio-101").await;
    let suspended = register_note(&mut app, "alice", "note-3", "bio-101").await;

    let _: ReviewItem = send_json(
        &mut app,
        "POST",
        &format!("/learners/alice/review_items/{}/ratings", rated.get_id()),
        Some(json!({ "rating": "forgot" })),
        StatusCode::OK,
    )
    .await;
    let _: ReviewItem = send_json(
        &mut app,
        "PUT",
        &format!("/learners/alice/review_items/{}/status", suspended.get_id()),
        Some(json!({ "status": "suspended" })),
        StatusCode::OK,
    )
    .await;

    let counts: ReviewSummaryCounts =
        send_json(&mut app, "GET", "/learners/alice/summary_counts", None, StatusCode::OK).await;
    assert_eq!(counts, ReviewSummaryCounts { overdue_count: 0, today_count: 1, upcoming_count: 1, total_active: 2 });

    // a day later the untouched item is overdue and the rated one is due
    let counts: ReviewSummaryCounts = send_json(
        &mut app,
        "GET",
        &format!("/learners/alice/summary_counts?as_of={}", today() + Days::new(1)),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(counts, ReviewSummaryCounts { overdue_count: 1, today_count: 1, upcoming_count: 0, total_active: 2 });

    let counts: ReviewSummaryCounts =
        send_json(&mut app, "GET", "/learners/bob/summary_counts", None, StatusCode::OK).await;
    assert_eq!(counts, ReviewSummaryCounts::default());
}
