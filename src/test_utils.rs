use crate::*;
use crate::models::{ItemStatus, LegacyRating, Rating, ReviewItem, SourceType};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Sets up a test database with migrations applied
///
/// This function:
/// 1. Creates an in-memory SQLite database
/// 2. Runs all migrations to set up the schema
///
/// ### Returns
///
/// An Arc-wrapped database connection pool connected to the in-memory database
pub fn setup_test_db() -> Arc<db::DbPool> {
    // Plain ":memory:" gives each pooled connection its own database, so use a
    // unique shared-cache URI: one database per test, visible to every connection.
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");

    Arc::new(pool)
}

/// Sets up a file-backed test database in `dir`
///
/// Used where real cross-connection locking matters, which shared-cache
/// in-memory databases don't model faithfully.
pub fn setup_file_db(dir: &Path) -> Arc<db::DbPool> {
    let database_url = dir.join("recall_test.db").to_string_lossy().to_string();
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");

    Arc::new(pool)
}

/// Builds a date, panicking on invalid input
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builds a UTC timestamp at 09:00 on the given day
pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

/// Inserts an active item with an explicit box and due date
///
/// ### Arguments
///
/// * `pool` - The test pool
/// * `owner_id` - The owning learner
/// * `course_id` - The course, if any
/// * `source_id` - The flashcard ID to use as source
/// * `created_at` - The creation time
/// * `box_number` - The Leitner box
/// * `next_review_at` - The due date
pub async fn seed_item(
    pool: &db::DbPool,
    owner_id: &str,
    course_id: Option<&str>,
    source_id: &str,
    created_at: DateTime<Utc>,
    box_number: i32,
    next_review_at: NaiveDate,
) -> ReviewItem {
    let item = ReviewItem::new_with_fields(
        uuid::Uuid::new_v4().to_string(),
        owner_id.to_string(),
        course_id.map(str::to_string),
        SourceType::Flashcard,
        source_id.to_string(),
        box_number,
        next_review_at,
        None,
        ItemStatus::Active,
        created_at,
    );
    repo::create_review_item(pool, &item).await.unwrap()
}

/// Generates a valid Leitner box
pub fn arb_box() -> impl Strategy<Value = i32> {
    1i32..=5
}

/// Generates any box number, including out-of-range values
pub fn arb_any_box() -> impl Strategy<Value = i32> {
    prop_oneof![
        arb_box(),
        any::<i32>(),
    ]
}

/// Generates an arbitrary session rating
pub fn arb_rating() -> impl Strategy<Value = Rating> {
    prop_oneof![
        Just(Rating::Know),
        Just(Rating::Confused),
        Just(Rating::Forgot),
        Just(Rating::Again),
    ]
}

/// Generates an arbitrary dashboard rating
pub fn arb_legacy_rating() -> impl Strategy<Value = LegacyRating> {
    prop_oneof![
        Just(LegacyRating::Know),
        Just(LegacyRating::Unsure),
        Just(LegacyRating::Forgot),
    ]
}

/// Generates an arbitrary date between 2000-01-01 and 2099-12-31
pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..36_524).prop_map(|offset| date(2000, 1, 1) + chrono::Duration::days(offset))
}

/// Generates strings that include whitespace, unicode and control characters
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_./:-]{0,40}",
        ".{0,40}",
        Just(String::new()),
    ]
}
