use crate::db::{self, DbPool, execute_with_retry};
use crate::errors::ReviewError;
use crate::models::{ItemStatus, LegacyRating, Rating, ReviewItem, SourceType};
use crate::scheduler::{self, Advance};
use crate::schema::review_items;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::{instrument, debug, info};

/// Loads an item by ID, but only if it belongs to the given owner
fn load_owned(conn: &mut SqliteConnection, owner_id: &str, item_id: &str) -> QueryResult<Option<ReviewItem>> {
    review_items::table
        .find(item_id)
        .filter(review_items::owner_id.eq(owner_id))
        .select(ReviewItem::as_select())
        .first(conn)
        .optional()
}

/// Loads the active item for a source fact, if there is one
fn load_active_for_source(
    conn: &mut SqliteConnection,
    owner_id: &str,
    source_type: SourceType,
    source_id: &str,
) -> QueryResult<Option<ReviewItem>> {
    review_items::table
        .filter(review_items::owner_id.eq(owner_id))
        .filter(review_items::source_type.eq(source_type))
        .filter(review_items::source_id.eq(source_id))
        .filter(review_items::status.eq(ItemStatus::Active))
        .select(ReviewItem::as_select())
        .first(conn)
        .optional()
}

/// Retrieves a review item owned by the given learner
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner_id` - The learner the item must belong to
/// * `item_id` - The ID of the item to retrieve
///
/// ### Returns
///
/// A Result containing an Option with the item if found, or None if it does
/// not exist or belongs to someone else
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(owner_id = %owner_id, item_id = %item_id))]
pub fn get_review_item(pool: &DbPool, owner_id: &str, item_id: &str) -> Result<Option<ReviewItem>> {
    debug!("Retrieving review item by id");

    let conn = &mut pool.get()?;
    let result = load_owned(conn, owner_id, item_id)?;

    if result.is_none() {
        debug!("Review item not found for owner");
    }

    Ok(result)
}

/// Finds the active review item for a source fact
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner_id` - The learner who owns the item
/// * `source_type` - Whether the source is a wrong answer or a flashcard
/// * `source_id` - The ID of the source fact
///
/// ### Returns
///
/// A Result containing the active item, or None if the source has no active item
#[instrument(skip(pool), fields(owner_id = %owner_id, source_type = %source_type, source_id = %source_id))]
pub fn find_active_review_item(
    pool: &DbPool,
    owner_id: &str,
    source_type: SourceType,
    source_id: &str,
) -> Result<Option<ReviewItem>> {
    let conn = &mut pool.get()?;
    Ok(load_active_for_source(conn, owner_id, source_type, source_id)?)
}

/// Lists a learner's review items, oldest first
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner_id` - The learner whose items to list
/// * `status` - Only list items with this status, if given
#[instrument(skip(pool), fields(owner_id = %owner_id))]
pub fn list_review_items(pool: &DbPool, owner_id: &str, status: Option<ItemStatus>) -> Result<Vec<ReviewItem>> {
    debug!("Listing review items with status filter {:?}", status);

    let conn = &mut pool.get()?;

    let mut query = review_items::table
        .filter(review_items::owner_id.eq(owner_id))
        .select(ReviewItem::as_select())
        .into_boxed();

    if let Some(status) = status {
        query = query.filter(review_items::status.eq(status));
    }

    let results = query
        .order_by((review_items::created_at.asc(), review_items::id.asc()))
        .load(conn)?;

    info!("Retrieved {} review items", results.len());

    Ok(results)
}

/// Inserts a review item
///
/// If the insert trips the one-active-item-per-source constraint, a
/// concurrent registration got there first and its row is returned instead.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `item` - The item to insert
///
/// ### Returns
///
/// A Result containing the stored item: either `item` or the active item that already existed
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database insert fails for any reason other than the uniqueness constraint
#[instrument(skip(pool, item), fields(item_id = %item.get_id(), owner_id = %item.get_owner_id()))]
pub async fn create_review_item(pool: &DbPool, item: &ReviewItem) -> Result<ReviewItem> {
    debug!("Inserting review item");

    let mut conn = pool.get()?;

    let inserted = execute_with_retry(&mut conn, |conn| {
        diesel::insert_into(review_items::table)
            .values(item)
            .execute(conn)
    }).await;

    match inserted {
        Ok(_) => {
            info!("Successfully created review item with id: {}", item.get_id());
            Ok(item.clone())
        },
        Err(err) if db::is_unique_violation(&err) && item.is_active() => {
            info!("Active review item already exists for source {} {}, returning it", item.get_source_type(), item.get_source_id());
            load_active_for_source(&mut conn, &item.get_owner_id(), item.get_source_type(), &item.get_source_id())?
                .ok_or_else(|| anyhow!(
                    "Active review item for {} {} vanished after a uniqueness conflict",
                    item.get_source_type(),
                    item.get_source_id()
                ))
        },
        Err(err) => Err(err.into()),
    }
}

/// Registers a source fact for review, idempotently
///
/// Calling this again for the same `(owner, source_type, source_id)` returns
/// the existing active item unchanged, so retries and double submissions are safe.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner_id` - The learner who owns the item
/// * `course_id` - The course to file a new item under
/// * `source_type` - Whether the source is a wrong answer or a flashcard
/// * `source_id` - The ID of the source fact
/// * `now` - The registration time; a new item is due on this date
///
/// ### Returns
///
/// A Result containing the active review item for the source
#[instrument(skip(pool), fields(owner_id = %owner_id, source_type = %source_type, source_id = %source_id))]
pub async fn register_review_item(
    pool: &DbPool,
    owner_id: &str,
    course_id: Option<&str>,
    source_type: SourceType,
    source_id: &str,
    now: DateTime<Utc>,
) -> Result<ReviewItem> {
    if let Some(existing) = find_active_review_item(pool, owner_id, source_type, source_id)? {
        debug!("Source already registered as {}", existing.get_id());
        return Ok(existing);
    }

    let new_item = ReviewItem::new(
        owner_id.to_string(),
        course_id.map(str::to_string),
        source_type,
        source_id.to_string(),
        now,
    );

    create_review_item(pool, &new_item).await
}

/// Registers a wrong answer recorded by quiz grading
pub async fn register_wrong_answer(
    pool: &DbPool,
    owner_id: &str,
    course_id: Option<&str>,
    note_id: &str,
    now: DateTime<Utc>,
) -> Result<ReviewItem> {
    register_review_item(pool, owner_id, course_id, SourceType::WrongNote, note_id, now).await
}

/// Registers a generated flashcard
pub async fn register_flashcard(
    pool: &DbPool,
    owner_id: &str,
    course_id: Option<&str>,
    flashcard_id: &str,
    now: DateTime<Utc>,
) -> Result<ReviewItem> {
    register_review_item(pool, owner_id, course_id, SourceType::Flashcard, flashcard_id, now).await
}

/// Rewrites an item's schedule inside one immediate transaction
///
/// `step_for` receives the box as stored at the moment the write lock is held,
/// so two ratings of the same item serialise and the later one wins.
async fn update_schedule_with<F>(
    pool: &DbPool,
    owner_id: &str,
    item_id: &str,
    reviewed_at: DateTime<Utc>,
    step_for: F,
) -> Result<ReviewItem>
where
    F: Fn(i32) -> Advance,
{
    let mut conn = pool.get()?;

    let updated = execute_with_retry(&mut conn, |conn| {
        conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            let Some(mut item) = load_owned(conn, owner_id, item_id)? else {
                return Ok(None);
            };

            item.apply_advance(step_for(item.get_box()), reviewed_at);

            diesel::update(review_items::table.find(item.get_id()))
                .set((
                    review_items::box_number.eq(item.get_box()),
                    review_items::next_review_at.eq(item.get_next_review_at()),
                    review_items::last_reviewed_at.eq(item.get_last_reviewed_at_raw()),
                ))
                .execute(conn)?;

            Ok(Some(item))
        })
    }).await?;

    updated.ok_or_else(|| anyhow::Error::from(ReviewError::NotFound))
}

/// Writes a precomputed schedule to an item
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner_id` - The learner the item must belong to
/// * `item_id` - The ID of the item to update
/// * `step` - The new box and due date
/// * `reviewed_at` - Stored as the item's last review time
///
/// ### Errors
///
/// Returns `ReviewError::NotFound` if the item does not resolve to one owned by `owner_id`
#[instrument(skip(pool), fields(owner_id = %owner_id, item_id = %item_id))]
pub async fn update_review_item_schedule(
    pool: &DbPool,
    owner_id: &str,
    item_id: &str,
    step: Advance,
    reviewed_at: DateTime<Utc>,
) -> Result<ReviewItem> {
    update_schedule_with(pool, owner_id, item_id, reviewed_at, move |_| step).await
}

/// Applies a session rating to an item
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner_id` - The learner the item must belong to
/// * `item_id` - The ID of the item being rated
/// * `rating` - The learner's rating
/// * `now` - When the rating happened; its UTC date is "today" for the scheduler
///
/// ### Returns
///
/// A Result containing the item with its new box, due date and review time
///
/// ### Errors
///
/// Returns an error if:
/// - The item does not resolve to one owned by `owner_id` (`ReviewError::NotFound`)
/// - Unable to get a connection from the pool
/// - The database transaction fails
#[instrument(skip(pool), fields(owner_id = %owner_id, item_id = %item_id, rating = %rating))]
pub async fn rate_item(
    pool: &DbPool,
    owner_id: &str,
    item_id: &str,
    rating: Rating,
    now: DateTime<Utc>,
) -> Result<ReviewItem> {
    let today = now.date_naive();
    let item = update_schedule_with(pool, owner_id, item_id, now, move |current_box| {
        scheduler::advance(current_box, rating, today)
    }).await?;

    info!("Rated item {}: box {}, next review {}", item.get_id(), item.get_box(), item.get_next_review_at());

    Ok(item)
}

/// Applies a three-outcome dashboard rating to an item
///
/// Scheduling follows [`scheduler::advance_legacy`]; see [`rate_item`] for the arguments.
#[instrument(skip(pool), fields(owner_id = %owner_id, item_id = %item_id, rating = %rating))]
pub async fn rate_item_legacy(
    pool: &DbPool,
    owner_id: &str,
    item_id: &str,
    rating: LegacyRating,
    now: DateTime<Utc>,
) -> Result<ReviewItem> {
    let today = now.date_naive();
    let item = update_schedule_with(pool, owner_id, item_id, now, move |current_box| {
        scheduler::advance_legacy(current_box, rating, today)
    }).await?;

    info!("Rated item {} (legacy): box {}, next review {}", item.get_id(), item.get_box(), item.get_next_review_at());

    Ok(item)
}

/// Suspends or resumes a review item
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner_id` - The learner the item must belong to
/// * `item_id` - The ID of the item to update
/// * `status` - The new status
///
/// ### Errors
///
/// Returns an error if:
/// - The item does not resolve to one owned by `owner_id` (`ReviewError::NotFound`)
/// - Resuming would give the source a second active item (`ReviewError::DuplicateActive`)
/// - The database update fails
#[instrument(skip(pool), fields(owner_id = %owner_id, item_id = %item_id, status = %status))]
pub async fn set_review_item_status(
    pool: &DbPool,
    owner_id: &str,
    item_id: &str,
    status: ItemStatus,
) -> Result<ReviewItem> {
    let mut item = get_review_item(pool, owner_id, item_id)?
        .ok_or(ReviewError::NotFound)?;

    if item.get_status() == status {
        debug!("Already at requested status");
        return Ok(item);
    }

    let mut conn = pool.get()?;
    let updated = execute_with_retry(&mut conn, |conn| {
        diesel::update(
            review_items::table
                .find(item_id)
                .filter(review_items::owner_id.eq(owner_id))
        )
            .set(review_items::status.eq(status))
            .execute(conn)
    }).await;

    match updated {
        Ok(0) => Err(ReviewError::NotFound.into()),
        Ok(_) => {
            item.set_status(status);
            info!("Review item {} is now {}", item_id, status);
            Ok(item)
        },
        Err(err) if db::is_unique_violation(&err) => Err(ReviewError::DuplicateActive.into()),
        Err(err) => Err(err.into()),
    }
}
