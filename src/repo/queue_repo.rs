use crate::db::DbPool;
use crate::models::{ItemStatus, QueueFilter, ReviewItem, ReviewSummaryCounts};
use crate::schema::review_items;
use anyhow::Result;
use chrono::NaiveDate;
use diesel::prelude::*;
use tracing::{instrument, debug, info};

/// Builds the ordered queue of due items for a learner
///
/// Only active items are eligible. Items come back oldest-due first, ties
/// broken by creation time and then by ID so the order is fully deterministic.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner_id` - The learner whose items to queue
/// * `filter` - Which due items to include
/// * `as_of` - The date "due" is measured against
/// * `limit` - The maximum number of items to return
///
/// ### Returns
///
/// A Result containing at most `limit` due items
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(owner_id = %owner_id, filter = %filter, as_of = %as_of, limit = limit))]
pub fn build_queue(
    pool: &DbPool,
    owner_id: &str,
    filter: &QueueFilter,
    as_of: NaiveDate,
    limit: usize,
) -> Result<Vec<ReviewItem>> {
    if limit == 0 {
        debug!("Zero limit, returning an empty queue");
        return Ok(Vec::new());
    }

    let conn = &mut pool.get()?;

    let mut query = review_items::table
        .filter(review_items::owner_id.eq(owner_id))
        .filter(review_items::status.eq(ItemStatus::Active))
        .select(ReviewItem::as_select())
        .into_boxed();

    query = match filter {
        QueueFilter::Overdue => query.filter(review_items::next_review_at.lt(as_of)),
        QueueFilter::Today => query.filter(review_items::next_review_at.eq(as_of)),
        QueueFilter::All => query.filter(review_items::next_review_at.le(as_of)),
        QueueFilter::Course(course_id) => {
            debug!("Restricting queue to course {}", course_id);
            query
                .filter(review_items::next_review_at.le(as_of))
                .filter(review_items::course_id.eq(course_id))
        }
    };

    let results = query
        .order_by((
            review_items::next_review_at.asc(),
            review_items::created_at.asc(),
            review_items::id.asc(),
        ))
        .limit(i64::try_from(limit).unwrap_or(i64::MAX))
        .load(conn)?;

    info!("Built queue of {} items", results.len());

    Ok(results)
}

/// Counts a learner's active items by due state
///
/// All four counts are read inside one transaction so they describe the same
/// snapshot even while ratings are being written.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner_id` - The learner whose items to count
/// * `as_of` - The date "due" is measured against
#[instrument(skip(pool), fields(owner_id = %owner_id, as_of = %as_of))]
pub fn get_review_summary_counts(pool: &DbPool, owner_id: &str, as_of: NaiveDate) -> Result<ReviewSummaryCounts> {
    let conn = &mut pool.get()?;

    let counts = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let active = || {
            review_items::table
                .filter(review_items::owner_id.eq(owner_id))
                .filter(review_items::status.eq(ItemStatus::Active))
        };

        let overdue_count = active()
            .filter(review_items::next_review_at.lt(as_of))
            .count()
            .get_result::<i64>(conn)?;
        let today_count = active()
            .filter(review_items::next_review_at.eq(as_of))
            .count()
            .get_result::<i64>(conn)?;
        let upcoming_count = active()
            .filter(review_items::next_review_at.gt(as_of))
            .count()
            .get_result::<i64>(conn)?;
        let total_active = active().count().get_result::<i64>(conn)?;

        Ok(ReviewSummaryCounts { overdue_count, today_count, upcoming_count, total_active })
    })?;

    debug!("Summary counts: {:?}", counts);

    Ok(counts)
}

#[cfg(test)]
mod prop_tests;
