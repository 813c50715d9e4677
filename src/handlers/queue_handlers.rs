use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Query;
use std::sync::Arc;
use tracing::{instrument, info, warn};

use crate::db::DbPool;
use crate::dto::{AsOfQueryDto, QueueQueryDto};
use crate::errors::ApiError;
use crate::handlers::as_of_or_today;
use crate::models::{ReviewItem, ReviewSummaryCounts};
use crate::repo;
use crate::state::QueueLimits;

/// Handler for building a learner's review queue
///
/// This function handles GET requests to `/learners/{owner_id}/queue`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `limits` - The configured default and maximum queue lengths
/// * `owner_id` - The learner whose queue to build
/// * `query` - Optional filter, as-of date and limit
///
/// ### Returns
///
/// The due items as JSON, oldest-due first
#[instrument(skip(pool, limits), fields(owner_id = %owner_id, query = %query))]
pub async fn get_queue_handler(
    State(pool): State<Arc<DbPool>>,
    State(limits): State<QueueLimits>,
    Path(owner_id): Path<String>,
    Query(query): Query<QueueQueryDto>,
) -> Result<Json<Vec<ReviewItem>>, ApiError> {
    let filter = query.parse_filter().inspect_err(|e| warn!("Rejected queue filter: {}", e))?;
    let limit = limits.resolve(query.limit);

    let queue = repo::build_queue(&pool, &owner_id, &filter, as_of_or_today(query.as_of), limit)?;

    info!("Returning queue of {} items", queue.len());
    Ok(Json(queue))
}

/// Handler for the dashboard's due-state counts
///
/// This function handles GET requests to `/learners/{owner_id}/summary_counts`.
///
/// ### Returns
///
/// Overdue, due-today, upcoming and total active counts as JSON
#[instrument(skip(pool), fields(owner_id = %owner_id))]
pub async fn get_summary_counts_handler(
    State(pool): State<Arc<DbPool>>,
    Path(owner_id): Path<String>,
    Query(query): Query<AsOfQueryDto>,
) -> Result<Json<ReviewSummaryCounts>, ApiError> {
    let counts = repo::get_review_summary_counts(&pool, &owner_id, as_of_or_today(query.as_of))?;

    Ok(Json(counts))
}
