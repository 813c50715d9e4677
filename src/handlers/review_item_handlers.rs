use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{instrument, debug, info, warn};

use crate::db::DbPool;
use crate::dto::{AsOfQueryDto, ListReviewItemsQueryDto, RateItemDto, RegisterReviewItemDto, UpdateStatusDto};
use crate::errors::ApiError;
use crate::handlers::as_of_or_today;
use crate::models::{ItemStatus, LegacyRating, Rating, ReviewItem};
use crate::repo;
use crate::scheduler::{self, RatingPreview};

/// Handler for registering a wrong answer or flashcard for review
///
/// This function handles POST requests to `/learners/{owner_id}/review_items`.
/// Registering the same source twice returns the existing item.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `owner_id` - The learner who owns the item
/// * `payload` - The source type, source ID and optional course ID
///
/// ### Returns
///
/// The active review item for the source as JSON
#[instrument(skip(pool, payload), fields(owner_id = %owner_id, source_id = %payload.source_id))]
pub async fn register_review_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path(owner_id): Path<String>,
    Json(payload): Json<RegisterReviewItemDto>,
) -> Result<Json<ReviewItem>, ApiError> {
    let source_type = payload.parse_source_type().inspect_err(|e| warn!("Rejected registration: {}", e))?;

    let item = repo::register_review_item(
        &pool,
        &owner_id,
        payload.course_id.as_deref(),
        source_type,
        &payload.source_id,
        Utc::now(),
    ).await?;

    info!("Registered source as review item {}", item.get_id());
    Ok(Json(item))
}

/// Handler for listing a learner's review items
///
/// This function handles GET requests to `/learners/{owner_id}/review_items`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `owner_id` - The learner whose items to list
/// * `query` - An optional status filter
///
/// ### Returns
///
/// The learner's items as JSON, oldest first
#[instrument(skip(pool), fields(owner_id = %owner_id))]
pub async fn list_review_items_handler(
    State(pool): State<Arc<DbPool>>,
    Path(owner_id): Path<String>,
    Query(query): Query<ListReviewItemsQueryDto>,
) -> Result<Json<Vec<ReviewItem>>, ApiError> {
    let status = query.parse_status().inspect_err(|e| warn!("Rejected list query: {}", e))?;

    let items = repo::list_review_items(&pool, &owner_id, status)?;

    info!("Listed {} review items", items.len());
    Ok(Json(items))
}

/// Handler for getting a single review item
///
/// This function handles GET requests to `/learners/{owner_id}/review_items/{item_id}`.
///
/// ### Returns
///
/// The item as JSON, or 404 if the learner has no such item
#[instrument(skip(pool), fields(owner_id = %owner_id, item_id = %item_id))]
pub async fn get_review_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path((owner_id, item_id)): Path<(String, String)>,
) -> Result<Json<ReviewItem>, ApiError> {
    let item = repo::get_review_item(&pool, &owner_id, &item_id)?
        .ok_or(ApiError::NotFound)?;

    debug!("Found review item in box {}", item.get_box());
    Ok(Json(item))
}

/// Handler for rating a review item
///
/// This function handles POST requests to `/learners/{owner_id}/review_items/{item_id}/ratings`.
/// The rating is validated before the store is touched.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `owner_id` - The learner the item must belong to
/// * `item_id` - The ID of the item being rated
/// * `payload` - One of "know", "confused", "forgot", "again"
///
/// ### Returns
///
/// The item with its new box and due date as JSON
#[instrument(skip(pool, payload), fields(owner_id = %owner_id, item_id = %item_id, rating = %payload.rating))]
pub async fn rate_review_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path((owner_id, item_id)): Path<(String, String)>,
    Json(payload): Json<RateItemDto>,
) -> Result<Json<ReviewItem>, ApiError> {
    let rating = payload.rating.parse::<Rating>().inspect_err(|e| warn!("Rejected rating: {}", e))?;

    let item = repo::rate_item(&pool, &owner_id, &item_id, rating, Utc::now()).await?;

    Ok(Json(item))
}

/// Handler for the three-outcome dashboard rating
///
/// This function handles POST requests to
/// `/learners/{owner_id}/review_items/{item_id}/legacy_ratings` and accepts
/// "know", "unsure" or "forgot".
#[instrument(skip(pool, payload), fields(owner_id = %owner_id, item_id = %item_id, rating = %payload.rating))]
pub async fn rate_review_item_legacy_handler(
    State(pool): State<Arc<DbPool>>,
    Path((owner_id, item_id)): Path<(String, String)>,
    Json(payload): Json<RateItemDto>,
) -> Result<Json<ReviewItem>, ApiError> {
    let rating = payload.rating.parse::<LegacyRating>().inspect_err(|e| warn!("Rejected legacy rating: {}", e))?;

    let item = repo::rate_item_legacy(&pool, &owner_id, &item_id, rating, Utc::now()).await?;

    Ok(Json(item))
}

/// Handler for suspending or resuming a review item
///
/// This function handles PUT requests to `/learners/{owner_id}/review_items/{item_id}/status`.
///
/// ### Returns
///
/// The updated item as JSON; 409 if resuming would duplicate an active item
#[instrument(skip(pool, payload), fields(owner_id = %owner_id, item_id = %item_id, status = %payload.status))]
pub async fn update_review_item_status_handler(
    State(pool): State<Arc<DbPool>>,
    Path((owner_id, item_id)): Path<(String, String)>,
    Json(payload): Json<UpdateStatusDto>,
) -> Result<Json<ReviewItem>, ApiError> {
    let status = payload.status.parse::<ItemStatus>().inspect_err(|e| warn!("Rejected status: {}", e))?;

    let item = repo::set_review_item_status(&pool, &owner_id, &item_id, status).await?;

    Ok(Json(item))
}

/// Handler for previewing where each rating would send an item
///
/// This function handles GET requests to
/// `/learners/{owner_id}/review_items/{item_id}/next_reviews`. Nothing is written.
///
/// ### Returns
///
/// One entry per rating with the resulting box and due date
#[instrument(skip(pool), fields(owner_id = %owner_id, item_id = %item_id))]
pub async fn get_next_reviews_handler(
    State(pool): State<Arc<DbPool>>,
    Path((owner_id, item_id)): Path<(String, String)>,
    Query(query): Query<AsOfQueryDto>,
) -> Result<Json<Vec<RatingPreview>>, ApiError> {
    let item = repo::get_review_item(&pool, &owner_id, &item_id)?
        .ok_or(ApiError::NotFound)?;

    let previews = scheduler::preview(item.get_box(), as_of_or_today(query.as_of));

    debug!("Previewed {} ratings from box {}", previews.len(), item.get_box());
    Ok(Json(previews))
}
