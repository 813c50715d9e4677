use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, debug, info, warn};

use crate::db::DbPool;
use crate::dto::{QueueQueryDto, RateItemDto, SummarizeSessionDto};
use crate::errors::ApiError;
use crate::handlers::as_of_or_today;
use crate::models::{Rating, ReviewItem};
use crate::session::{ReviewSession, SessionRegistry, SessionView};
use crate::state::QueueLimits;
use crate::summary::{SessionSummary, summarize_session};

/// The item a session rating was applied to, and the session afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRatingResponse {
    pub item: ReviewItem,
    pub session: SessionView,
}

/// Handler for starting a review session
///
/// This function handles POST requests to `/learners/{owner_id}/sessions`.
/// The queue is loaded once here; later changes to the learner's items do not
/// affect the running session.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `sessions` - The live session registry
/// * `limits` - The configured default and maximum queue lengths
/// * `owner_id` - The learner starting the session
/// * `payload` - Optional filter, as-of date and limit
///
/// ### Returns
///
/// 201 with the new session's view as JSON
#[instrument(skip(pool, sessions, limits), fields(owner_id = %owner_id, query = %payload))]
pub async fn start_session_handler(
    State(pool): State<Arc<DbPool>>,
    State(sessions): State<Arc<SessionRegistry>>,
    State(limits): State<QueueLimits>,
    Path(owner_id): Path<String>,
    Json(payload): Json<QueueQueryDto>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let filter = payload.parse_filter().inspect_err(|e| warn!("Rejected session filter: {}", e))?;
    let limit = limits.resolve(payload.limit);

    let session = ReviewSession::start(&pool, &owner_id, filter, as_of_or_today(payload.as_of), limit).await?;
    let view = session.view();
    sessions.insert(session, Utc::now()).await;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Handler for getting a session's current state
///
/// This function handles GET requests to `/learners/{owner_id}/sessions/{session_id}`.
///
/// ### Returns
///
/// The session view: the current item while in progress, the summary once complete
#[instrument(skip(sessions), fields(owner_id = %owner_id, session_id = %session_id))]
pub async fn get_session_handler(
    State(sessions): State<Arc<SessionRegistry>>,
    Path((owner_id, session_id)): Path<(String, String)>,
) -> Result<Json<SessionView>, ApiError> {
    let session = sessions.get(&owner_id, &session_id, Utc::now()).await?;
    let view = session.lock().await.view();

    Ok(Json(view))
}

/// Handler for rating the current item of a session
///
/// This function handles POST requests to `/learners/{owner_id}/sessions/{session_id}/ratings`.
///
/// ### Errors
///
/// 400 for an unknown rating, 404 for an unknown session, 409 if the session is complete
#[instrument(skip(pool, sessions, payload), fields(owner_id = %owner_id, session_id = %session_id, rating = %payload.rating))]
pub async fn rate_session_item_handler(
    State(pool): State<Arc<DbPool>>,
    State(sessions): State<Arc<SessionRegistry>>,
    Path((owner_id, session_id)): Path<(String, String)>,
    Json(payload): Json<RateItemDto>,
) -> Result<Json<SessionRatingResponse>, ApiError> {
    let rating = payload.rating.parse::<Rating>().inspect_err(|e| warn!("Rejected rating: {}", e))?;

    let session = sessions.get(&owner_id, &session_id, Utc::now()).await?;
    let mut session = session.lock().await;

    let item = session.rate_current(&pool, rating, Utc::now()).await?;
    debug!("Session has {} items left", session.remaining());

    Ok(Json(SessionRatingResponse { item, session: session.view() }))
}

/// Handler for abandoning a session
///
/// This function handles DELETE requests to `/learners/{owner_id}/sessions/{session_id}`.
/// Ratings already given stay applied.
#[instrument(skip(sessions), fields(owner_id = %owner_id, session_id = %session_id))]
pub async fn abandon_session_handler(
    State(sessions): State<Arc<SessionRegistry>>,
    Path((owner_id, session_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    sessions.remove(&owner_id, &session_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for summarizing a list of session ratings
///
/// This function handles POST requests to `/session_summaries`. Read-only.
#[instrument(skip(payload), fields(count = payload.ratings.len()))]
pub async fn summarize_session_handler(
    Json(payload): Json<SummarizeSessionDto>,
) -> Result<Json<SessionSummary>, ApiError> {
    let ratings = payload.parse_ratings().inspect_err(|e| warn!("Rejected session ratings: {}", e))?;

    let summary = summarize_session(&ratings);

    info!("Summarized {} ratings, {} rolling over", summary.total, summary.rollover_count);
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::SessionRatingDto;
    use crate::session::SessionState;
    use crate::test_utils::*;

    fn registry() -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new(chrono::Duration::hours(1)))
    }

    #[tokio::test]
    async fn test_session_handlers_walkthrough() {
        let pool = setup_test_db();
        let sessions = registry();
        seed_item(&pool, "learner-1", None, "card-1", at(2024, 1, 1), 1, date(2024, 3, 1)).await;
        seed_item(&pool, "learner-1", None, "card-2", at(2024, 1, 1), 1, date(2024, 3, 2)).await;

        let (status, view) = start_session_handler(
            State(pool.clone()),
            State(sessions.clone()),
            State(QueueLimits::default()),
            Path("learner-1".to_string()),
            Json(QueueQueryDto { as_of: Some(date(2024, 3, 10)), ..Default::default() }),
        ).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view.0.total, 2);
        let session_id = view.0.id.clone();

        for (rated, rating) in ["know", "again"].into_iter().enumerate() {
            let response = rate_session_item_handler(
                State(pool.clone()),
                State(sessions.clone()),
                Path(("learner-1".to_string(), session_id.clone())),
                Json(RateItemDto { rating: rating.to_string() }),
            ).await.unwrap().0;
            assert_eq!(response.session.remaining, 2 - (rated + 1));
            assert!(response.item.get_last_reviewed_at().is_some());
        }

        let view = get_session_handler(
            State(sessions.clone()),
            Path(("learner-1".to_string(), session_id.clone())),
        ).await.unwrap().0;
        assert_eq!(view.state, SessionState::Complete);
        let summary = view.summary.unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.rollover_count, 1);

        let result = rate_session_item_handler(
            State(pool.clone()),
            State(sessions.clone()),
            Path(("learner-1".to_string(), session_id.clone())),
            Json(RateItemDto { rating: "know".to_string() }),
        ).await;
        assert!(matches!(result.unwrap_err(), ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_abandon_session_handler() {
        let pool = setup_test_db();
        let sessions = registry();

        let (_, view) = start_session_handler(
            State(pool.clone()),
            State(sessions.clone()),
            State(QueueLimits::default()),
            Path("learner-1".to_string()),
            Json(QueueQueryDto::default()),
        ).await.unwrap();
        let session_id = view.0.id.clone();

        let result = abandon_session_handler(
            State(sessions.clone()),
            Path(("learner-2".to_string(), session_id.clone())),
        ).await;
        assert!(matches!(result.unwrap_err(), ApiError::NotFound));

        let status = abandon_session_handler(
            State(sessions.clone()),
            Path(("learner-1".to_string(), session_id.clone())),
        ).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let result = get_session_handler(
            State(sessions.clone()),
            Path(("learner-1".to_string(), session_id)),
        ).await;
        assert!(matches!(result.unwrap_err(), ApiError::NotFound));
    }

    #[tokio::test]
    async fn test_summarize_session_handler() {
        let payload = SummarizeSessionDto {
            ratings: ["know", "confused", "forgot", "again"]
                .iter()
                .enumerate()
                .map(|(i, rating)| SessionRatingDto { item_id: format!("item-{}", i), rating: rating.to_string() })
                .collect(),
        };

        let summary = summarize_session_handler(Json(payload)).await.unwrap().0;

        assert_eq!((summary.know, summary.confused, summary.forgot, summary.again), (1, 1, 1, 1));
        assert_eq!(summary.rollover_count, 3);
    }

    #[tokio::test]
    async fn test_summarize_session_handler_rejects_unknown_rating() {
        let payload = SummarizeSessionDto {
            ratings: vec![SessionRatingDto { item_id: "a".to_string(), rating: "meh".to_string() }],
        };

        let result = summarize_session_handler(Json(payload)).await;

        assert!(matches!(result.unwrap_err(), ApiError::InvalidRating(_)));
    }
}
