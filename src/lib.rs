/// Recall: a Leitner spaced-repetition review scheduler
///
/// This library schedules re-review of things a learner got wrong or wants
/// to remember: wrong answers from quizzes and generated flashcards. Each
/// item sits in one of five boxes; a rating moves it between boxes and sets
/// its next due date. Due items are served as queues and walked through in
/// review sessions.
///
/// ### Modules
///
/// - `db`: Database connection management and write retries
/// - `models`: Review items, rating vocabularies and queue types
/// - `repo`: Repository layer for database operations
/// - `scheduler`: The pure Leitner scheduling function
/// - `session`: Review sessions and the live session registry
/// - `summary`: End-of-session statistics
/// - `handlers`: HTTP handlers
///
/// ### Web API
///
/// Every route except `/session_summaries` is scoped to a learner:
///
/// - `POST /learners/{owner_id}/review_items`: Register a source for review
/// - `GET /learners/{owner_id}/queue`: Build the due queue
/// - `POST /learners/{owner_id}/review_items/{item_id}/ratings`: Rate an item
/// - `POST /learners/{owner_id}/sessions`: Start a review session

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Request and query payloads
pub mod dto;

/// Error types
pub mod errors;

/// HTTP handlers
pub mod handlers;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Leitner scheduling
pub mod scheduler;

/// Database schema module
pub mod schema;

/// Review sessions
pub mod session;

/// Shared HTTP state
pub mod state;

/// Session statistics
pub mod summary;

#[cfg(test)]
mod test_utils;

use axum::{
    routing::{get, post, put},
    Router,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tower_http::cors::CorsLayer;
use tracing::info;

use handlers::*;
pub use state::AppState;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `state` - The database pool, session registry and queue limits shared by all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Registering and listing review items
        .route("/learners/{owner_id}/review_items", post(register_review_item_handler).get(list_review_items_handler))
        .route("/learners/{owner_id}/review_items/{item_id}", get(get_review_item_handler))
        .route("/learners/{owner_id}/review_items/{item_id}/ratings", post(rate_review_item_handler))
        .route("/learners/{owner_id}/review_items/{item_id}/legacy_ratings", post(rate_review_item_legacy_handler))
        .route("/learners/{owner_id}/review_items/{item_id}/status", put(update_review_item_status_handler))
        .route("/learners/{owner_id}/review_items/{item_id}/next_reviews", get(get_next_reviews_handler))
        // Queues and dashboard counts
        .route("/learners/{owner_id}/queue", get(get_queue_handler))
        .route("/learners/{owner_id}/summary_counts", get(get_summary_counts_handler))
        // Sessions
        .route("/learners/{owner_id}/sessions", post(start_session_handler))
        .route(
            "/learners/{owner_id}/sessions/{session_id}",
            get(get_session_handler).delete(abandon_session_handler),
        )
        .route("/learners/{owner_id}/sessions/{session_id}/ratings", post(rate_session_item_handler))
        .route("/session_summaries", post(summarize_session_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the embedded migrations
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Errors
///
/// Returns an error if any pending migration fails to apply
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    info!("Applied {} pending migrations", applied.len());

    Ok(())
}
