/// Repository module
///
/// This module provides the data access layer for the review subsystem.
/// Every function takes the owning learner explicitly and never reads or
/// writes another learner's rows.
///
/// - `review_item_repo`: the review item store, ingestion, and rating writes
/// - `queue_repo`: due-item queues and dashboard counts

mod review_item_repo;
mod queue_repo;

// Re-export all repository functions
pub use review_item_repo::*;
pub use queue_repo::*;
