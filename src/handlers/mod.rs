/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler extracts the owning learner from the path, calls the
/// appropriate repository or session function, and returns JSON.

use chrono::{NaiveDate, Utc};

mod review_item_handlers;
mod queue_handlers;
mod session_handlers;

// Re-export all handlers
pub use review_item_handlers::*;
pub use queue_handlers::*;
pub use session_handlers::*;

/// The date "due" is measured against: the requested one, else today in UTC
pub(crate) fn as_of_or_today(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Utc::now().date_naive())
}
