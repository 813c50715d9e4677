//! End-of-session statistics

use serde::{Deserialize, Serialize};

use crate::models::{Rating, SessionRating};

/// Per-rating tallies for a finished session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub know: usize,
    pub confused: usize,
    pub forgot: usize,
    pub again: usize,
    pub total: usize,
    /// Items that come back sooner than a `know` would have sent them
    pub rollover_count: usize,
}

impl SessionSummary {
    /// Gets the count for one rating
    pub fn count(&self, rating: Rating) -> usize {
        match rating {
            Rating::Know => self.know,
            Rating::Confused => self.confused,
            Rating::Forgot => self.forgot,
            Rating::Again => self.again,
        }
    }
}

/// Tallies the ratings of a session
///
/// Read-only: this never touches the store.
///
/// ### Arguments
///
/// * `ratings` - The `{item_id, rating}` pairs in the order they were applied
///
/// ### Returns
///
/// Counts per rating, the total, and `rollover_count = total - know`
pub fn summarize_session(ratings: &[SessionRating]) -> SessionSummary {
    let mut summary = ratings.iter().fold(SessionSummary::default(), |mut acc, r| {
        match r.rating {
            Rating::Know => acc.know += 1,
            Rating::Confused => acc.confused += 1,
            Rating::Forgot => acc.forgot += 1,
            Rating::Again => acc.again += 1,
        }
        acc
    });

    summary.total = ratings.len();
    summary.rollover_count = summary.total - summary.know;
    summary
}
