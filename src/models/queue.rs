use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ReviewError;

/// Which due items a queue should contain
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueueFilter {
    /// Everything due on or before the as-of date
    #[default]
    All,
    /// Due strictly before the as-of date
    Overdue,
    /// Due exactly on the as-of date
    Today,
    /// Like `All`, restricted to one course
    Course(String),
}

impl fmt::Display for QueueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueFilter::All => f.write_str("all"),
            QueueFilter::Overdue => f.write_str("overdue"),
            QueueFilter::Today => f.write_str("today"),
            QueueFilter::Course(course_id) => f.write_str(course_id),
        }
    }
}

impl FromStr for QueueFilter {
    type Err = ReviewError;

    /// Parses a named filter, ignoring case; any other non-empty string is taken as a course ID
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            Err(ReviewError::InvalidFilter("filter must not be empty".to_string()))
        } else if s.eq_ignore_ascii_case("all") {
            Ok(QueueFilter::All)
        } else if s.eq_ignore_ascii_case("overdue") {
            Ok(QueueFilter::Overdue)
        } else if s.eq_ignore_ascii_case("today") {
            Ok(QueueFilter::Today)
        } else {
            Ok(QueueFilter::Course(s.to_string()))
        }
    }
}

/// Due-state counts for the dashboard widget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummaryCounts {
    pub overdue_count: i64,
    pub today_count: i64,
    pub upcoming_count: i64,
    pub total_active: i64,
}
