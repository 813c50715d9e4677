use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ReviewError;
use crate::models::{ItemStatus, QueueFilter, Rating, SessionRating, SourceType};

/// Data transfer object for registering a source fact for review
///
/// This struct is used to deserialize JSON requests from the ingestion paths
/// (quiz grading and flashcard generation).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterReviewItemDto {
    /// The course to file the item under
    #[serde(default)]
    pub course_id: Option<String>,

    /// Either "wrong_note" or "flashcard"
    pub source_type: String,

    /// The ID of the wrong-answer note or flashcard
    pub source_id: String,
}

impl RegisterReviewItemDto {
    /// Parses the source type
    ///
    /// ### Errors
    ///
    /// Returns `ReviewError::InvalidSourceType` for anything other than the two known sources
    pub fn parse_source_type(&self) -> Result<SourceType, ReviewError> {
        self.source_type.parse()
    }
}

/// Data transfer object for rating an item
///
/// The rating is kept as text so that unknown values can be reported as
/// a rating error rather than a generic body rejection.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RateItemDto {
    /// The rating given during the review
    pub rating: String,
}

/// Data transfer object for suspending or resuming an item
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateStatusDto {
    /// Either "active" or "suspended"
    pub status: String,
}

/// Query parameters for building a queue, and the body for starting a session
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct QueueQueryDto {
    /// "all", "overdue", "today", or a course ID
    pub filter: Option<String>,

    /// The date "due" is measured against; today (UTC) if not given
    pub as_of: Option<NaiveDate>,

    /// The maximum number of items to return
    pub limit: Option<usize>,
}

impl QueueQueryDto {
    /// Parses the filter, defaulting to `QueueFilter::All`
    ///
    /// ### Errors
    ///
    /// Returns `ReviewError::InvalidFilter` if the filter is present but blank
    pub fn parse_filter(&self) -> Result<QueueFilter, ReviewError> {
        match &self.filter {
            Some(filter) => filter.parse(),
            None => Ok(QueueFilter::All),
        }
    }
}

impl fmt::Display for QueueQueryDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueueQueryDto {{ filter: {:?}, as_of: {:?}, limit: {:?} }}", self.filter, self.as_of, self.limit)
    }
}

/// Query parameters for endpoints that only need an as-of date
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AsOfQueryDto {
    /// The date "due" is measured against; today (UTC) if not given
    pub as_of: Option<NaiveDate>,
}

/// Query parameters for listing review items
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ListReviewItemsQueryDto {
    /// Only list items with this status
    pub status: Option<String>,
}

impl ListReviewItemsQueryDto {
    pub fn parse_status(&self) -> Result<Option<ItemStatus>, ReviewError> {
        self.status.as_deref().map(str::parse::<ItemStatus>).transpose()
    }
}

/// One rating in a posted session
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionRatingDto {
    pub item_id: String,
    pub rating: String,
}

/// Data transfer object for summarizing a finished session
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SummarizeSessionDto {
    /// The ratings in the order they were applied
    pub ratings: Vec<SessionRatingDto>,
}

impl SummarizeSessionDto {
    /// Parses every rating, failing on the first unknown one
    ///
    /// ### Errors
    ///
    /// Returns `ReviewError::InvalidRating` naming the offending value
    pub fn parse_ratings(&self) -> Result<Vec<SessionRating>, ReviewError> {
        self.ratings
            .iter()
            .map(|r| r.rating.parse::<Rating>().map(|rating| SessionRating::new(r.item_id.clone(), rating)))
            .collect()
    }
}
