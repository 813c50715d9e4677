use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ReviewError;

/// Self-reported recall quality used by review sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// Fully recalled; the item moves up a box
    Know,
    /// Partially recalled; box kept, re-tested in three days
    Confused,
    /// Not recalled; back to box 1
    Forgot,
    /// Show again tomorrow without touching the box
    Again,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Know, Rating::Confused, Rating::Forgot, Rating::Again];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Know => "know",
            Rating::Confused => "confused",
            Rating::Forgot => "forgot",
            Rating::Again => "again",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "know" => Ok(Rating::Know),
            "confused" => Ok(Rating::Confused),
            "forgot" => Ok(Rating::Forgot),
            "again" => Ok(Rating::Again),
            _ => Err(ReviewError::InvalidRating(format!(
                "Rating must be one of know, confused, forgot, again; got '{}'",
                s
            ))),
        }
    }
}

/// The three-outcome vocabulary used by the dashboard quick-review path
///
/// Kept apart from [`Rating`]: the two vocabularies schedule differently and
/// neither parses the other's extra words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyRating {
    Know,
    Unsure,
    Forgot,
}

impl LegacyRating {
    pub const ALL: [LegacyRating; 3] = [LegacyRating::Know, LegacyRating::Unsure, LegacyRating::Forgot];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyRating::Know => "know",
            LegacyRating::Unsure => "unsure",
            LegacyRating::Forgot => "forgot",
        }
    }
}

impl fmt::Display for LegacyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegacyRating {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "know" => Ok(LegacyRating::Know),
            "unsure" => Ok(LegacyRating::Unsure),
            "forgot" => Ok(LegacyRating::Forgot),
            _ => Err(ReviewError::InvalidRating(format!(
                "Rating must be one of know, unsure, forgot; got '{}'",
                s
            ))),
        }
    }
}

/// One rating applied during a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRating {
    pub item_id: String,
    pub rating: Rating,
}

impl SessionRating {
    pub fn new(item_id: impl Into<String>, rating: Rating) -> Self {
        Self { item_id: item_id.into(), rating }
    }
}
