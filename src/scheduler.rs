//! Leitner scheduling
//!
//! Pure functions mapping `(current box, rating, today)` to the item's next
//! box and due date. Nothing here touches the database or the clock, so
//! every transition can be table-tested.
//!
//! | box | interval |
//! |-----|----------|
//! | 1   | 1 day    |
//! | 2   | 3 days   |
//! | 3   | 7 days   |
//! | 4   | 14 days  |
//! | 5   | 30 days  |

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{LegacyRating, Rating};

pub const MIN_BOX: i32 = 1;
pub const MAX_BOX: i32 = 5;

/// The outcome of one scheduling step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    pub new_box: i32,
    pub next_review_at: NaiveDate,
}

/// What a rating would do to an item, for showing on rating buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingPreview {
    pub rating: Rating,
    #[serde(flatten)]
    pub outcome: Advance,
}

/// Clamps a box number into `[MIN_BOX, MAX_BOX]`
pub fn clamp_box(box_number: i32) -> i32 {
    box_number.clamp(MIN_BOX, MAX_BOX)
}

/// Returns the re-test interval in days for a box
pub fn interval_days(box_number: i32) -> u64 {
    match clamp_box(box_number) {
        1 => 1,
        2 => 3,
        3 => 7,
        4 => 14,
        _ => 30,
    }
}

/// `today` plus the interval of `box_number`, saturating at the last representable date
fn due_after(today: NaiveDate, box_number: i32) -> NaiveDate {
    today
        .checked_add_days(Days::new(interval_days(box_number)))
        .unwrap_or(NaiveDate::MAX)
}

/// Computes the next box and due date for a session rating
///
/// ### Arguments
///
/// * `current_box` - The item's box; out-of-range values are clamped first
/// * `rating` - The learner's self-reported recall
/// * `today` - The date the rating is applied on
///
/// ### Returns
///
/// The new box and the date the item is next due
pub fn advance(current_box: i32, rating: Rating, today: NaiveDate) -> Advance {
    let current_box = clamp_box(current_box);

    match rating {
        Rating::Know => {
            let new_box = clamp_box(current_box + 1);
            Advance { new_box, next_review_at: due_after(today, new_box) }
        }
        // fixed three-day re-test, whatever the box
        Rating::Confused => Advance { new_box: current_box, next_review_at: due_after(today, 2) },
        Rating::Forgot => Advance { new_box: MIN_BOX, next_review_at: due_after(today, MIN_BOX) },
        Rating::Again => Advance { new_box: current_box, next_review_at: due_after(today, MIN_BOX) },
    }
}

/// Computes the next box and due date for the three-outcome dashboard vocabulary
///
/// Unlike [`advance`], every interval here comes from the box table: `unsure`
/// keeps the box and waits that box's interval.
pub fn advance_legacy(current_box: i32, rating: LegacyRating, today: NaiveDate) -> Advance {
    let current_box = clamp_box(current_box);

    let new_box = match rating {
        LegacyRating::Know => clamp_box(current_box + 1),
        LegacyRating::Unsure => current_box,
        LegacyRating::Forgot => MIN_BOX,
    };

    Advance { new_box, next_review_at: due_after(today, new_box) }
}

/// Lists the outcome of every session rating for an item in `current_box`
pub fn preview(current_box: i32, today: NaiveDate) -> Vec<RatingPreview> {
    Rating::ALL
        .iter()
        .map(|&rating| RatingPreview { rating, outcome: advance(current_box, rating, today) })
        .collect()
}
