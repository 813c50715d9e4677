use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ItemStatus, SourceType};
use crate::scheduler::{self, Advance};

/// A schedulable wrapper around a wrong answer or a flashcard
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::review_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReviewItem {
    /// Unique identifier for the item (UUID v4 as string)
    id: String,

    /// The learner who owns this item
    owner_id: String,

    /// The course this item belongs to, if any
    course_id: Option<String>,

    /// What kind of fact this item re-tests
    source_type: SourceType,

    /// The ID of the wrong-answer note or flashcard
    source_id: String,

    /// Leitner box, always between 1 and 5
    #[serde(rename = "box")]
    box_number: i32,

    /// The date on or after which the item is due
    next_review_at: NaiveDate,

    /// When the item was last rated
    last_reviewed_at: Option<NaiveDateTime>,

    status: ItemStatus,

    created_at: NaiveDateTime,
}

impl ReviewItem {
    /// Creates a fresh item in box 1, due on the day it is created
    ///
    /// ### Arguments
    ///
    /// * `owner_id` - The learner who owns the item
    /// * `course_id` - The course to file the item under, if any
    /// * `source_type` - Whether the item re-tests a wrong answer or a flashcard
    /// * `source_id` - The ID of the source fact
    /// * `now` - The creation time
    pub fn new(
        owner_id: String,
        course_id: Option<String>,
        source_type: SourceType,
        source_id: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            course_id,
            source_type,
            source_id,
            box_number: scheduler::MIN_BOX,
            next_review_at: now.date_naive(),
            last_reviewed_at: None,
            status: ItemStatus::Active,
            created_at: now.naive_utc(),
        }
    }

    /// Creates an item with all fields specified
    ///
    /// The box is clamped into range so a hand-built item can't break the box invariant.
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_fields(
        id: String,
        owner_id: String,
        course_id: Option<String>,
        source_type: SourceType,
        source_id: String,
        box_number: i32,
        next_review_at: NaiveDate,
        last_reviewed_at: Option<DateTime<Utc>>,
        status: ItemStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            course_id,
            source_type,
            source_id,
            box_number: scheduler::clamp_box(box_number),
            next_review_at,
            last_reviewed_at: last_reviewed_at.map(|dt| dt.naive_utc()),
            status,
            created_at: created_at.naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_owner_id(&self) -> String {
        self.owner_id.clone()
    }

    pub fn get_course_id(&self) -> Option<String> {
        self.course_id.clone()
    }

    pub fn get_source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn get_source_id(&self) -> String {
        self.source_id.clone()
    }

    /// Gets the item's Leitner box
    pub fn get_box(&self) -> i32 {
        self.box_number
    }

    pub fn get_next_review_at(&self) -> NaiveDate {
        self.next_review_at
    }

    /// Gets when the item was last rated, or None if it never was
    pub fn get_last_reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.last_reviewed_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
    }

    pub fn get_last_reviewed_at_raw(&self) -> Option<NaiveDateTime> {
        self.last_reviewed_at
    }

    pub fn get_status(&self) -> ItemStatus {
        self.status
    }

    pub fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }

    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Applies a scheduler step and stamps the review time
    ///
    /// The due date never lands before the day the item was created.
    ///
    /// ### Arguments
    ///
    /// * `step` - The scheduler outcome to apply
    /// * `reviewed_at` - When the rating happened
    pub fn apply_advance(&mut self, step: Advance, reviewed_at: DateTime<Utc>) {
        self.box_number = scheduler::clamp_box(step.new_box);
        self.next_review_at = step.next_review_at.max(self.created_at.date());
        self.last_reviewed_at = Some(reviewed_at.naive_utc());
    }
}
