/// Data models module
///
/// This module defines the core data structures of the review subsystem:
/// the persisted review item, the rating vocabularies, and the queue types.

// Re-export all model types
mod item_enums;
pub use item_enums::{ItemStatus, SourceType};

mod review_item;
pub use review_item::ReviewItem;

mod rating;
pub use rating::{LegacyRating, Rating, SessionRating};

mod queue;
pub use queue::{QueueFilter, ReviewSummaryCounts};
