//! Review sessions
//!
//! A session walks once through a snapshot of the due queue. The learner sees
//! the current item, rates it, and the session moves on; when the snapshot is
//! exhausted the session is complete and yields its summary.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{instrument, debug, info};

use crate::db::DbPool;
use crate::errors::ReviewError;
use crate::models::{QueueFilter, Rating, ReviewItem, SessionRating};
use crate::repo;
use crate::summary::{SessionSummary, summarize_session};

/// Where a session is in its queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    InProgress { index: usize },
    Complete,
}

/// One pass through a snapshot of a learner's due items
#[derive(Debug, Clone)]
pub struct ReviewSession {
    id: String,
    owner_id: String,
    filter: QueueFilter,
    as_of: NaiveDate,
    queue: Vec<ReviewItem>,
    state: SessionState,
    ratings: Vec<SessionRating>,
}

/// A serializable snapshot of a session, as returned by the HTTP surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: String,
    pub owner_id: String,
    pub filter: String,
    pub as_of: NaiveDate,
    #[serde(flatten)]
    pub state: SessionState,
    pub total: usize,
    pub remaining: usize,
    pub current_item: Option<ReviewItem>,
    pub ratings: Vec<SessionRating>,
    pub summary: Option<SessionSummary>,
}

impl ReviewSession {
    /// Creates a session over an already-built queue
    ///
    /// An empty queue gives a session that is complete from the start.
    pub fn new(owner_id: String, filter: QueueFilter, as_of: NaiveDate, queue: Vec<ReviewItem>) -> Self {
        let state = if queue.is_empty() {
            SessionState::Complete
        } else {
            SessionState::InProgress { index: 0 }
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            filter,
            as_of,
            queue,
            state,
            ratings: Vec::new(),
        }
    }

    /// Starts a session by loading the learner's queue once
    ///
    /// Items registered or rated elsewhere after this call do not change the
    /// session's queue.
    ///
    /// ### Arguments
    ///
    /// * `pool` - A reference to the database connection pool
    /// * `owner_id` - The learner running the session
    /// * `filter` - Which due items to include
    /// * `as_of` - The date "due" is measured against
    /// * `limit` - The maximum number of items in the session
    ///
    /// ### Returns
    ///
    /// A Result containing the new session
    #[instrument(skip(pool), fields(owner_id = %owner_id, filter = %filter, as_of = %as_of))]
    pub async fn start(
        pool: &DbPool,
        owner_id: &str,
        filter: QueueFilter,
        as_of: NaiveDate,
        limit: usize,
    ) -> anyhow::Result<Self> {
        let queue = repo::build_queue(pool, owner_id, &filter, as_of, limit)?;
        let session = Self::new(owner_id.to_string(), filter, as_of, queue);

        info!("Started session {} with {} items", session.id, session.queue.len());

        Ok(session)
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_owner_id(&self) -> String {
        self.owner_id.clone()
    }

    pub fn get_state(&self) -> SessionState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    pub fn get_ratings(&self) -> &[SessionRating] {
        &self.ratings
    }

    /// Number of items not yet rated
    pub fn remaining(&self) -> usize {
        match self.state {
            SessionState::InProgress { index } => self.queue.len() - index,
            SessionState::Complete => 0,
        }
    }

    /// The item to reveal next, or None once the session is complete
    pub fn current_item(&self) -> Option<&ReviewItem> {
        match self.state {
            SessionState::InProgress { index } => self.queue.get(index),
            SessionState::Complete => None,
        }
    }

    /// Rates the current item and moves to the next one
    ///
    /// If the rating can't be stored the session does not move, so the same
    /// item stays current and can be rated again.
    ///
    /// ### Arguments
    ///
    /// * `pool` - A reference to the database connection pool
    /// * `rating` - The learner's rating for the current item
    /// * `now` - When the rating happened
    ///
    /// ### Returns
    ///
    /// A Result containing the rated item with its new schedule
    ///
    /// ### Errors
    ///
    /// Returns an error if:
    /// - The session is already complete (`ReviewError::SessionComplete`)
    /// - The item can no longer be found for this learner (`ReviewError::NotFound`)
    /// - The rating can't be written to the store
    #[instrument(skip(self, pool), fields(session_id = %self.id, owner_id = %self.owner_id, rating = %rating))]
    pub async fn rate_current(
        &mut self,
        pool: &DbPool,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ReviewItem> {
        let SessionState::InProgress { index } = self.state else {
            return Err(ReviewError::SessionComplete.into());
        };
        let item_id = match self.queue.get(index) {
            Some(item) => item.get_id(),
            None => return Err(ReviewError::SessionComplete.into()),
        };

        let rated = repo::rate_item(pool, &self.owner_id, &item_id, rating, now).await?;

        self.ratings.push(SessionRating::new(item_id, rating));
        let next = index + 1;
        self.state = if next >= self.queue.len() {
            info!("Session {} complete after {} ratings", self.id, self.ratings.len());
            SessionState::Complete
        } else {
            debug!("Advancing session to item {} of {}", next + 1, self.queue.len());
            SessionState::InProgress { index: next }
        };

        Ok(rated)
    }

    /// The session's summary, available once it is complete
    pub fn summary(&self) -> Option<SessionSummary> {
        self.is_complete().then(|| summarize_session(&self.ratings))
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            filter: self.filter.to_string(),
            as_of: self.as_of,
            state: self.state,
            total: self.queue.len(),
            remaining: self.remaining(),
            current_item: self.current_item().cloned(),
            ratings: self.ratings.clone(),
            summary: self.summary(),
        }
    }
}

struct SessionEntry {
    owner_id: String,
    session: Arc<Mutex<ReviewSession>>,
    last_touched: DateTime<Utc>,
}

/// Live sessions for the HTTP surface, keyed by session ID
///
/// Sessions that go untouched for longer than the TTL are dropped the next
/// time the registry is used, which is the same as the learner abandoning them.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn prune(&self, sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.last_touched <= self.ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!("Pruned {} expired sessions", pruned);
        }
    }

    /// Stores a session and returns its ID
    pub async fn insert(&self, session: ReviewSession, now: DateTime<Utc>) -> String {
        let mut sessions = self.sessions.lock().await;
        self.prune(&mut sessions, now);

        let id = session.get_id();
        sessions.insert(id.clone(), SessionEntry {
            owner_id: session.get_owner_id(),
            session: Arc::new(Mutex::new(session)),
            last_touched: now,
        });

        id
    }

    /// Looks up a live session belonging to `owner_id`
    ///
    /// ### Errors
    ///
    /// Returns `ReviewError::NotFound` if the session doesn't exist, has
    /// expired, or belongs to another learner
    pub async fn get(
        &self,
        owner_id: &str,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Arc<Mutex<ReviewSession>>, ReviewError> {
        let mut sessions = self.sessions.lock().await;
        self.prune(&mut sessions, now);

        match sessions.get_mut(session_id) {
            Some(entry) if entry.owner_id == owner_id => {
                entry.last_touched = now;
                Ok(entry.session.clone())
            },
            _ => Err(ReviewError::NotFound),
        }
    }

    /// Drops a session belonging to `owner_id`
    ///
    /// ### Errors
    ///
    /// Returns `ReviewError::NotFound` if there is no such session for the learner
    pub async fn remove(&self, owner_id: &str, session_id: &str) -> Result<(), ReviewError> {
        let mut sessions = self.sessions.lock().await;

        match sessions.get(session_id) {
            Some(entry) if entry.owner_id == owner_id => {
                sessions.remove(session_id);
                info!("Abandoned session {}", session_id);
                Ok(())
            },
            _ => Err(ReviewError::NotFound),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
