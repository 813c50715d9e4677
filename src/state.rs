//! Shared application state for the HTTP surface

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::db::DbPool;
use crate::session::SessionRegistry;

/// Default and maximum queue lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl QueueLimits {
    /// Picks the queue length for a request
    ///
    /// Uses the default when none is requested and never exceeds the maximum.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

impl Default for QueueLimits {
    fn default() -> Self {
        Self { default_limit: 20, max_limit: 100 }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub sessions: Arc<SessionRegistry>,
    pub queue_limits: QueueLimits,
}

impl AppState {
    /// Creates state with default limits and a one-hour session TTL
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self {
            pool,
            sessions: Arc::new(SessionRegistry::new(chrono::Duration::hours(1))),
            queue_limits: QueueLimits::default(),
        }
    }

    /// Creates state using the limits and session TTL from the configuration
    pub fn from_config(pool: Arc<DbPool>, config: &Config) -> Self {
        Self {
            pool,
            sessions: Arc::new(SessionRegistry::new(config.session_ttl())),
            queue_limits: QueueLimits {
                default_limit: config.default_queue_limit,
                max_limit: config.max_queue_limit,
            },
        }
    }
}

impl FromRef<AppState> for Arc<DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<SessionRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for QueueLimits {
    fn from_ref(state: &AppState) -> Self {
        state.queue_limits
    }
}
