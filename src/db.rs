use std::time::Duration;

use anyhow::Result;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError, QueryResult};
use diesel::sqlite::SqliteConnection;
use tracing::{debug, warn};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// How many times a write is retried when SQLite reports the database as locked
const MAX_RETRIES: u32 = 5;

/// Base delay between retries, doubled on every attempt
const RETRY_BASE_DELAY: Duration = Duration::from_millis(20);

/// Per-connection SQLite settings applied whenever the pool hands out a connection
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    /// How long SQLite waits on a held lock before giving up with SQLITE_BUSY
    pub busy_timeout: Duration,
    /// Whether to switch the database to write-ahead logging
    pub enable_wal: bool,
}

impl ConnectionOptions {
    /// Picks options suitable for the given database URL
    ///
    /// In-memory databases can't use WAL, so it is only enabled for file databases.
    pub fn for_url(database_url: &str) -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            enable_wal: !is_memory_url(database_url),
        }
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        let mut pragmas = format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        );
        if self.enable_wal {
            pragmas.push_str(" PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
        }
        conn.batch_execute(&pragmas)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Returns true if the URL points at an in-memory SQLite database
pub fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Builds the connection pool for the given database URL
///
/// ### Arguments
///
/// * `database_url` - A SQLite path or `file:` URI
///
/// ### Returns
///
/// A Result containing the pool if the first connection could be established
pub fn init_pool(database_url: &str) -> Result<DbPool> {
    debug!("Initialising connection pool for {}", database_url);

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions::for_url(database_url)))
        .build(manager)?;

    Ok(pool)
}

/// Returns true if the error means another connection is holding a lock
pub fn is_locked_error(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, info) => {
            let message = info.message();
            message.contains("database is locked") || message.contains("database table is locked")
        }
        _ => false,
    }
}

/// Returns true if the error is a unique constraint violation
pub fn is_unique_violation(err: &DieselError) -> bool {
    matches!(err, DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
}

/// Runs a database operation, retrying with exponential backoff while the database is locked
///
/// `busy_timeout` already makes SQLite wait for most locks, but shared-cache
/// connections and lock upgrades can still fail immediately, so writes go through here.
///
/// ### Arguments
///
/// * `conn` - The connection to run the operation on
/// * `op` - The operation; it may be invoked more than once
///
/// ### Returns
///
/// The result of the first attempt that did not fail on a lock
pub async fn execute_with_retry<T, F>(conn: &mut SqliteConnection, mut op: F) -> QueryResult<T>
where
    F: FnMut(&mut SqliteConnection) -> QueryResult<T>,
{
    let mut attempt = 0;
    loop {
        match op(conn) {
            Err(err) if is_locked_error(&err) && attempt < MAX_RETRIES => {
                attempt += 1;
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
                warn!("Database locked, retrying in {:?} (attempt {}/{})", delay, attempt, MAX_RETRIES);
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}
