//! SQLite connection handling for the analysis database.
//!
//! Connections are created on demand; SQLite connections are cheap and the
//! service runs one sequential unit of work per analysis request.

use std::path::Path;

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::AsyncConnection;

/// Diesel error type alias.
pub type DbError = diesel::result::Error;

/// Async SQLite connection type.
pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

/// SQLite connection pool (lightweight - creates connections on demand).
#[derive(Clone)]
pub struct SqlitePool {
    database_url: String,
}

impl SqlitePool {
    /// Create a new SQLite pool.
    pub fn new(database_url: &str) -> Self {
        // Strip sqlite: prefix if present
        let url = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        Self {
            database_url: url.to_string(),
        }
    }

    /// Create a pool from a file path.
    pub fn from_path(path: &Path) -> Self {
        Self::new(&path.display().to_string())
    }

    /// Get a connection.
    pub async fn get(&self) -> Result<SqliteConn, DbError> {
        SqliteConn::establish(&self.database_url)
            .await
            .map_err(connection_error)
    }

    /// Get the database URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

fn connection_error(e: diesel::ConnectionError) -> DbError {
    DbError::DatabaseError(
        diesel::result::DatabaseErrorKind::Unknown,
        Box::new(e.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_stripping() {
        assert_eq!(
            SqlitePool::new("sqlite:/path/to/db").database_url(),
            "/path/to/db"
        );
        assert_eq!(
            SqlitePool::new("/path/to/db.sqlite").database_url(),
            "/path/to/db.sqlite"
        );
    }
}
