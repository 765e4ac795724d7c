//! Database migrations using diesel_migrations.
//!
//! Embeds migrations at compile time and runs them via blocking tasks
//! to work with async connections.

use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

use super::pool::DbError;

// Embed SQLite migrations (uses diesel_migrations harness)
pub const SQLITE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/sqlite");

/// Run pending migrations for a database URL.
///
/// Creates a sync connection and runs migrations in a blocking task.
pub async fn run_migrations(database_url: &str) -> Result<(), DbError> {
    // Strip sqlite: prefix if present - diesel expects just the file path
    let url = database_url
        .strip_prefix("sqlite:")
        .unwrap_or(database_url)
        .to_string();

    tokio::task::spawn_blocking(move || {
        let mut conn = diesel::SqliteConnection::establish(&url).map_err(|e| {
            DbError::DatabaseError(
                diesel::result::DatabaseErrorKind::Unknown,
                Box::new(e.to_string()),
            )
        })?;

        let migrations = conn
            .run_pending_migrations(SQLITE_MIGRATIONS)
            .map_err(DbError::QueryBuilderError)?;

        for migration in &migrations {
            info!("Applied migration: {}", migration);
        }

        if migrations.is_empty() {
            info!("No pending migrations");
        }

        Ok(())
    })
    .await
    .map_err(|e| DbError::QueryBuilderError(Box::new(e)))?
}
