//! Persistence layer for analysis results.
//!
//! Uses Diesel with the async SyncConnectionWrapper over SQLite; records
//! are converted at the boundary between the diesel row structs and the
//! domain models in [`crate::models`].

mod analysis;
mod migrations;
mod models;
pub mod pool;

pub use analysis::AnalysisRepository;
pub use migrations::run_migrations;
pub use pool::{DbError, SqliteConn, SqlitePool};
