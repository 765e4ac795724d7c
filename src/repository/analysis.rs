//! Analysis result repository operations.

use std::path::Path;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{AnalysisResultRecord, NewAnalysisResult};
use super::pool::{DbError, SqlitePool};
use crate::models::{AnalysisRecord, AnalysisStatus};
use crate::schema::analysis_results;

/// Repository for analysis result records.
///
/// One record per file id; `save` replaces the whole row, which is the
/// write model the orchestrator relies on for per-stage commits.
#[derive(Clone)]
pub struct AnalysisRepository {
    pool: SqlitePool,
}

impl AnalysisRepository {
    /// Create a repository for a database file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: SqlitePool::from_path(db_path),
        }
    }

    /// Get the record for a file id.
    pub async fn get(&self, file_id: &str) -> Result<Option<AnalysisRecord>, DbError> {
        let mut conn = self.pool.get().await?;
        let record: Option<AnalysisResultRecord> = analysis_results::table
            .filter(analysis_results::file_id.eq(file_id))
            .first(&mut conn)
            .await
            .optional()?;
        Ok(record.map(Into::into))
    }

    /// Find any completed analysis of a *different* file with the same
    /// content fingerprint.
    ///
    /// When several historical matches exist the first found is returned;
    /// all matches share the fingerprint so the selection is not
    /// load-bearing.
    pub async fn find_completed_by_hash_excluding(
        &self,
        file_hash: &str,
        file_id: &str,
    ) -> Result<Option<AnalysisRecord>, DbError> {
        let mut conn = self.pool.get().await?;
        let record: Option<AnalysisResultRecord> = analysis_results::table
            .filter(analysis_results::file_hash.eq(file_hash))
            .filter(analysis_results::file_id.ne(file_id))
            .filter(analysis_results::status.eq(AnalysisStatus::Completed.as_str()))
            .first(&mut conn)
            .await
            .optional()?;
        Ok(record.map(Into::into))
    }

    /// Insert or replace the record for a file id.
    pub async fn save(&self, record: &AnalysisRecord) -> Result<(), DbError> {
        let duplicate_info = record
            .duplicate_info
            .as_ref()
            .map(|info| serde_json::to_string(info).unwrap_or_default());
        let completed_at = record.completed_at.map(|t| t.to_rfc3339());
        let created_at = record.created_at.to_rfc3339();
        let updated_at = record.updated_at.to_rfc3339();

        let mut conn = self.pool.get().await?;
        diesel::replace_into(analysis_results::table)
            .values(NewAnalysisResult {
                id: &record.id,
                file_id: &record.file_id,
                file_hash: &record.file_hash,
                status: record.status.as_str(),
                paragraph_count: record.paragraph_count as i32,
                word_count: record.word_count as i32,
                char_count: record.char_count as i32,
                duplicate_info: duplicate_info.as_deref(),
                word_cloud_image_path: record.word_cloud_image_path.as_deref(),
                completed_at: completed_at.as_deref(),
                error_message: record.error_message.as_deref(),
                created_at: &created_at,
                updated_at: &updated_at,
            })
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
