//! Diesel ORM models for the analysis_results table.
//!
//! These models provide compile-time type checking for database operations
//! and convert to the domain models in [`crate::models`].

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::models::{AnalysisRecord, AnalysisStatus};
use crate::schema;

/// Analysis result record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::analysis_results)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnalysisResultRecord {
    pub id: String,
    pub file_id: String,
    pub file_hash: String,
    pub status: String,
    pub paragraph_count: i32,
    pub word_count: i32,
    pub char_count: i32,
    pub duplicate_info: Option<String>,
    pub word_cloud_image_path: Option<String>,
    pub completed_at: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// New analysis result for insertion or replacement.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::analysis_results)]
pub struct NewAnalysisResult<'a> {
    pub id: &'a str,
    pub file_id: &'a str,
    pub file_hash: &'a str,
    pub status: &'a str,
    pub paragraph_count: i32,
    pub word_count: i32,
    pub char_count: i32,
    pub duplicate_info: Option<&'a str>,
    pub word_cloud_image_path: Option<&'a str>,
    pub completed_at: Option<&'a str>,
    pub error_message: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<AnalysisResultRecord> for AnalysisRecord {
    fn from(r: AnalysisResultRecord) -> Self {
        Self {
            id: r.id,
            file_id: r.file_id,
            file_hash: r.file_hash,
            status: AnalysisStatus::from_str(&r.status).unwrap_or(AnalysisStatus::Pending),
            paragraph_count: r.paragraph_count.max(0) as u32,
            word_count: r.word_count.max(0) as u32,
            char_count: r.char_count.max(0) as u32,
            duplicate_info: r.duplicate_info.and_then(|s| serde_json::from_str(&s).ok()),
            word_cloud_image_path: r.word_cloud_image_path,
            completed_at: r
                .completed_at
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|d| d.with_timezone(&Utc)),
            error_message: r.error_message,
            created_at: parse_timestamp(&r.created_at),
            updated_at: parse_timestamp(&r.updated_at),
        }
    }
}
