//! Analysis result models.
//!
//! Analysis results are keyed by the analyzed file's identifier and carry
//! the SHA-256 fingerprint of the content they describe, enabling
//! content-addressed deduplication across files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Processing status of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Outcome of the duplicate check for one file.
///
/// A duplicate means another file id completed analysis with the same
/// content fingerprint. Exact hash equality makes false positives
/// impossible; missed matches are acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateInfo {
    pub is_duplicate: bool,
    pub matched_file_id: Option<String>,
    pub matched_hash: Option<String>,
}

impl DuplicateInfo {
    /// No duplicate found (also the degraded outcome on storage errors).
    pub fn none() -> Self {
        Self::default()
    }

    /// A previously completed analysis with the same fingerprint.
    pub fn matched(file_id: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            is_duplicate: true,
            matched_file_id: Some(file_id.into()),
            matched_hash: Some(hash.into()),
        }
    }
}

/// Word, character, and paragraph counts for a text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStatistics {
    pub word_count: u32,
    pub char_count: u32,
    pub paragraph_count: u32,
}

/// The durable record of pipeline progress and outcome for one file.
///
/// Exactly one record exists per file id; re-analysis with new content
/// mutates the record in place rather than inserting a new row.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    /// Unique identifier, assigned once at creation.
    pub id: String,
    /// Identifier of the analyzed file.
    pub file_id: String,
    /// SHA-256 fingerprint of the most recently analyzed content.
    pub file_hash: String,
    /// Current pipeline status.
    pub status: AnalysisStatus,
    pub paragraph_count: u32,
    pub word_count: u32,
    pub char_count: u32,
    /// Result of the duplicate check, present once that stage has run.
    pub duplicate_info: Option<DuplicateInfo>,
    /// Locator returned by the image store; unset if the word-cloud stage
    /// has not run or failed.
    pub word_cloud_image_path: Option<String>,
    /// Set only on transition into Completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Set only on transition into Failed.
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Compute the SHA-256 content fingerprint, hex-encoded.
    pub fn compute_hash(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    /// Create a record for a first analysis, already marked in progress.
    ///
    /// Creation and the Pending → InProgress transition happen together;
    /// a Pending record is never persisted on its own.
    pub fn new(file_id: impl Into<String>, file_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_id: file_id.into(),
            file_hash: file_hash.into(),
            status: AnalysisStatus::InProgress,
            paragraph_count: 0,
            word_count: 0,
            char_count: 0,
            duplicate_info: None,
            word_cloud_image_path: None,
            completed_at: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-enter InProgress for new content.
    ///
    /// Clears the previous error and overwrites the fingerprint; stale
    /// result fields are overwritten as each stage commits, not here.
    pub fn begin_reanalysis(&mut self, file_hash: impl Into<String>) {
        self.status = AnalysisStatus::InProgress;
        self.error_message = None;
        self.file_hash = file_hash.into();
        self.updated_at = Utc::now();
    }

    /// Record the counts produced by the statistics stage.
    pub fn apply_statistics(&mut self, stats: &TextStatistics) {
        self.paragraph_count = stats.paragraph_count;
        self.word_count = stats.word_count;
        self.char_count = stats.char_count;
        self.updated_at = Utc::now();
    }

    /// Record the duplicate-check outcome.
    pub fn set_duplicate_info(&mut self, info: DuplicateInfo) {
        self.duplicate_info = Some(info);
        self.updated_at = Utc::now();
    }

    /// Record the stored word-cloud image locator.
    pub fn set_word_cloud_image(&mut self, locator: impl Into<String>) {
        self.word_cloud_image_path = Some(locator.into());
        self.updated_at = Utc::now();
    }

    /// Transition into the Completed terminal state.
    pub fn mark_completed(&mut self) {
        let now = Utc::now();
        self.status = AnalysisStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Transition into the Failed terminal state with a cause.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = AnalysisStatus::Failed;
        self.error_message = Some(message.into());
        self.updated_at = Utc::now();
    }
}
