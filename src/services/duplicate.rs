//! Duplicate detection by content fingerprint.

use crate::models::DuplicateInfo;
use crate::repository::AnalysisRepository;

/// Finds prior completed analyses of different files with the same
/// content fingerprint.
///
/// Detection is best-effort: a storage failure degrades to "no duplicate"
/// rather than blocking the pipeline. False positives cannot occur because
/// matching is exact hash equality.
pub struct DuplicateDetector {
    repo: AnalysisRepository,
}

impl DuplicateDetector {
    pub fn new(repo: AnalysisRepository) -> Self {
        Self { repo }
    }

    /// Check whether another file completed analysis with this fingerprint.
    pub async fn find_duplicate(&self, file_id: &str, file_hash: &str) -> DuplicateInfo {
        match self
            .repo
            .find_completed_by_hash_excluding(file_hash, file_id)
            .await
        {
            Ok(Some(existing)) => {
                tracing::info!(
                    "duplicate detected: file {} matches hash of previously analyzed file {}",
                    file_id,
                    existing.file_id
                );
                DuplicateInfo::matched(existing.file_id, file_hash)
            }
            Ok(None) => DuplicateInfo::none(),
            Err(e) => {
                tracing::warn!("duplicate lookup failed for file {}: {}", file_id, e);
                DuplicateInfo::none()
            }
        }
    }
}
