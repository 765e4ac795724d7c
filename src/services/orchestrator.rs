//! Analysis orchestration state machine.
//!
//! Drives one analysis request through the pipeline stages and persists
//! progress after every stage, so callers polling the record observe
//! monotonic progress of the current run.
//!
//! States: Pending (no row yet) → InProgress → {Completed, Failed}.
//! A Completed record re-enters InProgress only when the orchestrator is
//! invoked with content whose fingerprint differs from the stored hash;
//! a matching fingerprint short-circuits and returns the stored record.
//!
//! Concurrent analyze calls for the same file id are not serialized
//! beyond the row's read-modify-write: the persistence layer's
//! last-committed-write wins. This relaxation is deliberate; the service
//! assumes a single logical writer per file id.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::models::{AnalysisRecord, AnalysisStatus};
use crate::repository::AnalysisRepository;
use crate::storage::BlobStore;

use super::duplicate::DuplicateDetector;
use super::statistics::StatisticsCounter;
use super::wordcloud::WordCloudStage;

/// Errors that escape the orchestrator to its caller.
///
/// Stage failures do not appear here: content fetch failures become a
/// Failed record, and the duplicate and word-cloud stages absorb their
/// own errors. Only persistence failures propagate.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

/// Ties the pipeline stages together and owns the record for the
/// duration of one analyze invocation.
pub struct AnalysisOrchestrator {
    repo: AnalysisRepository,
    blob_store: Arc<dyn BlobStore>,
    duplicates: DuplicateDetector,
    word_cloud: Option<WordCloudStage>,
    fetch_timeout: Duration,
}

impl AnalysisOrchestrator {
    pub fn new(
        repo: AnalysisRepository,
        blob_store: Arc<dyn BlobStore>,
        word_cloud: Option<WordCloudStage>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            duplicates: DuplicateDetector::new(repo.clone()),
            repo,
            blob_store,
            word_cloud,
            fetch_timeout,
        }
    }

    /// Run the analysis pipeline for a file whose content has the given
    /// fingerprint, returning the persisted record.
    pub async fn analyze(
        &self,
        file_id: &str,
        file_hash: &str,
    ) -> Result<AnalysisRecord, AnalysisError> {
        tracing::info!("starting analysis for file {} (hash {})", file_id, file_hash);

        // Idempotency fast path: the same content already analyzed to
        // completion is returned unchanged, no stages run.
        let mut record = match self.repo.get(file_id).await? {
            Some(existing)
                if existing.status == AnalysisStatus::Completed
                    && existing.file_hash == file_hash =>
            {
                tracing::info!(
                    "analysis for file {} already completed with matching hash, returning existing result",
                    file_id
                );
                return Ok(existing);
            }
            Some(mut existing) => {
                existing.begin_reanalysis(file_hash);
                existing
            }
            None => AnalysisRecord::new(file_id, file_hash),
        };

        // Durable intent marker: the InProgress transition is persisted
        // before any stage runs.
        self.repo.save(&record).await?;

        // Fetch content into memory; failure here is fatal to the analysis
        // and no stages run.
        tracing::debug!("fetching content for file {} from blob store", file_id);
        let fetched = tokio::time::timeout(self.fetch_timeout, self.blob_store.fetch(file_id)).await;
        let content = match fetched {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                tracing::error!("failed to retrieve content for file {}: {}", file_id, e);
                record.mark_failed(format!("failed to retrieve file content from storage: {e}"));
                self.repo.save(&record).await?;
                return Ok(record);
            }
            Err(_) => {
                tracing::error!("content fetch timed out for file {}", file_id);
                record.mark_failed("timed out retrieving file content from storage");
                self.repo.save(&record).await?;
                return Ok(record);
            }
        };
        let text = String::from_utf8_lossy(&content).into_owned();

        // Required stage: text statistics, committed before the next stage.
        let stats = StatisticsCounter::count(&text);
        tracing::info!(
            "statistics for file {}: {} words, {} chars, {} paragraphs",
            file_id,
            stats.word_count,
            stats.char_count,
            stats.paragraph_count
        );
        record.apply_statistics(&stats);
        self.repo.save(&record).await?;

        // Required stage: duplicate check. Storage errors inside the
        // detector degrade to "no duplicate" and never fail the pipeline.
        let duplicate = self.duplicates.find_duplicate(file_id, file_hash).await;
        tracing::info!(
            "duplicate check for file {}: is_duplicate={}, matched={:?}",
            file_id,
            duplicate.is_duplicate,
            duplicate.matched_file_id
        );
        record.set_duplicate_info(duplicate);
        self.repo.save(&record).await?;

        // Optional stage: word cloud. Failure leaves the image path unset
        // and does not affect the overall status.
        if let Some(stage) = &self.word_cloud {
            let outcome = stage.generate_and_save(file_id, &text).await;
            if outcome.success {
                if let Some(locator) = outcome.image_location {
                    record.set_word_cloud_image(locator);
                    self.repo.save(&record).await?;
                }
            } else {
                tracing::warn!(
                    "word-cloud stage failed for file {}: {}",
                    file_id,
                    outcome.error_message.as_deref().unwrap_or("unknown error")
                );
            }
        }

        record.mark_completed();
        self.repo.save(&record).await?;
        tracing::info!(
            "analysis finished for file {} with status {}",
            file_id,
            record.status.as_str()
        );
        Ok(record)
    }
}
