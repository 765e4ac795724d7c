//! End-to-end pipeline tests over a real SQLite database and local
//! blob store, with a scripted in-process word-cloud generator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use docanalyze::config::RenderOptions;
use docanalyze::models::{AnalysisRecord, AnalysisStatus};
use docanalyze::repository::{run_migrations, AnalysisRepository};
use docanalyze::services::wordcloud::{WordCloudClient, WordCloudError};
use docanalyze::services::{AnalysisOrchestrator, WordCloudStage};
use docanalyze::storage::{LocalBlobStore, LocalImageStore};

/// Counts generate calls; fails every call when `fail` is set.
struct ScriptedWordCloudClient {
    calls: AtomicUsize,
    fail: bool,
}

impl ScriptedWordCloudClient {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WordCloudClient for ScriptedWordCloudClient {
    async fn generate(
        &self,
        _text: &str,
        _options: &RenderOptions,
    ) -> Result<Vec<u8>, WordCloudError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(WordCloudError::EmptyImage)
        } else {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }
}

struct TestPipeline {
    _dir: TempDir,
    blobs: LocalBlobStore,
    repo: AnalysisRepository,
    orchestrator: AnalysisOrchestrator,
    word_cloud: Arc<ScriptedWordCloudClient>,
}

async fn pipeline(fail_word_cloud: bool) -> TestPipeline {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("analysis.db");
    run_migrations(db_path.to_str().unwrap()).await.unwrap();

    let blobs_dir = dir.path().join("blobs");
    let images_dir = dir.path().join("wordclouds");

    let repo = AnalysisRepository::new(&db_path);
    let word_cloud = Arc::new(ScriptedWordCloudClient::new(fail_word_cloud));
    let stage = WordCloudStage::new(
        word_cloud.clone(),
        LocalImageStore::new(&images_dir),
        RenderOptions::default(),
    );
    let orchestrator = AnalysisOrchestrator::new(
        repo.clone(),
        Arc::new(LocalBlobStore::new(&blobs_dir)),
        Some(stage),
        Duration::from_secs(5),
    );

    TestPipeline {
        _dir: dir,
        blobs: LocalBlobStore::new(&blobs_dir),
        repo,
        orchestrator,
        word_cloud,
    }
}

fn store(p: &TestPipeline, content: &[u8]) -> (String, String) {
    let file_id = p.blobs.save(content).unwrap();
    (file_id, AnalysisRecord::compute_hash(content))
}

#[tokio::test]
async fn test_analysis_completes_with_statistics() {
    let p = pipeline(false).await;
    let (file_id, hash) = store(&p, b"This is a test.\n\nAnother paragraph.");

    let record = p.orchestrator.analyze(&file_id, &hash).await.unwrap();

    assert_eq!(record.status, AnalysisStatus::Completed);
    assert_eq!(record.word_count, 6);
    assert_eq!(record.paragraph_count, 2);
    assert_eq!(record.file_hash, hash);
    assert!(record.completed_at.is_some());
    assert!(!record.duplicate_info.as_ref().unwrap().is_duplicate);
    assert!(record.word_cloud_image_path.is_some());

    // The record is durable, not just in memory
    let stored = p.repo.get(&file_id).await.unwrap().unwrap();
    assert_eq!(stored.status, AnalysisStatus::Completed);
    assert_eq!(stored.word_count, 6);
}

#[tokio::test]
async fn test_repeat_request_is_idempotent() {
    let p = pipeline(false).await;
    let (file_id, hash) = store(&p, b"same content");

    let first = p.orchestrator.analyze(&file_id, &hash).await.unwrap();
    let second = p.orchestrator.analyze(&file_id, &hash).await.unwrap();

    // No stage re-ran: the word-cloud generator was called exactly once
    assert_eq!(p.word_cloud.call_count(), 1);
    assert_eq!(second.id, first.id);
    assert_eq!(second.completed_at, first.completed_at);
    assert_eq!(second.word_cloud_image_path, first.word_cloud_image_path);
}

#[tokio::test]
async fn test_changed_content_triggers_reanalysis() {
    let p = pipeline(false).await;
    let (file_id, hash_v1) = store(&p, b"one two three");

    let first = p.orchestrator.analyze(&file_id, &hash_v1).await.unwrap();
    assert_eq!(first.word_count, 3);

    // Overwrite the stored content in place, keeping the file id
    let new_content = b"one two three four five";
    std::fs::write(p.blobs.blob_path(&file_id), new_content).unwrap();
    let hash_v2 = AnalysisRecord::compute_hash(new_content);

    let second = p.orchestrator.analyze(&file_id, &hash_v2).await.unwrap();

    assert_eq!(p.word_cloud.call_count(), 2);
    assert_eq!(second.status, AnalysisStatus::Completed);
    assert_eq!(second.file_hash, hash_v2);
    assert_eq!(second.word_count, 5);
    // Same row was updated, not a new one inserted
    assert_eq!(second.id, first.id);
    let stored = p.repo.get(&file_id).await.unwrap().unwrap();
    assert_eq!(stored.word_count, 5);
}

#[tokio::test]
async fn test_duplicate_detected_across_files() {
    let p = pipeline(false).await;
    let (file_a, hash) = store(&p, b"identical content");
    let (file_b, hash_b) = store(&p, b"identical content");
    assert_eq!(hash, hash_b);

    let first = p.orchestrator.analyze(&file_a, &hash).await.unwrap();
    assert!(!first.duplicate_info.as_ref().unwrap().is_duplicate);

    let second = p.orchestrator.analyze(&file_b, &hash).await.unwrap();
    let info = second.duplicate_info.as_ref().unwrap();
    assert!(info.is_duplicate);
    assert_eq!(info.matched_file_id.as_deref(), Some(file_a.as_str()));
    assert_eq!(info.matched_hash.as_deref(), Some(hash.as_str()));
}

#[tokio::test]
async fn test_different_content_is_never_reported_duplicate() {
    let p = pipeline(false).await;
    let (file_a, hash_a) = store(&p, b"first document body");
    let (file_b, hash_b) = store(&p, b"a second, unrelated body");
    assert_ne!(hash_a, hash_b);

    let first = p.orchestrator.analyze(&file_a, &hash_a).await.unwrap();
    assert_eq!(first.status, AnalysisStatus::Completed);

    // A completed row with a different fingerprint exists; exact hash
    // matching must never report it as a duplicate
    let second = p.orchestrator.analyze(&file_b, &hash_b).await.unwrap();
    assert_eq!(second.status, AnalysisStatus::Completed);
    let info = second.duplicate_info.as_ref().unwrap();
    assert!(!info.is_duplicate);
    assert!(info.matched_file_id.is_none());
    assert!(info.matched_hash.is_none());
}

#[tokio::test]
async fn test_word_cloud_failure_does_not_fail_analysis() {
    let p = pipeline(true).await;
    let (file_id, hash) = store(&p, b"text that will not get a word cloud");

    let record = p.orchestrator.analyze(&file_id, &hash).await.unwrap();

    assert_eq!(p.word_cloud.call_count(), 1);
    assert_eq!(record.status, AnalysisStatus::Completed);
    assert!(record.word_cloud_image_path.is_none());
    assert!(record.error_message.is_none());
    assert!(record.word_count > 0);
}

#[tokio::test]
async fn test_missing_content_marks_analysis_failed() {
    let p = pipeline(false).await;

    let record = p
        .orchestrator
        .analyze("no-such-file", "deadbeef")
        .await
        .unwrap();

    assert_eq!(record.status, AnalysisStatus::Failed);
    assert!(record.error_message.is_some());
    assert!(record.completed_at.is_none());
    assert_eq!(p.word_cloud.call_count(), 0);

    // No stage ran, so no stage results were recorded
    assert_eq!(record.word_count, 0);
    assert_eq!(record.char_count, 0);
    assert_eq!(record.paragraph_count, 0);
    assert!(record.duplicate_info.is_none());
    assert!(record.word_cloud_image_path.is_none());

    // The failed state is persisted
    let stored = p.repo.get("no-such-file").await.unwrap().unwrap();
    assert_eq!(stored.status, AnalysisStatus::Failed);
}

#[tokio::test]
async fn test_failed_analysis_can_be_retried() {
    let p = pipeline(false).await;

    let failed = p
        .orchestrator
        .analyze("late-file", "ignored")
        .await
        .unwrap();
    assert_eq!(failed.status, AnalysisStatus::Failed);

    // Content arrives after the first attempt
    let content = b"now the content exists";
    let path = p.blobs.blob_path("late-file");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    let hash = AnalysisRecord::compute_hash(content);

    let retried = p.orchestrator.analyze("late-file", &hash).await.unwrap();
    assert_eq!(retried.status, AnalysisStatus::Completed);
    assert!(retried.error_message.is_none());
    assert_eq!(retried.file_hash, hash);
}

#[tokio::test]
async fn test_pipeline_without_word_cloud_stage() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("analysis.db");
    run_migrations(db_path.to_str().unwrap()).await.unwrap();

    let blobs = LocalBlobStore::new(dir.path().join("blobs"));
    let file_id = blobs.save(b"no word cloud configured").unwrap();
    let hash = AnalysisRecord::compute_hash(b"no word cloud configured");

    let orchestrator = AnalysisOrchestrator::new(
        AnalysisRepository::new(&db_path),
        Arc::new(LocalBlobStore::new(dir.path().join("blobs"))),
        None,
        Duration::from_secs(5),
    );

    let record = orchestrator.analyze(&file_id, &hash).await.unwrap();
    assert_eq!(record.status, AnalysisStatus::Completed);
    assert!(record.word_cloud_image_path.is_none());
}
