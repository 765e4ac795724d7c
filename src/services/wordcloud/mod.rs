//! Word-cloud stage: render text through the external API and persist
//! the resulting image.
//!
//! This stage is best-effort by design. Any failure — empty text, API
//! error, timeout, image store I/O — surfaces only as `success = false`
//! in the outcome and never reaches the orchestrator as an error.

mod client;

pub use client::{HttpWordCloudClient, WordCloudClient, WordCloudError};

use std::sync::Arc;

use crate::config::RenderOptions;
use crate::storage::LocalImageStore;

/// Outcome of the word-cloud stage for one file.
#[derive(Debug, Clone, Default)]
pub struct WordCloudOutcome {
    pub success: bool,
    pub image_location: Option<String>,
    pub error_message: Option<String>,
}

impl WordCloudOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            image_location: None,
            error_message: Some(message.into()),
        }
    }

    fn saved(location: String) -> Self {
        Self {
            success: true,
            image_location: Some(location),
            error_message: None,
        }
    }
}

/// Renders and persists a word-cloud image for text content.
pub struct WordCloudStage {
    client: Arc<dyn WordCloudClient>,
    image_store: LocalImageStore,
    options: RenderOptions,
}

impl WordCloudStage {
    pub fn new(
        client: Arc<dyn WordCloudClient>,
        image_store: LocalImageStore,
        options: RenderOptions,
    ) -> Self {
        Self {
            client,
            image_store,
            options,
        }
    }

    /// Render a word cloud for the text and save it through the image store.
    pub async fn generate_and_save(&self, file_id: &str, text: &str) -> WordCloudOutcome {
        if text.trim().is_empty() {
            tracing::warn!("no text content for file {}, skipping word cloud", file_id);
            return WordCloudOutcome::failed("file contains no text");
        }

        let image = match self.client.generate(text, &self.options).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("word-cloud generation failed for file {}: {}", file_id, e);
                return WordCloudOutcome::failed(e.to_string());
            }
        };

        let file_name = format!("{}_wordcloud.{}", file_id, self.options.format);
        match self.image_store.save(&image, &file_name) {
            Ok(locator) => {
                tracing::info!("word-cloud image for file {} stored as {}", file_id, locator);
                WordCloudOutcome::saved(locator)
            }
            Err(e) => {
                tracing::warn!("failed to store word-cloud image for file {}: {}", file_id, e);
                WordCloudOutcome::failed(format!("failed to store image: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::tempdir;

    struct StaticClient {
        response: Result<Vec<u8>, ()>,
    }

    #[async_trait]
    impl WordCloudClient for StaticClient {
        async fn generate(
            &self,
            _text: &str,
            _options: &RenderOptions,
        ) -> Result<Vec<u8>, WordCloudError> {
            match &self.response {
                Ok(bytes) => Ok(bytes.clone()),
                Err(()) => Err(WordCloudError::EmptyImage),
            }
        }
    }

    fn stage(response: Result<Vec<u8>, ()>, dir: &std::path::Path) -> WordCloudStage {
        WordCloudStage::new(
            Arc::new(StaticClient { response }),
            LocalImageStore::new(dir),
            RenderOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_empty_text_fails_without_calling_api() {
        let dir = tempdir().unwrap();
        let outcome = stage(Ok(vec![1]), dir.path())
            .generate_and_save("file-1", "   \n")
            .await;
        assert!(!outcome.success);
        assert!(outcome.image_location.is_none());
        assert!(outcome.error_message.is_some());
    }

    #[tokio::test]
    async fn test_generator_failure_is_contained() {
        let dir = tempdir().unwrap();
        let outcome = stage(Err(()), dir.path())
            .generate_and_save("file-1", "some text")
            .await;
        assert!(!outcome.success);
        assert!(outcome.error_message.is_some());
    }

    #[tokio::test]
    async fn test_success_returns_locator() {
        let dir = tempdir().unwrap();
        let outcome = stage(Ok(vec![0x89, b'P', b'N', b'G']), dir.path())
            .generate_and_save("file-1", "some text")
            .await;
        assert!(outcome.success);
        let locator = outcome.image_location.unwrap();
        assert!(locator.ends_with(".png"));
    }
}
