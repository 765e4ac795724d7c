//! HTTP client for the external word-cloud rendering API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::RenderOptions;

/// Errors from word-cloud generation.
#[derive(Debug, Error)]
pub enum WordCloudError {
    #[error("word-cloud request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("word-cloud API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("word-cloud API returned an empty image")]
    EmptyImage,
}

/// External image generator contract.
#[async_trait]
pub trait WordCloudClient: Send + Sync {
    /// Render a word-cloud image for a text, returning the image bytes.
    async fn generate(
        &self,
        text: &str,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, WordCloudError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    text: &'a str,
    width: u32,
    height: u32,
    background_color: &'a str,
    font_family: &'a str,
    font_size: u32,
    font_color: &'a str,
    font_scale: f32,
    remove_stopwords: bool,
    language: &'a str,
    format: &'a str,
    use_word_list: bool,
}

impl<'a> GenerateRequest<'a> {
    fn new(text: &'a str, options: &'a RenderOptions) -> Self {
        Self {
            text,
            width: options.width,
            height: options.height,
            background_color: &options.background_color,
            font_family: &options.font_family,
            font_size: options.font_size,
            font_color: &options.font_color,
            font_scale: options.font_scale,
            remove_stopwords: options.remove_stopwords,
            language: &options.language,
            format: &options.format,
            use_word_list: options.use_word_list,
        }
    }
}

/// Word-cloud client over HTTP with a bounded request timeout.
pub struct HttpWordCloudClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWordCloudClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WordCloudError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl WordCloudClient for HttpWordCloudClient {
    async fn generate(
        &self,
        text: &str,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, WordCloudError> {
        let url = format!("{}/wordcloud/generate", self.base_url);
        tracing::debug!(
            "POST {} ({}x{}, format {})",
            url,
            options.width,
            options.height,
            options.format
        );

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest::new(text, options))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("word-cloud API error {}: {}", status, body);
            return Err(WordCloudError::Api { status, body });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(WordCloudError::EmptyImage);
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let options = RenderOptions::default();
        let request = GenerateRequest::new("hello world", &options);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["text"], "hello world");
        assert_eq!(json["backgroundColor"], "#FFFFFF");
        assert_eq!(json["removeStopwords"], true);
        assert_eq!(json["useWordList"], false);
    }
}
