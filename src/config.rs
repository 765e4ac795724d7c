//! Configuration management for docanalyze.
//!
//! Rendering options and storage paths are explicit values resolved here
//! and passed into constructors; nothing reads ambient process-wide state
//! after startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "docanalyze.db";

/// Default blobs subdirectory name.
const BLOBS_SUBDIR: &str = "blobs";

/// Default word-cloud images subdirectory name.
const IMAGES_SUBDIR: &str = "wordclouds";

/// Default timeout for blob store fetches (seconds).
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default timeout for the word-cloud API call (seconds).
const DEFAULT_WORD_CLOUD_TIMEOUT_SECS: u64 = 20;

/// Rendering options sent to the word-cloud API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub font_family: String,
    pub font_size: u32,
    pub font_color: String,
    pub font_scale: f32,
    pub remove_stopwords: bool,
    pub language: String,
    pub format: String,
    pub use_word_list: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background_color: "#FFFFFF".to_string(),
            font_family: "Arial".to_string(),
            font_size: 20,
            font_color: "#000000".to_string(),
            font_scale: 1.5,
            remove_stopwords: true,
            language: "ru".to_string(),
            format: "png".to_string(),
            use_word_list: false,
        }
    }
}

/// Word-cloud service section of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordCloudConfig {
    /// Base URL of the word-cloud API; the stage is disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Rendering options.
    #[serde(default)]
    pub render: RenderOptions,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename or path. A plain filename is joined with data_dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Blob store fetch timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_secs: Option<u64>,
    /// Word-cloud service configuration.
    #[serde(default)]
    pub word_cloud: WordCloudConfig,
}

impl Config {
    /// Load configuration from an explicit path, `./docanalyze.toml`, or the
    /// user config directory, in that order. Missing files yield defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let candidates: Vec<PathBuf> = match path {
            Some(p) => vec![p.to_path_buf()],
            None => {
                let mut paths = vec![PathBuf::from("docanalyze.toml")];
                if let Some(config_dir) = dirs::config_dir() {
                    paths.push(config_dir.join("docanalyze").join("config.toml"));
                }
                paths
            }
        };

        for candidate in &candidates {
            if candidate.exists() {
                let contents = fs::read_to_string(candidate)?;
                let config: Config = toml::from_str(&contents)?;
                tracing::debug!("loaded configuration from {}", candidate.display());
                return Ok(config);
            }
        }

        if path.is_some() {
            anyhow::bail!("configuration file not found: {}", candidates[0].display());
        }
        Ok(Config::default())
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub blobs_dir: PathBuf,
    pub images_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub word_cloud_url: Option<String>,
    pub word_cloud_timeout: Duration,
    pub render: RenderOptions,
}

impl Settings {
    /// Resolve a configuration to runtime settings.
    ///
    /// `DATABASE_URL` overrides the configured database path.
    pub fn from_config(config: &Config) -> Self {
        let data_dir = config
            .data_dir
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("docanalyze")))
            .unwrap_or_else(|| PathBuf::from(".docanalyze"));

        let database = std::env::var("DATABASE_URL")
            .ok()
            .or_else(|| config.database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE_FILENAME.to_string());
        let database = database
            .strip_prefix("sqlite:")
            .unwrap_or(&database)
            .to_string();
        let database_path = if Path::new(&database).is_absolute() || database.contains('/') {
            PathBuf::from(database)
        } else {
            data_dir.join(database)
        };

        Self {
            blobs_dir: data_dir.join(BLOBS_SUBDIR),
            images_dir: data_dir.join(IMAGES_SUBDIR),
            database_path,
            fetch_timeout: Duration::from_secs(
                config
                    .fetch_timeout_secs
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            ),
            word_cloud_url: config.word_cloud.url.clone(),
            word_cloud_timeout: Duration::from_secs(
                config
                    .word_cloud
                    .timeout_secs
                    .unwrap_or(DEFAULT_WORD_CLOUD_TIMEOUT_SECS),
            ),
            render: config.word_cloud.render.clone(),
            data_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.width, 800);
        assert_eq!(options.height, 600);
        assert_eq!(options.format, "png");
        assert!(options.remove_stopwords);
    }

    #[test]
    fn test_settings_from_empty_config() {
        let settings = Settings::from_config(&Config::default());
        assert!(settings.blobs_dir.ends_with(BLOBS_SUBDIR));
        assert!(settings.images_dir.ends_with(IMAGES_SUBDIR));
        assert!(settings.word_cloud_url.is_none());
        assert_eq!(
            settings.fetch_timeout,
            Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_config_parses_word_cloud_section() {
        let config: Config = toml::from_str(
            r#"
data_dir = "/var/lib/docanalyze"

[word_cloud]
url = "http://localhost:8001"
timeout_secs = 5

[word_cloud.render]
width = 400
language = "en"
"#,
        )
        .unwrap();

        assert_eq!(config.word_cloud.url.as_deref(), Some("http://localhost:8001"));
        assert_eq!(config.word_cloud.render.width, 400);
        assert_eq!(config.word_cloud.render.language, "en");
        // Unspecified render fields keep defaults
        assert_eq!(config.word_cloud.render.height, 600);
    }
}
