use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use url::Url;

use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Directory every stage reads from and writes to
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Reference translations directory, relative to `work_dir`
    #[serde(default = "default_refs_dir")]
    pub refs_dir: PathBuf,

    /// Conventional artifact file names
    #[serde(default)]
    pub artifacts: ArtifactConfig,

    /// Translation service config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// File names of the pipeline artifacts inside the working directory
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ArtifactConfig {
    #[serde(default = "default_batch_input")]
    pub batch_input: String,

    #[serde(default = "default_batch_output")]
    pub batch_output: String,

    #[serde(default = "default_auto_scores")]
    pub auto_scores: String,

    #[serde(default = "default_auto_scores_rated")]
    pub auto_scores_rated: String,

    #[serde(default = "default_human_scores")]
    pub human_scores: String,

    #[serde(default = "default_combined_summary")]
    pub combined_summary: String,

    #[serde(default = "default_scoring_display")]
    pub scoring_display: String,

    #[serde(default = "default_raters_export")]
    pub raters_export: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            batch_input: default_batch_input(),
            batch_output: default_batch_output(),
            auto_scores: default_auto_scores(),
            auto_scores_rated: default_auto_scores_rated(),
            human_scores: default_human_scores(),
            combined_summary: default_combined_summary(),
            scoring_display: default_scoring_display(),
            raters_export: default_raters_export(),
        }
    }
}

/// Translation service settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    /// Ollama endpoint URL
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport-level retries for network and server errors
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff time in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            model: default_ollama_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Upper bound for transport-level retries
pub const MAX_RETRY_COUNT: u32 = 10;

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_refs_dir() -> PathBuf {
    PathBuf::from("refs")
}

fn default_batch_input() -> String {
    "batch.json".to_string()
}

fn default_batch_output() -> String {
    "batch_output.json".to_string()
}

fn default_auto_scores() -> String {
    "auto_scores.csv".to_string()
}

fn default_auto_scores_rated() -> String {
    "auto_scores_rated.csv".to_string()
}

fn default_human_scores() -> String {
    "human_scores_agg.csv".to_string()
}

fn default_combined_summary() -> String {
    "combined_summary.csv".to_string()
}

fn default_scoring_display() -> String {
    "scoring_display.csv".to_string()
}

fn default_raters_export() -> String {
    "for_raters.csv".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "translategemma:4b".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

impl Config {
    /// Load the configuration file, writing a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if FileManager::file_exists(path) {
            let content = FileManager::read_to_string(path)?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path));
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let translation = &self.translation;

        if translation.model.trim().is_empty() {
            return Err(anyhow!("Translation model must not be empty"));
        }

        if translation.endpoint.trim().is_empty() {
            return Err(anyhow!("Translation endpoint must not be empty"));
        }

        let url = Url::parse(&translation.endpoint)
            .with_context(|| format!("Invalid translation endpoint: {}", translation.endpoint))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!("Translation endpoint must use http or https: {}", translation.endpoint));
        }

        if translation.retry_count > MAX_RETRY_COUNT {
            return Err(anyhow!(
                "Retry count must be at most {}, got {}",
                MAX_RETRY_COUNT,
                translation.retry_count
            ));
        }

        if !(0.0..=2.0).contains(&translation.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0 and 2, got {}",
                translation.temperature
            ));
        }

        Ok(())
    }

    /// Path of an artifact inside the working directory
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.work_dir.join(file_name)
    }

    /// Reference translations directory
    pub fn refs_path(&self) -> PathBuf {
        self.work_dir.join(&self.refs_dir)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            work_dir: default_work_dir(),
            refs_dir: default_refs_dir(),
            artifacts: ArtifactConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
