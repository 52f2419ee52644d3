use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::{ScoringStrategy, UnitMode};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub retrieval: RetrievalConfig,
    pub server: ServerConfig,
    pub augment: AugmentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            retrieval: RetrievalConfig::default(),
            server: ServerConfig::default(),
            augment: AugmentConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_upload_root")]
    pub upload_root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            upload_root: default_upload_root(),
        }
    }
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("uploads")
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_unit_mode")]
    pub unit_mode: UnitMode,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_sentence_lookahead")]
    pub sentence_lookahead: usize,
    #[serde(default = "default_scoring_strategy")]
    pub scoring_strategy: ScoringStrategy,
    #[serde(default = "default_snippet_window")]
    pub snippet_window: usize,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            unit_mode: default_unit_mode(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            sentence_lookahead: default_sentence_lookahead(),
            scoring_strategy: default_scoring_strategy(),
            snippet_window: default_snippet_window(),
            top_k: default_top_k(),
        }
    }
}

fn default_unit_mode() -> UnitMode {
    UnitMode::Chunk
}
fn default_chunk_size() -> usize {
    850
}
fn default_chunk_overlap() -> usize {
    130
}
fn default_sentence_lookahead() -> usize {
    200
}
fn default_scoring_strategy() -> ScoringStrategy {
    ScoringStrategy::Overlap
}
fn default_snippet_window() -> usize {
    220
}
fn default_top_k() -> i64 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct AugmentConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

impl AugmentConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl Config {
    /// Retrieval parameters for the engine, derived from config.
    pub fn retrieval_params(&self) -> crate::search::RetrievalParams {
        crate::search::RetrievalParams {
            unit_mode: self.retrieval.unit_mode,
            chunk_size: self.retrieval.chunk_size,
            chunk_overlap: self.retrieval.chunk_overlap,
            sentence_lookahead: self.retrieval.sentence_lookahead,
            strategy: self.retrieval.scoring_strategy,
            snippet_window: self.retrieval.snippet_window,
        }
    }
}

/// Load configuration from `path`, or fall back to defaults when the
/// file does not exist (the defaults are a complete working setup).
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate retrieval
    if config.retrieval.chunk_size == 0 {
        anyhow::bail!("retrieval.chunk_size must be > 0");
    }
    if config.retrieval.snippet_window == 0 {
        anyhow::bail!("retrieval.snippet_window must be > 0");
    }
    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    // Validate server
    if config.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes must be > 0");
    }

    // Validate augmentation
    match config.augment.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown augment provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    if config.augment.is_enabled() && config.augment.model.is_none() {
        anyhow::bail!(
            "augment.model must be specified when provider is '{}'",
            config.augment.provider
        );
    }

    Ok(config)
}
