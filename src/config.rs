use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub cache: CacheConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Host application-data directory (e.g. `~/Library/Application Support`).
    #[serde(default)]
    pub app_data_dir: Option<PathBuf>,
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: String,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            app_data_dir: None,
            vendor_dir: default_vendor_dir(),
            file_name: default_file_name(),
        }
    }
}

fn default_vendor_dir() -> String {
    "Granola".to_string()
}
fn default_file_name() -> String {
    "cache-v3.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentsConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_untitled")]
    pub untitled: String,
    #[serde(default = "default_unknown_participant")]
    pub unknown_participant: String,
    #[serde(default)]
    pub undated: UndatedPolicy,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            untitled: default_untitled(),
            unknown_participant: default_unknown_participant(),
            undated: UndatedPolicy::default(),
        }
    }
}

fn default_limit() -> usize {
    50
}
fn default_untitled() -> String {
    "Untitled Meeting".to_string()
}
fn default_unknown_participant() -> String {
    "Unknown".to_string()
}

/// Where documents with a missing or unparseable `created_at` sort.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UndatedPolicy {
    /// Stamp them with the current time (they float to the top).
    #[default]
    Now,
    /// Stamp them with epoch zero (they sink to the bottom).
    Last,
}

/// Resolved on-disk locations derived from [`CacheConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    /// The vendor directory; its existence is the install marker.
    pub vendor_dir: PathBuf,
    pub cache_file: PathBuf,
}

impl CachePaths {
    pub fn new(app_data_dir: &Path, vendor_dir: &str, file_name: &str) -> Self {
        let vendor_dir = app_data_dir.join(vendor_dir);
        let cache_file = vendor_dir.join(file_name);
        Self {
            vendor_dir,
            cache_file,
        }
    }
}

impl Config {
    /// Configuration used when no config file exists; the data directory must
    /// then come from the command line.
    pub fn minimal() -> Self {
        Self {
            cache: CacheConfig::default(),
            documents: DocumentsConfig::default(),
        }
    }

    pub fn cache_paths(&self) -> Result<CachePaths> {
        let app_data_dir = self
            .cache
            .app_data_dir
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("cache.app_data_dir is not set (use --data-dir)"))?;
        Ok(CachePaths::new(
            app_data_dir,
            &self.cache.vendor_dir,
            &self.cache.file_name,
        ))
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.cache.vendor_dir.trim().is_empty() {
        anyhow::bail!("cache.vendor_dir must not be empty");
    }
    if config.cache.file_name.trim().is_empty() {
        anyhow::bail!("cache.file_name must not be empty");
    }

    if config.documents.default_limit < 1 {
        anyhow::bail!("documents.default_limit must be >= 1");
    }
    if config.documents.untitled.is_empty() {
        anyhow::bail!("documents.untitled must not be empty");
    }
    if config.documents.unknown_participant.is_empty() {
        anyhow::bail!("documents.unknown_participant must not be empty");
    }

    Ok(())
}
