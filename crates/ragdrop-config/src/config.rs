//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding `ollama.host`.
pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
/// Environment variable overriding `watch.directory`.
pub const ENV_WATCH_DIR: &str = "RAGDROP_WATCH_DIR";
/// Environment variable overriding `store.path`.
pub const ENV_STORE_PATH: &str = "RAGDROP_STORE_PATH";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path. A missing file yields the
    /// defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_OLLAMA_HOST).filter(|v| !v.is_empty()) {
            self.ollama.host = if host.starts_with("http://") || host.starts_with("https://") {
                host
            } else {
                format!("http://{}", host)
            };
        }
        if let Some(dir) = lookup(ENV_WATCH_DIR).filter(|v| !v.is_empty()) {
            self.watch.directory = dir;
        }
        if let Some(path) = lookup(ENV_STORE_PATH).filter(|v| !v.is_empty()) {
            self.store.path = Some(path);
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        let c = &self.chunking;
        if c.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunking.chunk_size must be > 0".into()));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.separators.is_empty() {
            return Err(ConfigError::Invalid(
                "chunking.separators must not be empty".into(),
            ));
        }
        if self.watch.poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "watch.poll_interval_seconds must be > 0".into(),
            ));
        }
        if self.watch.processed_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "watch.processed_prefix must not be empty".into(),
            ));
        }
        if self.watch.extensions.is_empty() {
            return Err(ConfigError::Invalid("watch.extensions must not be empty".into()));
        }
        if self.query.top_k == 0 {
            return Err(ConfigError::Invalid("query.top_k must be > 0".into()));
        }
        if self.store.collection.trim().is_empty() {
            return Err(ConfigError::Invalid("store.collection must not be empty".into()));
        }
        Ok(())
    }

    /// Watched directory with `~` expanded.
    pub fn watch_directory(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.watch.directory).as_ref())
    }

    /// Vector store file: the configured path, or the platform data dir.
    pub fn store_path(&self, paths: Option<&AppPaths>) -> ConfigResult<PathBuf> {
        match &self.store.path {
            Some(p) => Ok(PathBuf::from(shellexpand::tilde(p).as_ref())),
            None => paths
                .map(|p| p.database_file.clone())
                .ok_or(ConfigError::NoConfigDir),
        }
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# ragdrop configuration
# Drop PDFs into the watched folder, then ask questions about them.

[ollama]
# Ollama server address (OLLAMA_HOST overrides)
host = "http://localhost:11434"

# Chat model used to answer questions
model = "llama3.2"

# Model used for embeddings
embedding_model = "mxbai-embed-large"

# 0.0 keeps answers reproducible
temperature = 0.0

# Upper bound for a single embedding or generation call
timeout_seconds = 120

[watch]
# Folder polled for new documents (RAGDROP_WATCH_DIR overrides)
directory = "./data"

# Seconds between scans
poll_interval_seconds = 10

# Ingested files are renamed with this prefix and never picked up again
processed_prefix = "_"

# Only these extensions are ingested
extensions = ["pdf"]

# File patterns to ignore
ignore_patterns = ["*.tmp", "*.part", ".DS_Store"]

[chunking]
# Characters per chunk
chunk_size = 1000

# Characters shared by neighbouring chunks
chunk_overlap = 200

# Tried in order until every piece fits; "" splits between characters
separators = ["\n\n", "\n", " ", ""]

[store]
# SQLite file holding the vectors (RAGDROP_STORE_PATH overrides)
# path = "./db/ragdrop.db"
collection = "documents"

[query]
# Chunks retrieved per question
top_k = 5

# Drop retrieved chunks scoring below this cosine similarity
# min_similarity = 0.3

# Characters of each source shown under an answer
preview_chars = 200
"#
        .to_string()
    }
}

/// Ollama provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            embedding_model: "mxbai-embed-large".to_string(),
            temperature: 0.0,
            timeout_seconds: 120,
        }
    }
}

/// Watched folder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub directory: String,
    pub poll_interval_seconds: u64,
    pub processed_prefix: String,
    pub extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directory: "./data".to_string(),
            poll_interval_seconds: 10,
            processed_prefix: "_".to_string(),
            extensions: vec!["pdf".to_string()],
            ignore_patterns: vec![
                "*.tmp".to_string(),
                "*.part".to_string(),
                ".DS_Store".to_string(),
            ],
        }
    }
}

/// Text splitting settings. Sizes are in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: Option<String>,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            collection: "documents".to_string(),
        }
    }
}

/// Question answering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub top_k: usize,
    pub min_similarity: Option<f32>,
    pub preview_chars: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_similarity: None,
            preview_chars: 200,
        }
    }
}
