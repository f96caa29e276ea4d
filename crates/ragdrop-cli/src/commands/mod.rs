//! CLI command implementations.

pub mod ask;
pub mod chat;
pub mod config;
pub mod ingest;
pub mod init;
pub mod stats;
pub mod watch;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use ragdrop_config::{AppPaths, Config};
use ragdrop_core::{stop_channel, EmbeddingProvider, GenerationProvider, StopSignal, VectorStore};
use ragdrop_db::SqliteVectorStore;
use ragdrop_ingest::{ChunkConfig, Ingestor};
use ragdrop_ollama::{OllamaChat, OllamaClient, OllamaEmbedder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::warn;

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Config file in use: the explicit path, or the platform default.
pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(get_paths()?.config_file),
    }
}

/// Load the config file, apply environment overrides, and validate.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = config_file(explicit)?;
    let mut config = Config::load_from(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Create async runtime.
pub fn runtime() -> Result<Runtime> {
    Runtime::new().context("Failed to create async runtime")
}

/// Open the vector store file named by the config, creating it if needed.
pub fn open_store(config: &Config) -> Result<Arc<SqliteVectorStore>> {
    let paths = AppPaths::new();
    let path = config
        .store_path(paths.as_ref())
        .context("Failed to determine vector store location")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let store = SqliteVectorStore::open(&path, &config.store.collection)
        .with_context(|| format!("Failed to open vector store at {}", path.display()))?;
    Ok(Arc::new(store))
}

/// The Ollama-backed providers, after checking the server answers.
pub struct Providers {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: Arc<dyn GenerationProvider>,
}

/// Connect to Ollama and fail fast if it is not running.
pub fn connect_ollama(rt: &Runtime, config: &Config) -> Result<Providers> {
    let client =
        OllamaClient::from_config(&config.ollama).context("Failed to create Ollama client")?;

    if !rt.block_on(client.is_available()) {
        anyhow::bail!(
            "Ollama is not running at {}. Start it with 'ollama serve'.",
            config.ollama.host
        );
    }

    for model in [&config.ollama.embedding_model, &config.ollama.model] {
        match rt.block_on(client.has_model(model)) {
            Ok(true) => {}
            Ok(false) => warn!(
                "Model '{}' is not pulled yet. Run 'ollama pull {}'.",
                model, model
            ),
            Err(e) => warn!("Could not list Ollama models: {}", e),
        }
    }

    Ok(Providers {
        embedder: Arc::new(OllamaEmbedder::from_config(client.clone(), &config.ollama)),
        generator: Arc::new(OllamaChat::from_config(client, &config.ollama)),
    })
}

/// Build the ingestion pipeline from config.
pub fn build_ingestor(
    config: &Config,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
) -> Ingestor {
    Ingestor::new(embedder, store, ChunkConfig::from_config(&config.chunking))
}

/// Raises a stop signal on Ctrl+C until dropped.
pub struct CtrlC {
    pub signal: StopSignal,
    task: JoinHandle<()>,
}

impl CtrlC {
    /// Start listening. Must be called inside the runtime.
    pub fn listen() -> Self {
        let (handle, signal) = stop_channel();
        let task = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.stop();
            }
        });
        Self { signal, task }
    }
}

impl Drop for CtrlC {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spinner with a message, in the same style everywhere.
pub fn spinner(message: impl Into<String>) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.into());
    Ok(pb)
}

/// Print a success line.
pub fn print_ok(message: impl std::fmt::Display) {
    println!("  {} {}", "✓".green(), message);
}

/// Format a file size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
