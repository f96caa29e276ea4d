//! Show statistics.

use super::{format_size, load_config, open_store, runtime};
use anyhow::{Context, Result};
use colored::Colorize;
use ragdrop_config::AppPaths;
use ragdrop_core::VectorStore;
use ragdrop_ingest::{DocumentLoader, PdfLoader, WatcherConfig};
use std::path::Path;

pub fn run(explicit_config: Option<&Path>) -> Result<()> {
    let config = load_config(explicit_config)?;
    let store_path = config.store_path(AppPaths::new().as_ref())?;
    let store = open_store(&config)?;

    let rt = runtime()?;
    let stats = rt
        .block_on(store.stats())
        .context("Failed to read vector store")?;

    println!("{}", "ragdrop Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!();

    println!("{}", "Vector Store".white().bold());
    println!("  Collection:   {}", config.store.collection);
    println!("  Chunks:       {}", stats.chunks);
    println!("  Documents:    {}", stats.sources);
    if let Ok(meta) = std::fs::metadata(&store_path) {
        println!("  File:         {} ({})", store_path.display(), format_size(meta.len()));
    }
    println!();

    let watch = WatcherConfig::from_config(&config);
    println!("{}", "Watch Folder".white().bold());
    println!("  Path:         {}", watch.directory.display());
    match watch.list_files() {
        Ok(files) => {
            let processed = files.iter().filter(|f| f.is_processed()).count();
            let loader = PdfLoader::new();
            let pending = files
                .iter()
                .filter(|f| watch.is_eligible(f))
                .filter(|f| f.extension().map_or(false, |ext| loader.supports(&ext)))
                .count();
            println!("  Processed:    {}", processed);
            println!("  Pending:      {}", pending);
        }
        Err(_) => println!("  {}", "(folder does not exist yet)".dimmed()),
    }

    Ok(())
}
