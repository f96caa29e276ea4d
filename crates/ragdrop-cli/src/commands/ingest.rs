//! Ingest a single file now.

use super::{build_ingestor, connect_ollama, load_config, open_store, print_ok, runtime, spinner};
use anyhow::{Context, Result};
use colored::Colorize;
use ragdrop_core::SourceFile;
use ragdrop_ingest::{mark_processed, IngestOutcome};
use std::path::Path;

/// Ingest one PDF and mark it processed on success.
pub fn run(explicit_config: Option<&Path>, file: &Path) -> Result<()> {
    let config = load_config(explicit_config)?;

    if !file.is_file() {
        anyhow::bail!("File not found: {}", file.display());
    }

    let prefix = &config.watch.processed_prefix;
    let source = SourceFile::from_path(file, prefix)
        .with_context(|| format!("Unsupported file name: {}", file.display()))?;
    if source.is_processed() {
        println!(
            "{} {} is already marked processed (name starts with '{}').",
            "Note:".yellow().bold(),
            source.name,
            prefix
        );
        return Ok(());
    }

    let rt = runtime()?;
    let providers = connect_ollama(&rt, &config)?;
    let store = open_store(&config)?;

    let pb = spinner(format!("Ingesting {}...", source.name))?;
    let progress_bar = pb.clone();
    let ingestor = build_ingestor(&config, providers.embedder, store).with_progress(move |p| {
        progress_bar.set_message(format!(
            "Embedding {}: {}/{} chunks ({}%)",
            p.file,
            p.done,
            p.total,
            p.percent()
        ));
        progress_bar.tick();
    });

    let outcome = rt.block_on(ingestor.ingest_file(&source.path));
    pb.finish_and_clear();

    match outcome.with_context(|| format!("Failed to ingest {}", source.name))? {
        IngestOutcome::Ingested { chunks } => {
            print_ok(format!("Ingested {} ({} chunks)", source.name, chunks));
            let renamed = mark_processed(&source, prefix)?;
            print_ok(format!("Marked processed: {}", renamed.display()));
        }
        IngestOutcome::Skipped { reason } => {
            println!("{} {}", "Skipped:".yellow().bold(), reason);
        }
    }

    Ok(())
}
