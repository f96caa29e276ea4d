//! Watch command implementation.

use super::{build_ingestor, connect_ollama, load_config, open_store, runtime, CtrlC};
use anyhow::{Context, Result};
use colored::Colorize;
use ragdrop_core::StopSignal;
use ragdrop_ingest::{CycleReport, FileStatus, FolderWatcher, WatcherConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Start the folder watcher.
pub fn run(
    explicit_config: Option<&Path>,
    once: bool,
    dir: Option<PathBuf>,
    interval: Option<u64>,
) -> Result<()> {
    let config = load_config(explicit_config)?;

    let mut watcher_config = WatcherConfig::from_config(&config);
    if let Some(dir) = dir {
        watcher_config = watcher_config.with_directory(dir);
    }
    if let Some(secs) = interval {
        watcher_config = watcher_config.with_interval(Duration::from_secs(secs.max(1)));
    }

    std::fs::create_dir_all(&watcher_config.directory).with_context(|| {
        format!("Failed to create {}", watcher_config.directory.display())
    })?;

    let rt = runtime()?;
    let providers = connect_ollama(&rt, &config)?;
    let store = open_store(&config)?;
    let ingestor = build_ingestor(&config, providers.embedder, store);

    print_banner(&watcher_config, once);

    let mut watcher = FolderWatcher::new(watcher_config, ingestor);

    if once {
        let report = rt
            .block_on(watcher.run_cycle(&StopSignal::never()))
            .context("Scan failed")?;
        print_report(&report);
        return Ok(());
    }

    rt.block_on(async {
        let ctrl_c = CtrlC::listen();
        watcher.run(ctrl_c.signal.clone()).await;
    });
    println!("{}", "Stopped.".cyan());

    Ok(())
}

fn print_banner(config: &WatcherConfig, once: bool) {
    println!("{}", "ragdrop watcher".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Folder:    {}", config.directory.display());
    if once {
        println!("  Mode:      single scan");
    } else {
        println!("  Interval:  every {} seconds", config.interval.as_secs());
    }
    println!("  Types:     {}", config.extensions.join(", "));
    println!(
        "  Processed files are renamed with a '{}' prefix and skipped afterwards.",
        config.processed_prefix
    );
    if !once {
        println!("\nPress Ctrl+C to stop.\n");
    }
}

fn print_report(report: &CycleReport) {
    if report.eligible == 0 {
        println!("{}", "No new documents found.".dimmed());
        return;
    }

    for outcome in &report.outcomes {
        match &outcome.status {
            FileStatus::Processed { chunks, .. } => println!(
                "  {} {} ({} chunks)",
                "✓".green(),
                outcome.file,
                chunks
            ),
            FileStatus::Skipped { reason } => {
                println!("  {} {} ({})", "-".yellow(), outcome.file, reason)
            }
            FileStatus::Failed { error, .. } => {
                println!("  {} {}: {}", "✗".red(), outcome.file, error)
            }
        }
    }

    println!();
    println!(
        "{} {} processed, {} failed, {} chunks stored",
        "Batch complete:".cyan().bold(),
        report.processed(),
        report.failed(),
        report.chunks()
    );
}
