//! Initialize ragdrop.

use super::{config_file, get_paths, load_config, open_store, print_ok};
use anyhow::{Context, Result};
use colored::Colorize;
use ragdrop_config::Config;
use std::path::Path;

pub fn run(explicit_config: Option<&Path>) -> Result<()> {
    let paths = get_paths()?;
    let config_path = config_file(explicit_config)?;

    println!("{}", "Initializing ragdrop...".cyan().bold());

    paths
        .ensure_dirs()
        .context("Failed to create directories")?;
    print_ok("Created directories");

    if config_path.exists() {
        print_ok(format!("Using existing config: {}", config_path.display()));
    } else {
        Config::create_default_file(&config_path).context("Failed to create config file")?;
        print_ok(format!("Created config: {}", config_path.display()));
    }

    let config = load_config(explicit_config)?;

    let watch_dir = config.watch_directory();
    std::fs::create_dir_all(&watch_dir)
        .with_context(|| format!("Failed to create {}", watch_dir.display()))?;
    print_ok(format!("Watch folder: {}", watch_dir.display()));

    let store_path = config.store_path(Some(&paths))?;
    open_store(&config)?;
    print_ok(format!("Vector store: {}", store_path.display()));

    println!();
    println!("{}", "ragdrop initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Start Ollama: {}", "ollama serve".cyan());
    println!(
        "  2. Pull the models: {}",
        format!(
            "ollama pull {} && ollama pull {}",
            config.ollama.embedding_model, config.ollama.model
        )
        .cyan()
    );
    println!("  3. Start the watcher: {}", "ragdrop watch".cyan());
    println!(
        "  4. Drop PDFs into {} and ask: {}",
        watch_dir.display(),
        "ragdrop chat".cyan()
    );

    Ok(())
}
