//! Configuration commands.

use super::{config_file, load_config};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Print the configuration as the commands will see it.
pub fn show(explicit_config: Option<&Path>) -> Result<()> {
    let path = config_file(explicit_config)?;
    let config = load_config(explicit_config)?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    if path.exists() {
        println!("{}", format!("# from {}", path.display()).dimmed());
    } else {
        println!("{}", "# defaults (no config file, run 'ragdrop init')".dimmed());
    }
    println!("{}", "# environment overrides applied".dimmed());
    println!();
    println!("{}", rendered);

    Ok(())
}

pub fn path(explicit_config: Option<&Path>) -> Result<()> {
    println!("{}", config_file(explicit_config)?.display());
    Ok(())
}
