//! Ragdrop CLI - Drop PDFs into a folder, then ask questions about them.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ragdrop - Ask questions about the PDFs in a folder
#[derive(Parser)]
#[command(name = "ragdrop")]
#[command(author = "Lalo Morales <lalomorales22@github.com>")]
#[command(version)]
#[command(about = "Drop PDFs into a folder, then ask questions about them", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(short, long, global = true, env = "RAGDROP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize ragdrop (create config, watch folder and store)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Watch the folder and ingest new PDFs
    Watch {
        /// Run a single scan cycle and exit
        #[arg(long)]
        once: bool,

        /// Folder to watch (default: from config)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Seconds between scans (default: from config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Ingest one PDF now and mark it processed
    Ingest {
        /// Path to the PDF
        file: PathBuf,
    },

    /// Ask a single question
    Ask {
        /// Your question
        question: String,

        /// Maximum number of context chunks to use (default: from config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Hide source previews
        #[arg(long)]
        no_sources: bool,
    },

    /// Ask questions interactively
    Chat {
        /// Maximum number of context chunks to use (default: from config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Show vector store and watch folder statistics
    Stats,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Print the path of the config file
    Path,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ragdrop=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ragdrop=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init => commands::init::run(config_path),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(config_path),
            ConfigCommands::Path => commands::config::path(config_path),
        },
        Commands::Watch {
            once,
            dir,
            interval,
        } => commands::watch::run(config_path, once, dir, interval),
        Commands::Ingest { file } => commands::ingest::run(config_path, &file),
        Commands::Ask {
            question,
            top_k,
            no_sources,
        } => commands::ask::run(config_path, &question, top_k, !no_sources),
        Commands::Chat { top_k } => commands::chat::run(config_path, top_k),
        Commands::Stats => commands::stats::run(config_path),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
