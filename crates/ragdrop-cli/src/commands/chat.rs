//! Chat command - interactive question loop.

use super::ask::{ask_with_spinner, build_session, print_result};
use super::{get_paths, load_config, runtime};
use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

/// Run the interactive chat loop.
pub fn run(explicit_config: Option<&Path>, top_k: Option<usize>) -> Result<()> {
    let config = load_config(explicit_config)?;
    let rt = runtime()?;
    let session = build_session(&rt, &config, top_k)?;

    let mut rl = DefaultEditor::new()?;

    let history_path = get_paths().ok().map(|p| p.history_file);
    if let Some(path) = &history_path {
        let _ = rl.load_history(path);
    }

    println!("{}", "ragdrop chat".cyan().bold());
    println!("{}", "─".repeat(50));
    println!(
        "Answers come only from the documents in {}. Type {} to quit.",
        config.watch_directory().display(),
        "q".cyan()
    );
    println!();

    loop {
        let readline = rl.readline(&format!("{} ", "Enter a question (or type 'q' to quit):".green().bold()));
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if is_quit(line) {
                    println!("Exiting...");
                    break;
                }

                let _ = rl.add_history_entry(line);

                match ask_with_spinner(&rt, &session, line) {
                    Ok(result) => print_result(&result, true, config.query.preview_chars),
                    Err(e) => eprintln!("{} {:#}", "Error:".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Exiting...");
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red(), err);
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.save_history(path);
    }

    Ok(())
}

fn is_quit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "q" | "quit" | "exit")
}
