//! Ask command - RAG-based question answering.

use super::{connect_ollama, load_config, open_store, runtime, spinner, CtrlC};
use anyhow::{Context, Result};
use colored::Colorize;
use ragdrop_config::Config;
use ragdrop_core::{QueryResult, VectorStore};
use ragdrop_query::{truncate_preview, QueryEngine, QueryOptions, QuerySession};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Run the ask command.
pub fn run(
    explicit_config: Option<&Path>,
    question: &str,
    top_k: Option<usize>,
    show_sources: bool,
) -> Result<()> {
    let config = load_config(explicit_config)?;
    let rt = runtime()?;
    let session = build_session(&rt, &config, top_k)?;

    println!("{} {}", "Question:".cyan().bold(), question);
    println!("{}", "─".repeat(70));
    println!();

    let result = ask_with_spinner(&rt, &session, question)?;
    print_result(&result, show_sources, config.query.preview_chars);

    Ok(())
}

/// Wire the query engine to Ollama and the vector store.
pub fn build_session(rt: &Runtime, config: &Config, top_k: Option<usize>) -> Result<QuerySession> {
    let providers = connect_ollama(rt, config)?;
    let store = open_store(config)?;

    let stats = rt
        .block_on(store.stats())
        .context("Failed to read vector store")?;
    if stats.chunks == 0 {
        println!(
            "{} The vector store is empty. Drop PDFs into {} and run 'ragdrop watch'.",
            "Note:".yellow().bold(),
            config.watch_directory().display()
        );
        println!();
    }

    let mut options = QueryOptions::from_config(&config.query);
    if let Some(k) = top_k {
        options.top_k = k.max(1);
    }

    let engine = QueryEngine::new(providers.embedder, providers.generator, store)
        .with_options(options);
    Ok(QuerySession::new(Arc::new(engine)))
}

/// Answer one question while a spinner runs. Ctrl+C cancels the question.
pub fn ask_with_spinner(rt: &Runtime, session: &QuerySession, question: &str) -> Result<QueryResult> {
    let pb = spinner("Ollama is thinking...")?;

    let result = rt.block_on(async {
        let ctrl_c = CtrlC::listen();
        session
            .ask_until(question, ctrl_c.signal.clone(), |progress| {
                pb.set_message(format!(
                    "Ollama is thinking... {}s",
                    progress.elapsed.as_secs()
                ));
                pb.tick();
            })
            .await
    });

    pb.finish_and_clear();
    result.context("Failed to answer question")
}

/// Print the answer followed by a preview of each supporting chunk.
pub fn print_result(result: &QueryResult, show_sources: bool, preview_chars: usize) {
    println!("{}", "Answer:".green().bold());
    println!();
    println!("{}", result.answer);
    println!();

    if show_sources && !result.context.is_empty() {
        println!("{}", "─".repeat(70));
        println!("{}", "Sources:".cyan().bold());
        for (i, item) in result.context.iter().enumerate() {
            let meta = &item.chunk.metadata;
            println!(
                "  {}. {} {} (similarity: {:.0}%)",
                i + 1,
                meta.source.white(),
                format!("[page {}]", meta.page).dimmed(),
                item.score * 100.0
            );
            println!(
                "     {}",
                truncate_preview(&item.chunk.text, preview_chars).dimmed()
            );
        }
        println!();
    }
}
