//! Document CLI commands: load a directory into the index, query it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use dobi_types::document::RetrievalMode;

use crate::state::AppState;

/// Index every supported file under `dir` and print a per-file report.
///
/// # Examples
///
/// ```bash
/// dobi load --dir ./datas
/// dobi load --reset --json
/// ```
pub async fn load(state: &AppState, dir: Option<PathBuf>, reset: bool, json: bool, quiet: bool) -> Result<()> {
    let dir = dir.unwrap_or_else(|| state.config.documents.data_dir.clone());

    if reset {
        state.documents.reset().await.context("Failed to reset collection")?;
    }

    let spinner = (!json && !quiet).then(|| super::spinner(&format!("Loading {}...", dir.display())));
    let report = state.documents.load(&dir).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = report.with_context(|| format!("Failed to load {}", dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("File").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Result").fg(Color::White),
    ]);
    for file in &report.loaded {
        table.add_row(vec![
            Cell::new(file.path.display()).fg(Color::Cyan),
            Cell::new(file.kind.extension()).fg(Color::DarkGrey),
            Cell::new(format!("{} chunks", file.chunks)).fg(Color::Green),
        ]);
    }
    for failure in &report.failed {
        table.add_row(vec![
            Cell::new(failure.path.display()).fg(Color::Cyan),
            Cell::new("-").fg(Color::DarkGrey),
            Cell::new(&failure.reason).fg(Color::Red),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} files loaded, {} chunks indexed into '{}'{}",
        style(report.loaded.len()).bold(),
        style(report.total_chunks()).bold(),
        style(state.documents.collection()).cyan(),
        if report.has_failures() {
            format!(", {} failed", style(report.failed.len()).red().bold())
        } else {
            String::new()
        }
    );
    println!();
    Ok(())
}

/// Print the top-k chunks for a query.
pub async fn search(
    state: &AppState,
    query: &str,
    k: Option<usize>,
    mode: Option<&str>,
    json: bool,
) -> Result<()> {
    let k = k.unwrap_or(state.config.documents.top_k);
    let mode = match mode {
        Some(raw) => raw.parse::<RetrievalMode>().map_err(|e| anyhow::anyhow!(e))?,
        None => state.config.documents.retrieval_mode,
    };

    let texts = state.documents.query_with_mode(query, k, mode).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&texts)?);
        return Ok(());
    }

    if texts.is_empty() {
        println!();
        println!(
            "  {} No documents indexed. Load some with: {}",
            style("i").blue().bold(),
            style("dobi load").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    for (rank, text) in texts.iter().enumerate() {
        println!("  {} {}", style(format!("#{}", rank + 1)).cyan().bold(), style(format!("({mode})")).dim());
        for line in text.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}
