//! Conversation history CLI command.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use dobi_types::chat::{ConversationId, TurnRole};

use crate::state::AppState;

/// Show one conversation, or list every stored conversation id.
///
/// # Examples
///
/// ```bash
/// dobi history
/// dobi history fa1010 --json
/// ```
pub async fn history(state: &AppState, conversation: Option<&str>, json: bool) -> Result<()> {
    let Some(conversation) = conversation else {
        return list(state, json).await;
    };
    let id = ConversationId::new(conversation)?;
    let conversation = state.orchestrator.history().load(&id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
        return Ok(());
    }

    if conversation.is_empty() {
        println!();
        println!(
            "  {} No turns yet for '{}'. Start with: {}",
            style("i").blue().bold(),
            style(id.as_str()).cyan(),
            style(format!("dobi chat {id}")).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("Who").fg(Color::White),
        Cell::new("Text").fg(Color::White),
    ]);
    for turn in &conversation.turns {
        let who = match turn.role {
            TurnRole::User => Cell::new(turn.role.prefix()).fg(Color::Yellow),
            TurnRole::Assistant => Cell::new(turn.role.prefix()).fg(Color::Cyan),
        };
        table.add_row(vec![
            Cell::new(turn.timestamp.format("%Y-%m-%d %H:%M:%S")).fg(Color::DarkGrey),
            who,
            Cell::new(&turn.text),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!("  {} turns", style(conversation.len()).bold());
    println!();
    Ok(())
}

async fn list(state: &AppState, json: bool) -> Result<()> {
    let ids = state.orchestrator.history().list().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ids)?);
        return Ok(());
    }
    println!();
    if ids.is_empty() {
        println!("  {} No conversations stored.", style("i").blue().bold());
    }
    for id in &ids {
        println!("  {}", style(id.as_str()).cyan());
    }
    println!();
    Ok(())
}
