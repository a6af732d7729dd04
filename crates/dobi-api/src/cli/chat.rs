//! Question answering from the terminal: one-shot `ask` and interactive `chat`.

use anyhow::Result;
use console::style;
use dialoguer::Input;

use dobi_types::chat::{ChatExchange, ConversationId};

use crate::state::AppState;

const EXIT_COMMANDS: [&str; 3] = ["/exit", "/quit", "/q"];

/// Answer a single question and print the exchange.
///
/// # Examples
///
/// ```bash
/// dobi ask fa1010 카카오싱크 환불 정책이 뭐야?
/// dobi ask fa1010 "로그인 오류" --json
/// ```
pub async fn ask(state: &AppState, conversation: &str, text: String, json: bool, quiet: bool) -> Result<()> {
    let id = ConversationId::new(conversation)?;

    let spinner = (!json && !quiet).then(|| super::spinner("Thinking..."));
    let exchange = state.orchestrator.submit(id, text).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&exchange)?);
    } else {
        print_answer(&exchange);
    }

    if exchange.failed {
        anyhow::bail!("the answer could not be generated; see the log for details");
    }
    Ok(())
}

/// Interactive loop. Every line is submitted to the same conversation.
pub async fn chat(state: &AppState, conversation: &str) -> Result<()> {
    let id = ConversationId::new(conversation)?;
    let previous = state.orchestrator.history().load(&id).await?;

    println!();
    println!(
        "  {} conversation {} ({} earlier turns)",
        style("DOBI").cyan().bold(),
        style(id.as_str()).yellow(),
        previous.len()
    );
    println!(
        "  {}",
        style(format!("Type {} to leave.", EXIT_COMMANDS[0])).dim()
    );
    println!();

    loop {
        let line = tokio::task::spawn_blocking(|| {
            Input::<String>::new()
                .with_prompt("You")
                .allow_empty(true)
                .interact_text()
        })
        .await?;

        // Ctrl+C / Ctrl+D end the session.
        let Ok(line) = line else { break };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&text) {
            break;
        }

        let spinner = super::spinner("Thinking...");
        let exchange = state.orchestrator.submit(id.clone(), text.to_string()).await;
        spinner.finish_and_clear();
        print_answer(&exchange);
    }

    println!("  {}", style("Bye.").dim());
    Ok(())
}

fn print_answer(exchange: &ChatExchange) {
    println!();
    if exchange.failed {
        println!("  {} {}", style("!").red().bold(), style(&exchange.answer_text).red());
    } else {
        let intent = exchange
            .intent
            .map(|i| format!(" [{}]", i.label()))
            .unwrap_or_default();
        println!("  {}{}", style("DOBI").cyan().bold(), style(intent).dim());
        for line in exchange.answer_text.lines() {
            println!("  {line}");
        }
    }
    println!();
}
