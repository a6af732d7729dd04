//! CLI command definitions and dispatch for the `dobi` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod documents;
pub mod history;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

/// Kakao developer docs assistant.
#[derive(Parser)]
#[command(name = "dobi", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to dobi.toml (default: $DOBI_HOME/dobi.toml, then ./dobi.toml).
    #[arg(long, global = true, env = "DOBI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (default from [server]).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (default from [server]).
        #[arg(long)]
        host: Option<String>,
    },

    /// Ask a single question within a conversation.
    Ask {
        /// Conversation identifier (letters, digits, '-' and '_').
        conversation: String,

        /// The question.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Interactive chat within a conversation.
    Chat {
        /// Conversation identifier (letters, digits, '-' and '_').
        conversation: String,
    },

    /// Index every supported file under a directory.
    Load {
        /// Directory to load (default from [documents].data_dir).
        #[arg(long, short)]
        dir: Option<PathBuf>,

        /// Drop the collection before loading.
        #[arg(long)]
        reset: bool,
    },

    /// Show the document chunks most similar to a query.
    Search {
        /// Query text.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Number of chunks to return (default from [documents].top_k).
        #[arg(long, short)]
        k: Option<usize>,

        /// Retrieval path: similarity or retriever.
        #[arg(long)]
        mode: Option<String>,
    },

    /// Show a conversation's turns, or list conversations when no id is given.
    History {
        conversation: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Cyan spinner shown while waiting on the model or the index.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
