//! Shared domain types for DOBI.
//!
//! Conversations, intents, document chunks, prompt context, configuration,
//! and the error taxonomy used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod document;
pub mod error;
pub mod intent;
pub mod llm;
pub mod prompt;
