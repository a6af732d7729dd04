//! Conversation history persistence.

pub mod file;
