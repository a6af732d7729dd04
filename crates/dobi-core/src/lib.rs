//! Business logic and port definitions for DOBI.
//!
//! This crate defines the traits (LLM provider, embedder, document index,
//! history repository, web search) that the infrastructure layer implements,
//! plus the services that drive them. It depends only on `dobi-types` --
//! never on `dobi-infra`.

pub mod document;
pub mod history;
pub mod intent;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;
