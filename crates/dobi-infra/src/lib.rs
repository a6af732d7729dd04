//! Infrastructure layer for DOBI.
//!
//! Contains implementations of the traits defined in `dobi-core`: the
//! OpenAI-compatible chat provider, OpenAI and fastembed embedders, the
//! LanceDB document index, the text-splitter chunker, the JSON-lines
//! history store and Google web search. Also loads config, prompt
//! templates and credentials.

pub mod config;
pub mod document;
pub mod embedding;
pub mod history;
pub mod llm;
pub mod prompt;
pub mod search;
pub mod secret;
pub mod vector;
