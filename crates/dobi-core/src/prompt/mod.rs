//! Prompt templates, the named registry, and model-bound chains.

pub mod chain;
pub mod registry;
pub mod template;
