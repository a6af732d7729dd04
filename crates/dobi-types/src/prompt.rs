//! Prompt names and the per-request context bag.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical names of the prompt templates the orchestrator uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptName {
    ParseIntent,
    InformationResponse,
    DefaultChain,
    SearchValueCheck,
    SearchCompression,
}

impl PromptName {
    pub const ALL: [PromptName; 5] = [
        PromptName::ParseIntent,
        PromptName::InformationResponse,
        PromptName::DefaultChain,
        PromptName::SearchValueCheck,
        PromptName::SearchCompression,
    ];

    /// Registry key.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptName::ParseIntent => "parse_intent",
            PromptName::InformationResponse => "information_response",
            PromptName::DefaultChain => "default_chain",
            PromptName::SearchValueCheck => "search_value_check",
            PromptName::SearchCompression => "search_compression",
        }
    }

    /// File the template is read from, relative to the template directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            PromptName::ParseIntent => "parse_intent.txt",
            PromptName::InformationResponse => "information_response.txt",
            PromptName::DefaultChain => "default_response.txt",
            PromptName::SearchValueCheck => "search_value_check.txt",
            PromptName::SearchCompression => "search_compress.txt",
        }
    }

    /// Key the chain's output is stored under.
    pub fn output_key(&self) -> &'static str {
        match self {
            PromptName::ParseIntent => "intent",
            _ => "output",
        }
    }
}

impl fmt::Display for PromptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known context bag keys.
pub mod keys {
    pub const USER_MESSAGE: &str = "user_message";
    pub const INPUT: &str = "input";
    pub const INTENT_LIST: &str = "intent_list";
    pub const CHAT_HISTORY: &str = "chat_history";
    pub const RELATED_DOCUMENTS: &str = "related_documents";
    pub const RELATED_WEB_SEARCH_RESULTS: &str = "related_web_search_results";
    pub const COMPRESSED_WEB_SEARCH_RESULTS: &str = "compressed_web_search_results";
}

/// Per-request mapping from placeholder name to value.
///
/// Created fresh for each request and dropped when the request completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBag {
    values: BTreeMap<String, String>,
}

impl ContextBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
