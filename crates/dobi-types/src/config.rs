//! Configuration types for DOBI.
//!
//! `DobiConfig` represents the top-level `dobi.toml`. Every section and
//! field has a default, so an empty file (or no file) is a valid config.
//! Secrets are never read from here; they come from the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::document::{ChunkStrategy, RetrievalMode};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DobiConfig {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub documents: DocumentsConfig,
    pub history: HistoryConfig,
    pub prompts: PromptsConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
}

/// Chat model settings shared by every prompt chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name used in logs and spans.
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// OpenAI-compatible endpoint.
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.1,
            max_tokens: 200,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Which embedding backend turns text into vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    OpenAi,
    FastEmbed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Model name for the OpenAI backend. Ignored by fastembed.
    pub model: String,
    pub base_url: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::OpenAi,
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Which similarity index backs the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Lance,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub data_dir: PathBuf,
    pub persist_dir: PathBuf,
    pub collection: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Extensions (without the dot) the loader accepts.
    pub extensions: Vec<String>,
    pub strategy: ChunkStrategy,
    pub index: IndexBackend,
    pub top_k: usize,
    pub retrieval_mode: RetrievalMode,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./datas"),
            persist_dir: PathBuf::from("./chroma-persist"),
            collection: "ka-bot".to_string(),
            chunk_size: 500,
            chunk_overlap: 100,
            extensions: vec!["txt".to_string(), "md".to_string(), "ipynb".to_string()],
            strategy: ChunkStrategy::Fixed,
            index: IndexBackend::Lance,
            top_k: 4,
            retrieval_mode: RetrievalMode::Similarity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub dir: PathBuf,
    /// Most recent turns rendered into prompts. 0 means unlimited.
    pub window_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./chat_history"),
            window_turns: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub dir: PathBuf,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./assets/templates"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    /// Check and compress raw results with the model before use.
    pub refine: bool,
    pub num_results: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refine: false,
            num_results: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}
