//! Document chunk and load-report types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded span of a source document used as the retrieval unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    /// Path of the file the chunk came from.
    pub source: String,
    /// Position of the chunk within its source file.
    pub chunk_index: u32,
    pub text: String,
}

/// A chunk returned from a similarity search together with its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    /// Cosine similarity in `[-1, 1]`; higher is closer.
    pub similarity: f32,
}

/// File formats the document loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Plain text (`.txt`).
    Text,
    /// Markdown (`.md`).
    Markdown,
    /// Jupyter notebook (`.ipynb`).
    Notebook,
}

impl FileKind {
    /// Classify a file extension (without the dot, case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(FileKind::Text),
            "md" => Some(FileKind::Markdown),
            "ipynb" => Some(FileKind::Notebook),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Text => "txt",
            FileKind::Markdown => "md",
            FileKind::Notebook => "ipynb",
        }
    }
}

/// How documents are split into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Exact character sliding window with a fixed overlap.
    #[default]
    Fixed,
    /// Boundary-aware splitting (paragraphs, sentences, markdown headings).
    Semantic,
}

/// Which retrieval path a query goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Direct similarity search against the whole index.
    #[default]
    Similarity,
    /// Through a pre-built retriever bound to the store.
    Retriever,
}

impl FromStr for RetrievalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "similarity" => Ok(RetrievalMode::Similarity),
            "retriever" => Ok(RetrievalMode::Retriever),
            other => Err(format!("invalid retrieval mode: '{other}'")),
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalMode::Similarity => write!(f, "similarity"),
            RetrievalMode::Retriever => write!(f, "retriever"),
        }
    }
}

/// A file that was loaded and indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub kind: FileKind,
    pub chunks: usize,
}

/// A file that failed to load, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of loading a directory. Loading never aborts on a single file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub loaded: Vec<LoadedFile>,
    pub failed: Vec<FileFailure>,
}

impl LoadReport {
    /// Total number of chunks indexed across loaded files.
    pub fn total_chunks(&self) -> usize {
        self.loaded.iter().map(|f| f.chunks).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
