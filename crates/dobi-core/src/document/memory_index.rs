//! In-process brute-force document index.
//!
//! Used by tests and for ephemeral runs (`documents.index = "memory"`).
//! Nothing is persisted; every search scans all stored vectors.

use tokio::sync::RwLock;

use dobi_types::document::{DocumentChunk, ScoredChunk};
use dobi_types::error::DocumentError;

use super::index::DocumentIndex;

/// Cosine similarity of two vectors. Zero-length or zero-norm input scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[derive(Default)]
pub struct InMemoryDocumentIndex {
    entries: RwLock<Vec<(DocumentChunk, Vec<f32>)>>,
}

impl InMemoryDocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentIndex for InMemoryDocumentIndex {
    async fn add(
        &self,
        chunks: &[DocumentChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), DocumentError> {
        if chunks.len() != embeddings.len() {
            return Err(DocumentError::Index(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        let mut entries = self.entries.write().await;
        entries.extend(chunks.iter().cloned().zip(embeddings.iter().cloned()));
        Ok(())
    }

    async fn search(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, DocumentError> {
        let entries = self.entries.read().await;
        let mut scored: Vec<ScoredChunk> = entries
            .iter()
            .map(|(chunk, vector)| ScoredChunk {
                chunk: chunk.clone(),
                similarity: cosine_similarity(embedding, vector),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize, DocumentError> {
        Ok(self.entries.read().await.len())
    }

    async fn reset(&self) -> Result<(), DocumentError> {
        self.entries.write().await.clear();
        Ok(())
    }
}
