//! Similarity index trait for document chunks.
//!
//! The index stores chunk text alongside its embedding and answers
//! nearest-neighbour queries by cosine similarity. Implementations:
//! [`super::memory_index::InMemoryDocumentIndex`] here, and the LanceDB
//! table in dobi-infra.

use std::future::Future;
use std::pin::Pin;

use dobi_types::document::{DocumentChunk, ScoredChunk};
use dobi_types::error::DocumentError;

/// Trait for a persistent or in-process chunk index.
pub trait DocumentIndex: Send + Sync {
    /// Insert chunks with their embeddings. `chunks[i]` pairs with `embeddings[i]`.
    fn add(
        &self,
        chunks: &[DocumentChunk],
        embeddings: &[Vec<f32>],
    ) -> impl Future<Output = Result<(), DocumentError>> + Send;

    /// Top `limit` chunks by cosine similarity, best first.
    fn search(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ScoredChunk>, DocumentError>> + Send;

    /// Number of indexed chunks.
    fn count(&self) -> impl Future<Output = Result<usize, DocumentError>> + Send;

    /// Drop every indexed chunk.
    fn reset(&self) -> impl Future<Output = Result<(), DocumentError>> + Send;
}

/// Object-safe version of [`DocumentIndex`] with boxed futures.
pub trait DocumentIndexDyn: Send + Sync {
    fn add_boxed<'a>(
        &'a self,
        chunks: &'a [DocumentChunk],
        embeddings: &'a [Vec<f32>],
    ) -> Pin<Box<dyn Future<Output = Result<(), DocumentError>> + Send + 'a>>;

    fn search_boxed<'a>(
        &'a self,
        embedding: &'a [f32],
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredChunk>, DocumentError>> + Send + 'a>>;

    fn count_boxed(&self) -> Pin<Box<dyn Future<Output = Result<usize, DocumentError>> + Send + '_>>;

    fn reset_boxed(&self) -> Pin<Box<dyn Future<Output = Result<(), DocumentError>> + Send + '_>>;
}

impl<T: DocumentIndex> DocumentIndexDyn for T {
    fn add_boxed<'a>(
        &'a self,
        chunks: &'a [DocumentChunk],
        embeddings: &'a [Vec<f32>],
    ) -> Pin<Box<dyn Future<Output = Result<(), DocumentError>> + Send + 'a>> {
        Box::pin(self.add(chunks, embeddings))
    }

    fn search_boxed<'a>(
        &'a self,
        embedding: &'a [f32],
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredChunk>, DocumentError>> + Send + 'a>> {
        Box::pin(self.search(embedding, limit))
    }

    fn count_boxed(&self) -> Pin<Box<dyn Future<Output = Result<usize, DocumentError>> + Send + '_>> {
        Box::pin(self.count())
    }

    fn reset_boxed(&self) -> Pin<Box<dyn Future<Output = Result<(), DocumentError>> + Send + '_>> {
        Box::pin(self.reset())
    }
}

/// Type-erased document index for runtime backend selection.
pub struct BoxDocumentIndex {
    inner: Box<dyn DocumentIndexDyn + Send + Sync>,
}

impl BoxDocumentIndex {
    pub fn new<T: DocumentIndex + 'static>(index: T) -> Self {
        Self {
            inner: Box::new(index),
        }
    }

    pub async fn add(
        &self,
        chunks: &[DocumentChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), DocumentError> {
        self.inner.add_boxed(chunks, embeddings).await
    }

    pub async fn search(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, DocumentError> {
        self.inner.search_boxed(embedding, limit).await
    }

    pub async fn count(&self) -> Result<usize, DocumentError> {
        self.inner.count_boxed().await
    }

    pub async fn reset(&self) -> Result<(), DocumentError> {
        self.inner.reset_boxed().await
    }
}
