//! DocumentStore -- loading, chunking, embedding, and querying documents.
//!
//! Wires together the loader, a [`Chunker`], a [`BoxEmbedder`], and a
//! [`BoxDocumentIndex`]. Loading never aborts on a single bad file: failures
//! are logged and accumulated in the returned [`LoadReport`].

use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use dobi_types::document::{
    DocumentChunk, FileFailure, FileKind, LoadReport, LoadedFile, RetrievalMode, ScoredChunk,
};
use dobi_types::error::DocumentError;

use super::box_embedder::BoxEmbedder;
use super::chunker::Chunker;
use super::index::BoxDocumentIndex;
use super::loader;
use super::retriever::DocumentRetriever;

pub struct DocumentStore {
    embedder: Arc<BoxEmbedder>,
    index: Arc<BoxDocumentIndex>,
    chunker: Arc<dyn Chunker>,
    extensions: Vec<String>,
    collection: String,
}

impl DocumentStore {
    pub fn new(
        embedder: Arc<BoxEmbedder>,
        index: Arc<BoxDocumentIndex>,
        chunker: Arc<dyn Chunker>,
        extensions: Vec<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            index,
            chunker,
            extensions,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Walk `dir` recursively and index every supported file.
    ///
    /// Only a missing or unreadable root directory is an error; everything
    /// else is reported per file.
    #[tracing::instrument(skip(self), fields(collection = %self.collection))]
    pub async fn load(&self, dir: &Path) -> Result<LoadReport, DocumentError> {
        let (files, mut failed) = loader::discover(dir)?;
        let mut report = LoadReport {
            loaded: Vec::new(),
            failed: Vec::new(),
        };

        for path in files {
            match self.load_file(&path).await {
                Ok((kind, chunks)) => {
                    tracing::debug!(path = %path.display(), chunks, "loaded document");
                    report.loaded.push(LoadedFile { path, kind, chunks });
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load document");
                    failed.push(FileFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.failed = failed;
        tracing::info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            chunks = report.total_chunks(),
            "document load finished"
        );
        Ok(report)
    }

    async fn load_file(&self, path: &Path) -> Result<(FileKind, usize), DocumentError> {
        let kind = loader::classify(path, &self.extensions)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DocumentError::Io(e.to_string()))?;
        let text = loader::extract_text(kind, bytes)?;

        let pieces = self.chunker.split(&text, kind);
        if pieces.is_empty() {
            return Ok((kind, 0));
        }

        let embeddings = self.embedder.embed(&pieces).await?;
        if embeddings.len() != pieces.len() {
            return Err(DocumentError::Embedding(format!(
                "expected {} vectors, got {}",
                pieces.len(),
                embeddings.len()
            )));
        }

        let source = path.display().to_string();
        let chunks: Vec<DocumentChunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, text)| DocumentChunk {
                id: Uuid::now_v7(),
                source: source.clone(),
                chunk_index: i as u32,
                text,
            })
            .collect();

        self.index.add(&chunks, &embeddings).await?;
        Ok((kind, chunks.len()))
    }

    /// Top-k chunk texts by direct similarity search.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<String>, DocumentError> {
        Ok(self
            .search(text, k)
            .await?
            .into_iter()
            .map(|s| s.chunk.text)
            .collect())
    }

    /// Top-k chunks with their similarity scores.
    pub async fn search(&self, text: &str, k: usize) -> Result<Vec<ScoredChunk>, DocumentError> {
        let embedding = self.embedder.embed_one(text).await?;
        self.index.search(&embedding, k).await
    }

    /// A retriever bound to this store's embedder and index with a default k.
    pub fn as_retriever(&self, k: usize) -> DocumentRetriever {
        DocumentRetriever::new(Arc::clone(&self.embedder), Arc::clone(&self.index), k)
    }

    /// Query through either retrieval path. Both return the same ranking.
    pub async fn query_with_mode(
        &self,
        text: &str,
        k: usize,
        mode: RetrievalMode,
    ) -> Result<Vec<String>, DocumentError> {
        match mode {
            RetrievalMode::Similarity => self.query(text, k).await,
            RetrievalMode::Retriever => self.as_retriever(k).get_relevant_documents(text).await,
        }
    }

    pub async fn count(&self) -> Result<usize, DocumentError> {
        self.index.count().await
    }

    /// Drop every chunk in the collection.
    pub async fn reset(&self) -> Result<(), DocumentError> {
        tracing::info!(collection = %self.collection, "resetting document collection");
        self.index.reset().await
    }
}
