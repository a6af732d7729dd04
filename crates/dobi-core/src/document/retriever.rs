//! Pre-built retriever bound to a store's embedder and index.

use std::sync::Arc;

use dobi_types::error::DocumentError;

use super::box_embedder::BoxEmbedder;
use super::index::BoxDocumentIndex;

/// Holds shared handles to the embedder and index plus a default `k`.
///
/// Produces the same ranked list as [`super::store::DocumentStore::query`]
/// for the same index state.
#[derive(Clone)]
pub struct DocumentRetriever {
    embedder: Arc<BoxEmbedder>,
    index: Arc<BoxDocumentIndex>,
    k: usize,
}

impl DocumentRetriever {
    pub fn new(embedder: Arc<BoxEmbedder>, index: Arc<BoxDocumentIndex>, k: usize) -> Self {
        Self { embedder, index, k }
    }

    pub async fn get_relevant_documents(&self, text: &str) -> Result<Vec<String>, DocumentError> {
        let embedding = self.embedder.embed_one(text).await?;
        let hits = self.index.search(&embedding, self.k).await?;
        Ok(hits.into_iter().map(|s| s.chunk.text).collect())
    }
}
