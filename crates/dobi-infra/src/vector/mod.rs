//! LanceDB storage for document chunk embeddings.
//!
//! Arrow schemas define the table layout; `LanceDocumentIndex` implements
//! the core `DocumentIndex` trait on top of one collection table.

pub mod documents;
pub mod lance;
pub mod schema;

use dobi_core::document::index::BoxDocumentIndex;
use dobi_core::document::memory_index::InMemoryDocumentIndex;
use dobi_types::config::{DocumentsConfig, IndexBackend};
use dobi_types::error::DocumentError;

/// Open the index selected by `documents.index`.
///
/// `dimension` and `embedding_model` come from the active embedder.
pub async fn create_index(
    config: &DocumentsConfig,
    dimension: usize,
    embedding_model: &str,
) -> Result<BoxDocumentIndex, DocumentError> {
    match config.index {
        IndexBackend::Memory => Ok(BoxDocumentIndex::new(InMemoryDocumentIndex::new())),
        IndexBackend::Lance => {
            let store = lance::LanceVectorStore::new(&config.persist_dir)
                .await
                .map_err(|e| DocumentError::Index(format!("Failed to open vector store: {e}")))?;
            let index = documents::LanceDocumentIndex::open(
                store,
                &config.collection,
                dimension,
                embedding_model,
            )
            .await?;
            Ok(BoxDocumentIndex::new(index))
        }
    }
}
