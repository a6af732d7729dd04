//! Document chunking backed by `text-splitter`.

pub mod chunker;

use std::sync::Arc;

use dobi_core::document::chunker::{Chunker, FixedWindowChunker};
use dobi_types::config::DocumentsConfig;
use dobi_types::document::ChunkStrategy;
use dobi_types::error::DocumentError;

/// Build the chunker selected by `documents.strategy`.
pub fn create_chunker(config: &DocumentsConfig) -> Result<Arc<dyn Chunker>, DocumentError> {
    Ok(match config.strategy {
        ChunkStrategy::Fixed => Arc::new(FixedWindowChunker::new(config.chunk_size, config.chunk_overlap)?),
        ChunkStrategy::Semantic => Arc::new(chunker::SemanticChunker::new(
            config.chunk_size,
            config.chunk_overlap,
        )?),
    })
}
