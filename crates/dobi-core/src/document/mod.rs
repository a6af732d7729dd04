//! Document store: loading, chunking, embedding, and similarity retrieval.

pub mod box_embedder;
pub mod chunker;
pub mod embedder;
pub mod index;
pub mod loader;
pub mod memory_index;
pub mod retriever;
pub mod store;
