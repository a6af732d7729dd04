//! Embedder trait for text-to-vector conversion.
//!
//! Implementations (OpenAI embeddings, local fastembed model) live in dobi-infra.

use dobi_types::error::DocumentError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait Embedder: Send + Sync {
    /// Embed one or more texts into vectors.
    ///
    /// Returns one vector per input text, in input order.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, DocumentError>> + Send;

    /// The model name used for embeddings (e.g., "text-embedding-3-small").
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}
