//! BoxEmbedder -- object-safe dynamic dispatch wrapper for Embedder.
//!
//! Follows the same blanket-impl pattern as BoxLlmProvider.

use std::future::Future;
use std::pin::Pin;

use dobi_types::error::DocumentError;

use super::embedder::Embedder;

/// Object-safe version of [`Embedder`] with boxed futures.
pub trait EmbedderDyn: Send + Sync {
    fn embed_boxed<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, DocumentError>> + Send + 'a>>;

    fn model_name_dyn(&self) -> &str;

    fn dimension_dyn(&self) -> usize;
}

impl<T: Embedder> EmbedderDyn for T {
    fn embed_boxed<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, DocumentError>> + Send + 'a>> {
        Box::pin(self.embed(texts))
    }

    fn model_name_dyn(&self) -> &str {
        self.model_name()
    }

    fn dimension_dyn(&self) -> usize {
        self.dimension()
    }
}

/// Type-erased embedder for runtime backend selection (OpenAI or fastembed).
pub struct BoxEmbedder {
    inner: Box<dyn EmbedderDyn + Send + Sync>,
}

impl BoxEmbedder {
    /// Wrap a concrete `Embedder` in a type-erased box.
    pub fn new<T: Embedder + 'static>(embedder: T) -> Self {
        Self {
            inner: Box::new(embedder),
        }
    }

    /// Embed one or more texts into vectors.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DocumentError> {
        self.inner.embed_boxed(texts).await
    }

    /// Embed a single text.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, DocumentError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| DocumentError::Embedding("embedder returned no vector".to_string()))
    }

    pub fn model_name(&self) -> &str {
        self.inner.model_name_dyn()
    }

    pub fn dimension(&self) -> usize {
        self.inner.dimension_dyn()
    }
}
