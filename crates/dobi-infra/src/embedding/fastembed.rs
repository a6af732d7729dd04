//! Local embedding generation with fastembed (BGE-small-en-v1.5, 384 dims).
//!
//! The ONNX model is CPU-bound and needs `&mut self`, so it lives behind a
//! mutex and every call runs on the blocking thread pool.

use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use dobi_core::document::embedder::Embedder;
use dobi_types::error::DocumentError;

/// Output dimension of BGE-small-en-v1.5.
pub const FASTEMBED_DIMENSION: usize = 384;

const MODEL_NAME: &str = "BAAI/bge-small-en-v1.5";

/// Texts per inference call.
const BATCH_SIZE: usize = 32;

pub struct FastEmbedEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl FastEmbedEmbedder {
    /// Load (downloading on first use) the model on a blocking thread.
    pub async fn new() -> Result<Self, DocumentError> {
        let model = tokio::task::spawn_blocking(|| {
            tracing::info!(model = MODEL_NAME, "loading local embedding model");
            TextEmbedding::try_new(InitOptions::new(EmbeddingModel::BGESmallENV15))
                .map_err(|e| DocumentError::Embedding(format!("failed to load {MODEL_NAME}: {e}")))
        })
        .await
        .map_err(|e| DocumentError::Embedding(format!("model loader task failed: {e}")))??;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

impl Embedder for FastEmbedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DocumentError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            let batch = batch.to_vec();
            let model = Arc::clone(&self.model);
            let vectors = tokio::task::spawn_blocking(move || {
                let mut guard = model
                    .lock()
                    .map_err(|_| DocumentError::Embedding("embedding model lock poisoned".to_string()))?;
                guard
                    .embed(batch, None)
                    .map_err(|e| DocumentError::Embedding(e.to_string()))
            })
            .await
            .map_err(|e| DocumentError::Embedding(format!("embedding task failed: {e}")))??;
            all.extend(vectors);
        }

        tracing::debug!(count = all.len(), "generated local embeddings");
        Ok(all)
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimension(&self) -> usize {
        FASTEMBED_DIMENSION
    }
}
