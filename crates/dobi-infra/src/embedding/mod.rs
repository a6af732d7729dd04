//! Embedding backends: OpenAI HTTP embeddings and local fastembed inference.

pub mod fastembed;
pub mod openai;

use secrecy::SecretString;

use dobi_core::document::box_embedder::BoxEmbedder;
use dobi_types::config::{EmbeddingBackend, EmbeddingConfig};
use dobi_types::error::{CredentialError, DocumentError};

/// Errors building an embedder at startup.
#[derive(Debug, thiserror::Error)]
pub enum EmbedderInitError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Build the embedder selected by `[embedding]`.
///
/// `api_key` is only required by the OpenAI backend.
pub async fn create_embedder(
    config: &EmbeddingConfig,
    api_key: Option<SecretString>,
) -> Result<BoxEmbedder, EmbedderInitError> {
    match config.backend {
        EmbeddingBackend::OpenAi => {
            let key = api_key
                .ok_or_else(|| CredentialError::Missing(crate::secret::OPENAI_API_KEY.to_string()))?;
            let embedder = openai::OpenAiEmbedder::new(&config.base_url, key, &config.model)?;
            Ok(BoxEmbedder::new(embedder))
        }
        EmbeddingBackend::FastEmbed => {
            let embedder = fastembed::FastEmbedEmbedder::new().await?;
            Ok(BoxEmbedder::new(embedder))
        }
    }
}
