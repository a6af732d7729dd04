//! OpenAI embeddings over HTTP (`POST {base_url}/embeddings`).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use dobi_core::document::embedder::Embedder;
use dobi_types::error::DocumentError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Known output dimensions; unknown models are assumed to match
/// text-embedding-3-small.
pub fn dimension_for(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => 1536,
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Does NOT derive Debug: holds the API key.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(base_url: &str, api_key: SecretString, model: &str) -> Result<Self, DocumentError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DocumentError::Embedding(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
            dimension: dimension_for(model),
        })
    }
}

impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DocumentError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| DocumentError::Embedding(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocumentError::Embedding(format!(
                "embeddings endpoint returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| DocumentError::Embedding(format!("invalid response: {e}")))?;

        order_by_index(parsed.data, texts.len())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// The API may return items out of order; restore input order.
fn order_by_index(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>, DocumentError> {
    if data.len() != expected {
        return Err(DocumentError::Embedding(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}
