//! LanceDB-backed document index.
//!
//! One table per collection (default `ka-bot`) under the persist directory.
//! Search uses cosine distance; similarity is reported as `1 - distance`.

use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use arrow_schema::{DataType, Field};
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use uuid::Uuid;

use dobi_core::document::index::DocumentIndex;
use dobi_types::document::{DocumentChunk, ScoredChunk};
use dobi_types::error::DocumentError;

use super::lance::LanceVectorStore;
use super::schema::{document_chunks_schema, vector_dimension};

pub struct LanceDocumentIndex {
    store: LanceVectorStore,
    collection: String,
    dimension: i32,
    embedding_model: String,
}

impl LanceDocumentIndex {
    /// Bind to `collection` inside `store`.
    ///
    /// Fails when an existing table was built with a different vector width,
    /// which happens after switching embedding backends without a reset.
    pub async fn open(
        store: LanceVectorStore,
        collection: &str,
        dimension: usize,
        embedding_model: &str,
    ) -> Result<Self, DocumentError> {
        let dimension = i32::try_from(dimension)
            .map_err(|_| DocumentError::Index(format!("dimension {dimension} out of range")))?;
        let index = Self {
            store,
            collection: collection.to_string(),
            dimension,
            embedding_model: embedding_model.to_string(),
        };

        let table = index.table().await?;
        let schema = table
            .schema()
            .await
            .map_err(|e| DocumentError::Index(format!("Failed to read table schema: {e}")))?;
        match vector_dimension(&schema) {
            Some(existing) if existing == dimension => {}
            Some(existing) => {
                return Err(DocumentError::Index(format!(
                    "collection '{collection}' stores {existing}-dim vectors but the embedder produces {dimension}; reset the collection"
                )));
            }
            None => {
                return Err(DocumentError::Index(format!(
                    "collection '{collection}' has no vector column"
                )));
            }
        }

        tracing::debug!(collection, dimension, path = %index.store.base_path().display(), "opened document index");
        Ok(index)
    }

    async fn table(&self) -> Result<lancedb::Table, DocumentError> {
        let schema = Arc::new(document_chunks_schema(self.dimension));
        self.store
            .ensure_table(&self.collection, schema)
            .await
            .map_err(|e| DocumentError::Index(format!("Failed to open collection table: {e}")))
    }

    fn build_record_batch(
        &self,
        chunks: &[DocumentChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<RecordBatch, DocumentError> {
        let schema = Arc::new(document_chunks_schema(self.dimension));

        let mut flat = Vec::with_capacity(embeddings.len() * self.dimension as usize);
        for embedding in embeddings {
            if embedding.len() != self.dimension as usize {
                return Err(DocumentError::Index(format!(
                    "embedding has {} dims, expected {}",
                    embedding.len(),
                    self.dimension
                )));
            }
            flat.extend_from_slice(embedding);
        }

        let ids = StringArray::from_iter_values(chunks.iter().map(|c| c.id.to_string()));
        let sources = StringArray::from_iter_values(chunks.iter().map(|c| c.source.as_str()));
        let indexes = Int32Array::from_iter_values(chunks.iter().map(|c| c.chunk_index as i32));
        let texts = StringArray::from_iter_values(chunks.iter().map(|c| c.text.as_str()));
        let models = StringArray::from_iter_values(chunks.iter().map(|_| self.embedding_model.as_str()));

        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let vectors = FixedSizeListArray::new(
            field,
            self.dimension,
            Arc::new(Float32Array::from(flat)),
            None,
        );

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(ids),
                Arc::new(sources),
                Arc::new(indexes),
                Arc::new(texts),
                Arc::new(models),
                Arc::new(vectors),
            ],
        )
        .map_err(|e| DocumentError::Index(format!("Failed to build record batch: {e}")))
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, DocumentError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| DocumentError::Index(format!("missing or mistyped column '{name}'")))
}

/// Turn search result rows into scored chunks.
fn record_batch_to_scored(batch: &RecordBatch) -> Result<Vec<ScoredChunk>, DocumentError> {
    if batch.num_rows() == 0 {
        return Ok(Vec::new());
    }

    let ids = string_column(batch, "id")?;
    let sources = string_column(batch, "source")?;
    let texts = string_column(batch, "text")?;
    let indexes = batch
        .column_by_name("chunk_index")
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .ok_or_else(|| DocumentError::Index("missing or mistyped column 'chunk_index'".into()))?;
    // Added by LanceDB vector search.
    let distances = batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

    let mut scored = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let id = Uuid::parse_str(ids.value(i))
            .map_err(|e| DocumentError::Index(format!("bad chunk id: {e}")))?;
        let distance = distances.map_or(0.0, |d| d.value(i));
        scored.push(ScoredChunk {
            chunk: DocumentChunk {
                id,
                source: sources.value(i).to_string(),
                chunk_index: indexes.value(i).max(0) as u32,
                text: texts.value(i).to_string(),
            },
            similarity: 1.0 - distance,
        });
    }
    Ok(scored)
}

impl DocumentIndex for LanceDocumentIndex {
    async fn add(&self, chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> Result<(), DocumentError> {
        if chunks.len() != embeddings.len() {
            return Err(DocumentError::Index(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        if chunks.is_empty() {
            return Ok(());
        }

        let table = self.table().await?;
        let batch = self.build_record_batch(chunks, embeddings)?;
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);

        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| DocumentError::Index(format!("Failed to add chunks: {e}")))?;

        tracing::debug!(collection = %self.collection, count = chunks.len(), "indexed chunks");
        Ok(())
    }

    async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>, DocumentError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let table = self.table().await?;
        let rows = table
            .count_rows(None)
            .await
            .map_err(|e| DocumentError::Index(format!("Failed to count rows: {e}")))?;
        if rows == 0 {
            return Ok(Vec::new());
        }

        let results = table
            .vector_search(embedding)
            .map_err(|e| DocumentError::Index(format!("Vector search setup failed: {e}")))?
            .distance_type(lancedb::DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| DocumentError::Index(format!("Vector search failed: {e}")))?;

        let batches: Vec<RecordBatch> = results
            .try_collect()
            .await
            .map_err(|e| DocumentError::Index(format!("Failed to collect results: {e}")))?;

        let mut scored = Vec::new();
        for batch in &batches {
            scored.extend(record_batch_to_scored(batch)?);
        }
        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize, DocumentError> {
        let table = self.table().await?;
        table
            .count_rows(None)
            .await
            .map_err(|e| DocumentError::Index(format!("Failed to count rows: {e}")))
    }

    async fn reset(&self) -> Result<(), DocumentError> {
        self.store
            .drop_table(&self.collection)
            .await
            .map_err(|e| DocumentError::Index(format!("Failed to drop collection: {e}")))?;
        tracing::info!(collection = %self.collection, "collection reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIM: usize = 4;

    fn chunk(source: &str, index: u32, text: &str) -> DocumentChunk {
        DocumentChunk {
            id: Uuid::now_v7(),
            source: source.to_string(),
            chunk_index: index,
            text: text.to_string(),
        }
    }

    async fn setup_index() -> (LanceDocumentIndex, tempfile::TempDir) {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = LanceVectorStore::new(temp_dir.path()).await.unwrap();
        let index = LanceDocumentIndex::open(store, "ka-bot", DIM, "test-model")
            .await
            .unwrap();
        (index, temp_dir)
    }

    #[tokio::test]
    async fn test_add_and_count() {
        let (index, _dir) = setup_index().await;
        let chunks = vec![chunk("a.txt", 0, "refund"), chunk("a.txt", 1, "login")];
        let embeddings = vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0, 0.0]];

        index.add(&chunks, &embeddings).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let (index, _dir) = setup_index().await;
        let chunks = vec![
            chunk("a.txt", 0, "far"),
            chunk("a.txt", 1, "near"),
            chunk("b.md", 0, "middle"),
        ];
        let embeddings = vec![
            vec![0.0, 0.0, 1.0, 0.0],
            vec![1.0, 0.05, 0.0, 0.0],
            vec![1.0, 1.0, 0.0, 0.0],
        ];
        index.add(&chunks, &embeddings).await.unwrap();

        let results = index.search(&[1.0, 0.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "near");
        assert_eq!(results[1].chunk.text, "middle");
        assert!(results[0].similarity > results[1].similarity);
        assert_eq!(results[0].chunk.id, chunks[1].id);
    }

    #[tokio::test]
    async fn test_search_empty_collection() {
        let (index, _dir) = setup_index().await;
        let results = index.search(&[1.0, 0.0, 0.0, 0.0], 4).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_reset_drops_everything() {
        let (index, _dir) = setup_index().await;
        index
            .add(&[chunk("a.txt", 0, "x")], &[vec![1.0, 0.0, 0.0, 0.0]])
            .await
            .unwrap();
        index.reset().await.unwrap();
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wrong_embedding_width_rejected() {
        let (index, _dir) = setup_index().await;
        let err = index
            .add(&[chunk("a.txt", 0, "x")], &[vec![1.0, 0.0]])
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Index(_)));
    }

    #[tokio::test]
    async fn test_reopen_with_other_dimension_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = LanceVectorStore::new(temp_dir.path()).await.unwrap();
        let _index = LanceDocumentIndex::open(store, "ka-bot", DIM, "m").await.unwrap();

        let store = LanceVectorStore::new(temp_dir.path()).await.unwrap();
        let result = LanceDocumentIndex::open(store, "ka-bot", 8, "m").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let store = LanceVectorStore::new(temp_dir.path()).await.unwrap();
            let index = LanceDocumentIndex::open(store, "ka-bot", DIM, "m").await.unwrap();
            index
                .add(&[chunk("a.txt", 0, "kept")], &[vec![0.0, 1.0, 0.0, 0.0]])
                .await
                .unwrap();
        }
        let store = LanceVectorStore::new(temp_dir.path()).await.unwrap();
        let index = LanceDocumentIndex::open(store, "ka-bot", DIM, "m").await.unwrap();
        assert_eq!(index.count().await.unwrap(), 1);
    }
}
