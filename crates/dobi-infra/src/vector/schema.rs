//! Arrow schema for document chunk tables.
//!
//! The vector width depends on the configured embedder (1536 for
//! text-embedding-3-small, 384 for BGE-small), so it is a parameter.
//!
//! Arrow versions MUST match lancedb's transitive dependency (57.3 for lancedb 0.26).

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};

/// Name of the embedding column.
pub const VECTOR_COLUMN: &str = "vector";

/// Schema for one document collection.
pub fn document_chunks_schema(dimension: i32) -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("chunk_index", DataType::Int32, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("embedding_model", DataType::Utf8, false),
        Field::new(
            VECTOR_COLUMN,
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                dimension,
            ),
            false,
        ),
    ])
}

/// Vector width recorded in an existing table's schema, if it has one.
pub fn vector_dimension(schema: &Schema) -> Option<i32> {
    match schema.field_with_name(VECTOR_COLUMN).ok()?.data_type() {
        DataType::FixedSizeList(_, size) => Some(*size),
        _ => None,
    }
}
