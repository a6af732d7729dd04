//! Document chunking.
//!
//! [`FixedWindowChunker`] is an exact character sliding window: every chunk
//! is at most `size` chars and shares exactly `overlap` chars with its
//! predecessor. The boundary-aware splitter lives in dobi-infra.

use dobi_types::document::FileKind;
use dobi_types::error::DocumentError;

/// Splits loaded document text into retrieval chunks.
pub trait Chunker: Send + Sync {
    fn split(&self, text: &str, kind: FileKind) -> Vec<String>;
}

/// Reject chunk configs that cannot make progress.
pub fn validate_chunk_config(size: usize, overlap: usize) -> Result<(), DocumentError> {
    if size == 0 || overlap >= size {
        return Err(DocumentError::InvalidChunkConfig { size, overlap });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct FixedWindowChunker {
    size: usize,
    overlap: usize,
}

impl FixedWindowChunker {
    pub fn new(size: usize, overlap: usize) -> Result<Self, DocumentError> {
        validate_chunk_config(size, overlap)?;
        Ok(Self { size, overlap })
    }
}

impl Chunker for FixedWindowChunker {
    fn split(&self, text: &str, _kind: FileKind) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let step = self.size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}
