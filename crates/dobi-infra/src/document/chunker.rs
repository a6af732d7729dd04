//! Boundary-aware chunker.
//!
//! Markdown uses `MarkdownSplitter` so headings and list items stay with
//! their content; everything else goes through `TextSplitter`, which prefers
//! paragraph, then sentence, then word boundaries. Sizes are in characters.

use text_splitter::{ChunkConfig, MarkdownSplitter, TextSplitter};

use dobi_core::document::chunker::{Chunker, validate_chunk_config};
use dobi_types::document::FileKind;
use dobi_types::error::DocumentError;

pub struct SemanticChunker {
    text: TextSplitter<text_splitter::Characters>,
    markdown: MarkdownSplitter<text_splitter::Characters>,
}

impl SemanticChunker {
    pub fn new(size: usize, overlap: usize) -> Result<Self, DocumentError> {
        validate_chunk_config(size, overlap)?;
        let config = || {
            ChunkConfig::new(size)
                .with_overlap(overlap)
                .map_err(|_| DocumentError::InvalidChunkConfig { size, overlap })
        };
        Ok(Self {
            text: TextSplitter::new(config()?),
            markdown: MarkdownSplitter::new(config()?),
        })
    }
}

impl Chunker for SemanticChunker {
    fn split(&self, text: &str, kind: FileKind) -> Vec<String> {
        let chunks: Vec<String> = match kind {
            FileKind::Markdown => self.markdown.chunks(text).map(str::to_string).collect(),
            FileKind::Text | FileKind::Notebook => {
                self.text.chunks(text).map(str::to_string).collect()
            }
        };
        chunks.into_iter().filter(|c| !c.trim().is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_respect_size() {
        let chunker = SemanticChunker::new(50, 10).unwrap();
        let text = "카카오 로그인은 OAuth 2.0 기반입니다. ".repeat(20);
        let chunks = chunker.split(&text, FileKind::Text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 50));
    }

    #[test]
    fn test_markdown_prefers_heading_boundaries() {
        let chunker = SemanticChunker::new(60, 0).unwrap();
        let text = "# 환불\n\n환불은 결제 후 7일 이내 가능합니다.\n\n# 로그인\n\n카카오 계정으로 로그인합니다.";
        let chunks = chunker.split(text, FileKind::Markdown);
        assert!(chunks.iter().any(|c| c.starts_with("# 환불")));
        assert!(chunks.iter().any(|c| c.starts_with("# 로그인")));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let chunker = SemanticChunker::new(100, 20).unwrap();
        assert!(chunker.split("", FileKind::Text).is_empty());
        assert!(chunker.split("   \n\n ", FileKind::Markdown).is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            SemanticChunker::new(10, 10),
            Err(DocumentError::InvalidChunkConfig { size: 10, overlap: 10 })
        ));
    }
}
