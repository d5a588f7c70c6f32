use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::types::{Chunk, Document, DocumentMetadata};

/// Splits documents into bounded, overlapping chunks
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting invalid size/overlap combinations
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    /// Lazily chunk a single document
    #[must_use]
    pub fn chunks<'a>(&'a self, document: &'a Document) -> Chunks<'a> {
        self.chunks_str(&document.text, &document.metadata)
    }

    /// Lazily chunk raw text under the given metadata
    #[must_use]
    pub fn chunks_str<'a>(&'a self, text: &'a str, metadata: &'a DocumentMetadata) -> Chunks<'a> {
        Chunks {
            text,
            metadata,
            config: &self.config,
            start: 0,
            start_char: 0,
            ordinal: 0,
            done: text.is_empty(),
        }
    }

    /// Chunk a document set, preserving document order
    #[must_use]
    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents.iter().flat_map(|doc| self.chunks(doc)).collect();
        log::debug!(
            "Split {} document(s) into {} chunk(s)",
            documents.len(),
            chunks.len()
        );
        chunks
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Get statistics about chunking
    #[must_use]
    pub fn stats(chunks: &[Chunk]) -> ChunkingStats {
        let sizes: Vec<usize> = chunks.iter().map(Chunk::char_len).collect();
        let total_chars: usize = sizes.iter().sum();
        ChunkingStats {
            total_chunks: chunks.len(),
            total_chars,
            avg_chars_per_chunk: if sizes.is_empty() {
                0
            } else {
                total_chars / sizes.len()
            },
            min_chars: sizes.iter().copied().min().unwrap_or(0),
            max_chars: sizes.iter().copied().max().unwrap_or(0),
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }
}

/// Lazy chunk sequence over one document.
///
/// Each non-final chunk ends right after the last separator inside its
/// `chunk_size` window when that still leaves more than `chunk_overlap`
/// characters, otherwise at the window edge. The next chunk starts
/// `chunk_overlap` characters before the previous one ended.
pub struct Chunks<'a> {
    text: &'a str,
    metadata: &'a DocumentMetadata,
    config: &'a ChunkerConfig,
    start: usize,
    start_char: usize,
    ordinal: usize,
    done: bool,
}

impl Chunks<'_> {
    fn emit(&mut self, text: &str) -> Chunk {
        let chunk = Chunk {
            text: text.to_string(),
            metadata: self.metadata.clone(),
            ordinal: self.ordinal,
            char_offset: self.start_char,
        };
        self.ordinal += 1;
        chunk
    }

    fn cut(&self, window: &str) -> usize {
        let min_end = byte_offset_of_char(window, self.config.chunk_overlap + 1);
        let separator = self.config.separator.as_str();
        if separator.is_empty() {
            return window.len();
        }
        match window.rfind(separator) {
            Some(pos) if pos + separator.len() >= min_end => pos + separator.len(),
            _ => window.len(),
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }

        let text = self.text;
        let rest = &text[self.start..];
        let window_end = byte_offset_of_char(rest, self.config.chunk_size);
        if window_end == rest.len() {
            self.done = true;
            return Some(self.emit(rest));
        }

        let end = self.cut(&rest[..window_end]);
        let piece = &rest[..end];
        let chunk = self.emit(piece);

        let overlap = self.config.chunk_overlap;
        let overlap_start = if overlap == 0 {
            end
        } else {
            piece
                .char_indices()
                .rev()
                .nth(overlap - 1)
                .map_or(0, |(idx, _)| idx)
        };
        self.start += overlap_start;
        self.start_char += chunk.char_len() - overlap;

        Some(chunk)
    }
}

/// Byte offset just past the first `chars` characters of `text` (clamped)
fn byte_offset_of_char(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(idx, _)| idx)
}

/// Statistics about chunking results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub total_chars: usize,
    pub avg_chars_per_chunk: usize,
    pub min_chars: usize,
    pub max_chars: usize,
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Chars: {} | Avg: {} | Range: {}-{}",
            self.total_chunks,
            self.total_chars,
            self.avg_chars_per_chunk,
            self.min_chars,
            self.max_chars
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunker(size: usize, overlap: usize) -> Chunker {
        Chunker::new(ChunkerConfig::new(size, overlap)).unwrap()
    }

    fn texts(chunker: &Chunker, text: &str) -> Vec<String> {
        let meta = DocumentMetadata::new("cv.txt");
        chunker.chunks_str(text, &meta).map(|c| c.text).collect()
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Chunker::new(ChunkerConfig::new(5, 5)).is_err());
        assert!(Chunker::new(ChunkerConfig::new(0, 0)).is_err());
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        assert!(texts(&chunker(10, 2), "").is_empty());
    }

    #[test]
    fn test_short_document_single_chunk() {
        let chunks = texts(&chunker(100, 10), "Skilled in Python, Go, and Rust.");
        assert_eq!(chunks, vec!["Skilled in Python, Go, and Rust.".to_string()]);
    }

    #[test]
    fn test_exact_size_document_single_chunk() {
        assert_eq!(texts(&chunker(4, 1), "abcd"), vec!["abcd".to_string()]);
    }

    #[test]
    fn test_hard_cut_without_separator() {
        let chunks = texts(&chunker(4, 1), "abcdefghij");
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn test_prefers_separator_boundary() {
        let chunks = texts(&chunker(10, 2), "alpha\nbeta\ngamma");
        assert_eq!(chunks[0], "alpha\n");
        assert!(chunks[1].starts_with("a\n"));
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_separator_inside_overlap_is_ignored() {
        // A cut right after "a\n" would not advance past the overlap.
        let chunks = texts(&chunker(5, 3), "a\nbcdefgh");
        assert_eq!(chunks[0], "a\nbcd");
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        let text = "line one\nline two\nline three\nline four\nline five";
        let chunks = texts(&chunker(12, 3), text);
        for pair in chunks.windows(2) {
            let chars: Vec<char> = pair[0].chars().collect();
            let tail: String = chars[chars.len() - 3..].iter().collect();
            assert!(pair[1].starts_with(&tail), "{pair:?}");
        }
    }

    #[test]
    fn test_multibyte_text_counts_characters() {
        let text = "Résumé — développeur senior à Zürich";
        let chunks = texts(&chunker(8, 2), text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 8));
        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(2));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_chunk_positions_and_metadata() {
        let doc = Document::new("abcdefghij", DocumentMetadata::new("cv.pdf").with_page(2));
        let chunker = chunker(4, 1);
        let chunks: Vec<Chunk> = chunker.chunks(&doc).collect();
        assert_eq!(
            chunks.iter().map(|c| (c.ordinal, c.char_offset)).collect::<Vec<_>>(),
            vec![(0, 0), (1, 3), (2, 6)]
        );
        assert!(chunks.iter().all(|c| c.metadata == doc.metadata));
    }

    #[test]
    fn test_chunk_documents_flattens_in_order() {
        let docs = vec![
            Document::new("first doc", DocumentMetadata::new("a.txt")),
            Document::new("", DocumentMetadata::new("empty.txt")),
            Document::new("second doc", DocumentMetadata::new("b.txt")),
        ];
        let chunks = Chunker::default().chunk_documents(&docs);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.source, "a.txt");
        assert_eq!(chunks[1].metadata.source, "b.txt");
    }

    #[test]
    fn test_chunking_stats() {
        let doc = Document::new("abcdefghij", DocumentMetadata::default());
        let chunker = chunker(4, 1);
        let chunks: Vec<Chunk> = chunker.chunks(&doc).collect();
        let stats = Chunker::stats(&chunks);
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.total_chars, 12);
        assert_eq!(stats.min_chars, 4);
        assert_eq!(stats.max_chars, 4);
        assert_eq!(stats.to_string(), "Chunks: 3 | Chars: 12 | Avg: 4 | Range: 4-4");
    }
}
