use cvrag_text_chunker::{Chunk, DocumentMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A chunk paired with its embedding vector, ready for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

impl EmbeddedChunk {
    #[must_use]
    pub const fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self { chunk, vector }
    }
}

/// A persisted chunk. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: u64,
    pub text: String,
    pub metadata: DocumentMetadata,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: u64,
    pub text: String,
    pub metadata: DocumentMetadata,
    /// Cosine similarity to the query vector
    pub score: f32,
}

/// Hits ranked by descending similarity, ties in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub hits: Vec<ScoredRecord>,
}

impl QueryResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredRecord> {
        self.hits.iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a ScoredRecord;
    type IntoIter = std::slice::Iter<'a, ScoredRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

/// Summary of a collection's contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub collection: String,
    pub records: usize,
    pub dimension: Option<usize>,
    pub next_id: u64,
    /// Record count per source
    pub sources: BTreeMap<String, usize>,
}
