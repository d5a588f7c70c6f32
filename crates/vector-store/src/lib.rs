//! # CV-RAG Vector Store
//!
//! Embedding backends and a durable vector index for document chunks.
//!
//! ## Features
//!
//! - **Pluggable embeddings** behind the [`Embedder`] trait (Ollama HTTP, offline stub)
//! - **Exact cosine search** with deterministic tie-breaking (insertion order)
//! - **Persistent collections** stored as JSON, committed atomically per batch
//! - **Scoped handles**: one exclusive writer per collection, any number of read-only snapshots
//!
//! ## Architecture
//!
//! ```text
//! Chunk[]
//!     │
//!     ├──> Embedder (Ollama / stub)
//!     │      └─> Vec<f32> (model-defined dimension)
//!     │
//!     └──> VectorIndex::insert
//!            ├─> dimension check
//!            ├─> sequential ids
//!            └─> <root>/<collection>/index.json
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use cvrag_vector_store::{Embedder, EmbeddedChunk, StubEmbedder, VectorIndex};
//! use cvrag_text_chunker::{Chunker, Document, DocumentMetadata};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let index = VectorIndex::open(".cv-rag/index", "cv_chunks").await?;
//!     let embedder = StubEmbedder::default();
//!
//!     let doc = Document::new("Skilled in Python, Go, and Rust.", DocumentMetadata::new("cv.txt"));
//!     let mut batch = Vec::new();
//!     for chunk in Chunker::default().chunks(&doc) {
//!         let vector = embedder.embed(&chunk.text).await?;
//!         batch.push(EmbeddedChunk::new(chunk, vector));
//!     }
//!     index.insert(batch).await?;
//!
//!     let query = embedder.embed("Which languages?").await?;
//!     for hit in &index.query(&query, 4).await? {
//!         println!("{} {:.3} {}", hit.id, hit.score, hit.text);
//!     }
//!
//!     index.close()?;
//!     Ok(())
//! }
//! ```

mod embeddings;
mod error;
mod lock;
mod paths;
mod similarity;
mod store;
mod types;

pub use embeddings::{Embedder, OllamaEmbedder, StubEmbedder, DEFAULT_STUB_DIMENSION};
pub use error::{Result, VectorStoreError};
pub use paths::{collection_dir, DEFAULT_INDEX_DIR};
pub use similarity::cosine_similarity;
pub use store::{VectorIndex, INDEX_SCHEMA_VERSION};
pub use types::{CollectionStats, EmbeddedChunk, IndexRecord, QueryResult, ScoredRecord};

// Re-export chunker types for convenience
pub use cvrag_text_chunker::{Chunk, DocumentMetadata};
