//! # CV RAG Indexer
//!
//! Loads CV documents from a directory and ingests them into a
//! [`VectorIndex`](cvrag_vector_store::VectorIndex).
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> Document Loader (.txt, .pdf per page)
//!     │      └─> Documents
//!     │
//!     ├──> Chunker (size/overlap, separator aware)
//!     │      └─> Chunks
//!     │
//!     ├──> Embedder (bounded concurrency)
//!     │      └─> Embedded chunks, original order
//!     │
//!     └──> Vector Index (single atomic batch)
//!            └─> Ids
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cvrag_indexer::Ingestor;
//! use cvrag_text_chunker::Chunker;
//! use cvrag_vector_store::{StubEmbedder, VectorIndex};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let index = Arc::new(VectorIndex::open(".cv-rag/index", "cv_chunks").await?);
//!     let ingestor = Ingestor::new(Chunker::default(), Arc::new(StubEmbedder::default()), index);
//!     let report = ingestor.ingest_dir("data").await?;
//!
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

mod error;
mod loader;
mod pipeline;
mod report;

pub use error::{IndexerError, Result};
pub use loader::{DocumentFormat, DocumentLoader, LoadOutcome, SkippedFile};
pub use pipeline::{preview_dir, ChunkPreview, Ingestor, DEFAULT_INGEST_CONCURRENCY};
pub use report::IngestReport;
