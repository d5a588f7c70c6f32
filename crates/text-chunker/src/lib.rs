//! # CV-RAG Text Chunker
//!
//! Splits document text into bounded, overlapping chunks for embedding.
//!
//! ## Guarantees
//!
//! - Every chunk holds at most `chunk_size` characters
//! - Consecutive chunks share exactly `chunk_overlap` characters
//! - Dropping the overlap prefix of every chunk but the first and
//!   concatenating rebuilds the document text exactly
//! - Cuts land right after the configured separator whenever possible
//!
//! ## Pipeline
//!
//! ```text
//! Reader metadata ──> DocumentMetadata::from_raw (normalize once)
//!                          │
//! Document text ───────────┴──> Chunker::chunks (lazy) ──> Chunk[]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cvrag_text_chunker::{Chunker, ChunkerConfig, Document, DocumentMetadata};
//!
//! let chunker = Chunker::new(ChunkerConfig::new(40, 8)).unwrap();
//! let doc = Document::new(
//!     "Senior engineer.\nSkilled in Python, Go, and Rust.\nBased in Berlin.",
//!     DocumentMetadata::new("cv.txt"),
//! );
//!
//! for chunk in chunker.chunks(&doc) {
//!     println!("#{} @{}: {:?}", chunk.ordinal, chunk.char_offset, chunk.text);
//! }
//! ```

mod chunker;
mod config;
mod error;
mod types;

pub use chunker::{Chunker, Chunks, ChunkingStats};
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use types::{Chunk, Document, DocumentMetadata, UNKNOWN};
