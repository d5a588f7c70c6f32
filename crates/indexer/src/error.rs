use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] cvrag_text_chunker::ChunkerError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] cvrag_vector_store::VectorStoreError),

    #[error("Invalid data directory: {0}")]
    InvalidPath(String),

    #[error("Unsupported document format: {}", .0.display())]
    UnsupportedDocumentFormat(PathBuf),

    #[error("Failed to read {}: {reason}", path.display())]
    DocumentRead { path: PathBuf, reason: String },

    #[error("{0}")]
    Other(String),
}
