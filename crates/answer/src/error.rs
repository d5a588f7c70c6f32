use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnswerError>;

#[derive(Error, Debug)]
pub enum AnswerError {
    #[error("Vector store error: {0}")]
    VectorStore(#[from] cvrag_vector_store::VectorStoreError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Generation service error: {0}")]
    GenerationService(String),
}

impl AnswerError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn generation_service(message: impl Into<String>) -> Self {
        Self::GenerationService(message.into())
    }
}
