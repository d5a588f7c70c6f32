use crate::error::{AnswerError, Result};
use cvrag_vector_store::{Embedder, QueryResult, VectorIndex};
use std::sync::Arc;

/// Embeds a question and fetches the most similar chunks
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>) -> Self {
        Self { embedder, index }
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    pub async fn retrieve(&self, query_text: &str, top_k: usize) -> Result<QueryResult> {
        if top_k == 0 {
            return Err(AnswerError::invalid_argument("top_k must be >= 1"));
        }
        if query_text.trim().is_empty() {
            return Err(AnswerError::invalid_argument("question must not be empty"));
        }

        let vector = self.embedder.embed(query_text).await?;
        let result = self.index.query(&vector, top_k).await?;
        log::debug!(
            "Retrieved {} chunk(s) from '{}' (top_k {top_k})",
            result.len(),
            self.index.collection()
        );
        Ok(result)
    }
}
