use crate::context::ContextAssembler;
use crate::error::Result;
use crate::generator::{GenerationRequest, Generator};
use crate::prompt::PromptBuilder;
use crate::retriever::Retriever;
use cvrag_vector_store::ScoredRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Characters of chunk text kept in a source snippet
pub const SNIPPET_CHARS: usize = 240;

/// Model settings applied to every generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
}

impl GenerationSettings {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }
}

/// A retrieved chunk the answer was grounded on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: u64,
    pub source: String,
    pub page: Option<u32>,
    pub score: f32,
    pub snippet: String,
}

impl From<&ScoredRecord> for Source {
    fn from(hit: &ScoredRecord) -> Self {
        Self {
            id: hit.id,
            source: hit.metadata.source.clone(),
            page: hit.metadata.page,
            score: hit.score,
            snippet: snippet(&hit.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub text: String,
    /// Retrieved chunks in ranking order
    pub sources: Vec<Source>,
}

/// Retrieval, prompt assembly and generation for one question
pub struct Answerer {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    settings: GenerationSettings,
}

impl Answerer {
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn Generator>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            retriever,
            generator,
            settings,
        }
    }

    pub async fn answer(&self, question: &str, top_k: usize) -> Result<Answer> {
        log::info!("Answering question with top_k {top_k}");

        let result = self.retriever.retrieve(question, top_k).await?;
        if result.is_empty() {
            log::warn!(
                "Collection '{}' is empty; answering from an empty context",
                self.retriever.index().collection()
            );
        }

        let context = ContextAssembler::assemble(&result);
        let prompt = PromptBuilder::build(question, &context);
        let request = GenerationRequest {
            model: &self.settings.model,
            prompt: &prompt,
            temperature: self.settings.temperature,
        };
        let text = self.generator.generate(&request).await?;

        Ok(Answer {
            question: question.to_string(),
            text: text.trim().to_string(),
            sources: result.iter().map(Source::from).collect(),
        })
    }
}

fn snippet(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
