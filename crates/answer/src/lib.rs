//! # CV RAG Answer
//!
//! Grounded question answering over an indexed CV collection.
//!
//! ```text
//! question ──> Retriever (embed + top-k cosine)
//!          ──> ContextAssembler ("[Chunk n | source | page p]" blocks)
//!          ──> PromptBuilder (grounding policy + question)
//!          ──> Generator (Ollama or stub)
//!          ──> Answer { text, sources }
//! ```
//!
//! The policy tells the model to reply exactly [`NOT_FOUND_SENTINEL`] when
//! the context does not contain the answer; that reply is a normal answer,
//! not an error.

mod answerer;
mod context;
mod error;
mod generator;
mod prompt;
mod retriever;

pub use answerer::{Answer, Answerer, GenerationSettings, Source, SNIPPET_CHARS};
pub use context::{ContextAssembler, CHUNK_DELIMITER};
pub use error::{AnswerError, Result};
pub use generator::{GenerationRequest, Generator, OllamaGenerator, StubGenerator};
pub use prompt::{PromptBuilder, NOT_FOUND_SENTINEL};
pub use retriever::Retriever;
