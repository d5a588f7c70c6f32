use cvrag_answer::{Answer, AnswerError};
use cvrag_indexer::{ChunkPreview, IndexerError, IngestReport, SkippedFile};
use cvrag_protocol::ErrorEnvelope;
use cvrag_vector_store::{CollectionStats, VectorStoreError};
use serde_json::{json, Value};
use std::fmt::Write;

pub fn ingest_report(report: &IngestReport) -> String {
    let mut out = String::new();
    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    skipped_files(&mut out, &report.skipped);
    let _ = write!(out, "{}", report.summary());
    out
}

pub fn answer(answer: &Answer) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== ANSWER ===\n{}\n", answer.text);
    let _ = write!(out, "=== SOURCES ===");
    if answer.sources.is_empty() {
        let _ = write!(out, "\n(none)");
    }
    for (i, source) in answer.sources.iter().enumerate() {
        let page = source
            .page
            .map_or_else(|| "unknown".to_string(), |p| p.to_string());
        let _ = write!(
            out,
            "\n[{}] {} | page {} | id {} | score {:.3}\n    {}",
            i + 1,
            source.source,
            page,
            source.id,
            source.score,
            source.snippet.replace('\n', " ")
        );
    }
    out
}

pub fn chunk_preview(preview: &ChunkPreview) -> String {
    let mut out = String::new();
    skipped_files(&mut out, &preview.outcome.skipped);
    let _ = writeln!(
        out,
        "Loaded {} docs, split into {} chunks.",
        preview.outcome.documents.len(),
        preview.chunks.len()
    );
    let _ = write!(out, "{}", preview.stats);
    out
}

pub fn chunk_preview_json(preview: &ChunkPreview) -> Value {
    json!({
        "files": preview.outcome.files,
        "documents": preview.outcome.documents.len(),
        "chunks": preview.chunks.len(),
        "total_chars": preview.stats.total_chars,
        "avg_chars_per_chunk": preview.stats.avg_chars_per_chunk,
        "min_chars": preview.stats.min_chars,
        "max_chars": preview.stats.max_chars,
        "skipped": preview.outcome.skipped,
    })
}

pub fn collection_stats(stats: &CollectionStats) -> String {
    let mut out = String::new();
    let dimension = stats
        .dimension
        .map_or_else(|| "-".to_string(), |d| d.to_string());
    let _ = write!(
        out,
        "Collection: {}\nRecords: {}\nDimension: {}\nNext id: {}",
        stats.collection, stats.records, dimension, stats.next_id
    );
    for (source, count) in &stats.sources {
        let _ = write!(out, "\n  {source}: {count}");
    }
    out
}

fn skipped_files(out: &mut String, skipped: &[SkippedFile]) {
    for file in skipped {
        let _ = writeln!(out, "skipped {}: {}", file.path.display(), file.reason);
    }
}

/// Map an error chain onto a stable machine-readable code
pub fn error_envelope(err: &anyhow::Error) -> ErrorEnvelope {
    let (code, hint) = classify(err);
    ErrorEnvelope {
        code: code.to_string(),
        message: format!("{err:#}"),
        hint: hint.map(ToString::to_string),
    }
}

fn classify(err: &anyhow::Error) -> (&'static str, Option<&'static str>) {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<AnswerError>() {
            return match e {
                AnswerError::InvalidArgument(_) => ("invalid_argument", None),
                AnswerError::GenerationService(_) => (
                    "generation_service",
                    Some("Is Ollama running and is the generation model pulled?"),
                ),
                AnswerError::VectorStore(inner) => classify_store(inner),
            };
        }
        if let Some(e) = cause.downcast_ref::<IndexerError>() {
            return match e {
                IndexerError::VectorStoreError(inner) => classify_store(inner),
                IndexerError::InvalidPath(_) => {
                    ("invalid_path", Some("Point --data-dir at a directory of CV files"))
                }
                _ => ("ingest_failed", None),
            };
        }
        if let Some(e) = cause.downcast_ref::<VectorStoreError>() {
            return classify_store(e);
        }
    }
    if err.chain().any(|cause| cause.to_string().contains("Invalid configuration")) {
        return ("invalid_config", None);
    }
    ("internal", None)
}

fn classify_store(err: &VectorStoreError) -> (&'static str, Option<&'static str>) {
    match err {
        VectorStoreError::EmbeddingService(_) => (
            "embedding_service",
            Some("Is Ollama running and is the embedding model pulled?"),
        ),
        VectorStoreError::DimensionMismatch { .. } => (
            "dimension_mismatch",
            Some("The collection was built with a different embedding model; re-index into a new collection"),
        ),
        VectorStoreError::InvalidArgument(_) => ("invalid_argument", None),
        VectorStoreError::Locked(_) => (
            "index_locked",
            Some("Another cv-rag process holds this collection"),
        ),
        VectorStoreError::Corrupt(_) | VectorStoreError::SerializationError(_) => (
            "index_corrupt",
            Some("Delete the collection directory and re-index"),
        ),
        VectorStoreError::IoError(_) => ("io", None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use cvrag_answer::Source;

    #[test]
    fn classifies_wrapped_errors() {
        let err = Err::<(), _>(AnswerError::invalid_argument("top_k must be >= 1"))
            .context("ask failed")
            .unwrap_err();
        let envelope = error_envelope(&err);
        assert_eq!(envelope.code, "invalid_argument");
        assert!(envelope.message.contains("top_k"));

        let err = anyhow::Error::new(VectorStoreError::DimensionMismatch {
            expected: 768,
            actual: 384,
        });
        assert_eq!(error_envelope(&err).code, "dimension_mismatch");

        let err = anyhow::anyhow!("boom");
        assert_eq!(error_envelope(&err).code, "internal");
    }

    #[test]
    fn answer_lists_sources_after_text() {
        let rendered = answer(&Answer {
            question: "What languages do I know?".to_string(),
            text: "- Rust".to_string(),
            sources: vec![Source {
                id: 4,
                source: "cv.pdf".to_string(),
                page: Some(2),
                score: 0.5,
                snippet: "Skilled in\nRust".to_string(),
            }],
        });
        assert_eq!(
            rendered,
            "=== ANSWER ===\n- Rust\n\n=== SOURCES ===\n[1] cv.pdf | page 2 | id 4 | score 0.500\n    Skilled in Rust"
        );
    }
}
