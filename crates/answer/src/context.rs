use cvrag_vector_store::QueryResult;

/// Separator placed between rendered chunks
pub const CHUNK_DELIMITER: &str = "\n\n---\n\n";

/// Renders retrieved chunks into the context block of a prompt.
///
/// Each hit becomes `[Chunk {n} | {source} | page {page}]` followed by the
/// chunk text on the next line, numbered from 1 in ranking order. Missing
/// sources and pages render as `unknown`. Chunk text is copied verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    #[must_use]
    pub fn assemble(result: &QueryResult) -> String {
        result
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                format!(
                    "{}\n{}",
                    Self::header(i + 1, &hit.metadata.source, &hit.metadata.page_label()),
                    hit.text
                )
            })
            .collect::<Vec<_>>()
            .join(CHUNK_DELIMITER)
    }

    fn header(number: usize, source: &str, page: &str) -> String {
        format!("[Chunk {number} | {source} | page {page}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvrag_vector_store::{DocumentMetadata, ScoredRecord};
    use pretty_assertions::assert_eq;

    fn hit(id: u64, text: &str, metadata: DocumentMetadata) -> ScoredRecord {
        ScoredRecord {
            id,
            text: text.to_string(),
            metadata,
            score: 0.5,
        }
    }

    #[test]
    fn test_single_chunk_rendering() {
        let result = QueryResult {
            hits: vec![hit(
                0,
                "Skilled in Python, Go, and Rust.",
                DocumentMetadata::new("cv.pdf").with_page(2),
            )],
        };
        assert_eq!(
            ContextAssembler::assemble(&result),
            "[Chunk 1 | cv.pdf | page 2]\nSkilled in Python, Go, and Rust."
        );
    }

    #[test]
    fn test_blocks_numbered_in_rank_order_with_fallbacks() {
        let result = QueryResult {
            hits: vec![
                hit(7, "first  ", DocumentMetadata::new("cv.txt")),
                hit(3, "second", DocumentMetadata::default()),
            ],
        };
        assert_eq!(
            ContextAssembler::assemble(&result),
            "[Chunk 1 | cv.txt | page unknown]\nfirst  \n\n---\n\n[Chunk 2 | unknown | page unknown]\nsecond"
        );
    }

    #[test]
    fn test_empty_result_renders_empty_context() {
        assert_eq!(ContextAssembler::assemble(&QueryResult::default()), "");
    }
}
