/// Exact reply the model is told to give when the context lacks the answer
pub const NOT_FOUND_SENTINEL: &str = "Not found in CV";

const POLICY: &str = "You are an assistant answering questions strictly using the CONTEXT provided below,
which is extracted from a CV/resume.

RULES:
- Only use the information in the CONTEXT.
- If the answer is not explicitly present, reply exactly with: \"Not found in CV\".
- Do NOT use outside knowledge.
- Do NOT guess or assume details.
- Prefer bullet points for lists (skills, tools, roles).
- When possible, cite the chunk number and source.";

const CONTEXT_MARKER: &str = "\n\nCONTEXT:\n";
const QUESTION_MARKER: &str = "\n\nQuestion: ";

/// Wraps an assembled context and a question in the grounding policy
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    #[must_use]
    pub fn build(question: &str, context: &str) -> String {
        format!("{POLICY}{CONTEXT_MARKER}{context}{QUESTION_MARKER}{question}\n\nAnswer:")
    }

    /// Context block of a prompt produced by [`PromptBuilder::build`]
    #[must_use]
    pub fn context_of(prompt: &str) -> Option<&str> {
        let start = prompt.find(CONTEXT_MARKER)? + CONTEXT_MARKER.len();
        let rest = &prompt[start..];
        let end = rest.rfind(QUESTION_MARKER)?;
        Some(&rest[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_names_sentinel() {
        let prompt = PromptBuilder::build("Where do I live?", "");
        assert!(prompt.contains(&format!("\"{NOT_FOUND_SENTINEL}\"")));
        assert!(prompt.contains("Do NOT use outside knowledge."));
        assert!(prompt.ends_with("Question: Where do I live?\n\nAnswer:"));
    }

    #[test]
    fn test_context_precedes_question() {
        let block = "[Chunk 1 | cv.pdf | page 2]\nSkilled in Python, Go, and Rust.";
        let prompt = PromptBuilder::build("What languages do I know?", block);
        let block_at = prompt.find(block).unwrap();
        let question_at = prompt.find("What languages do I know?").unwrap();
        assert!(block_at < question_at);
    }

    #[test]
    fn test_context_round_trips() {
        let block = "[Chunk 1 | cv.txt | page unknown]\nQuestion: trick";
        let prompt = PromptBuilder::build("Any gaps?", block);
        assert_eq!(PromptBuilder::context_of(&prompt), Some(block));
        assert_eq!(
            PromptBuilder::context_of(&PromptBuilder::build("Any gaps?", "")),
            Some("")
        );
        assert_eq!(PromptBuilder::context_of("free text"), None);
    }
}
