use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder rendered when a source or page is not known
pub const UNKNOWN: &str = "unknown";

/// Normalized document metadata shared by every chunk of a document.
///
/// Readers hand over loosely keyed metadata (`source` or `file_path`,
/// `page` or `page_number`). [`DocumentMetadata::from_raw`] resolves those
/// fallbacks once so that formatting code only ever sees these two fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source identifier (usually the file name)
    pub source: String,

    /// 1-based page number for paged formats
    #[serde(default)]
    pub page: Option<u32>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            source: UNKNOWN.to_string(),
            page: None,
        }
    }
}

impl DocumentMetadata {
    /// Metadata for an unpaged source
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            source: if source.trim().is_empty() {
                UNKNOWN.to_string()
            } else {
                source
            },
            page: None,
        }
    }

    /// Builder: set page
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Normalize raw reader metadata.
    ///
    /// `source` wins over `file_path`, `page` over `page_number`. Pages may be
    /// numbers or numeric strings; anything else is treated as absent.
    #[must_use]
    pub fn from_raw(raw: &Map<String, Value>) -> Self {
        let source = ["source", "file_path"]
            .iter()
            .filter_map(|key| raw.get(*key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map_or_else(|| UNKNOWN.to_string(), ToString::to_string);

        let page = ["page", "page_number"]
            .iter()
            .filter_map(|key| raw.get(*key))
            .find_map(page_from_value);

        Self { source, page }
    }

    /// Page rendered for humans, `unknown` when absent
    #[must_use]
    pub fn page_label(&self) -> String {
        self.page
            .map_or_else(|| UNKNOWN.to_string(), |page| page.to_string())
    }
}

fn page_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Raw document text plus its metadata, as produced by a reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    #[must_use]
    pub fn new(text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A contiguous piece of a document's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text, verbatim
    pub text: String,

    /// Metadata of the parent document
    pub metadata: DocumentMetadata,

    /// Position in the chunk sequence of the parent document (0-based)
    pub ordinal: usize,

    /// Character offset of the first character in the parent document
    pub char_offset: usize,
}

impl Chunk {
    /// Length in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_metadata_prefers_primary_keys() {
        let meta = DocumentMetadata::from_raw(&raw(json!({
            "source": "cv.pdf",
            "file_path": "/tmp/other.pdf",
            "page": 2,
            "page_number": 7
        })));
        assert_eq!(meta.source, "cv.pdf");
        assert_eq!(meta.page, Some(2));
    }

    #[test]
    fn test_metadata_falls_back_to_secondary_keys() {
        let meta = DocumentMetadata::from_raw(&raw(json!({
            "file_path": "resume.txt",
            "page_number": "3"
        })));
        assert_eq!(meta.source, "resume.txt");
        assert_eq!(meta.page, Some(3));
    }

    #[test]
    fn test_metadata_missing_fields_become_unknown() {
        let meta = DocumentMetadata::from_raw(&Map::new());
        assert_eq!(meta.source, UNKNOWN);
        assert_eq!(meta.page, None);
        assert_eq!(meta.page_label(), "unknown");
    }

    #[test]
    fn test_metadata_ignores_blank_and_malformed_values() {
        let meta = DocumentMetadata::from_raw(&raw(json!({
            "source": "  ",
            "file_path": "cv.txt",
            "page": "first",
            "page_number": -1
        })));
        assert_eq!(meta.source, "cv.txt");
        assert_eq!(meta.page, None);
    }

    #[test]
    fn test_blank_source_normalizes() {
        assert_eq!(DocumentMetadata::new("").source, UNKNOWN);
        assert_eq!(DocumentMetadata::new("cv.pdf").with_page(4).page_label(), "4");
    }
}
