use crate::loader::SkippedFile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Directory the documents were read from
    pub data_dir: PathBuf,

    /// Files that produced at least one document
    pub files: usize,

    /// Documents loaded (one per text file, one per PDF page)
    pub documents: usize,

    /// Chunks embedded and inserted
    pub chunks: usize,

    /// Ids assigned by the index, in chunk order
    pub ids: Vec<u64>,

    /// Files that were skipped, with the reason
    pub skipped: Vec<SkippedFile>,

    /// Non-fatal conditions worth surfacing to the user
    pub warnings: Vec<String>,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl IngestReport {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// True when nothing was written to the index
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        format!(
            "Indexed {} chunks from {} document(s).",
            self.chunks, self.documents
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_and_warnings() {
        let mut report = IngestReport::new("data");
        assert!(report.is_empty());
        report.documents = 2;
        report.chunks = 5;
        report.ids = (0..5).collect();
        report.add_warning("something odd");

        assert_eq!(report.summary(), "Indexed 5 chunks from 2 document(s).");
        assert_eq!(report.warnings, vec!["something odd".to_string()]);
        assert!(!report.is_empty());
    }
}
