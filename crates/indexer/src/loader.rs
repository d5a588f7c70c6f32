use crate::error::{IndexerError, Result};
use cvrag_text_chunker::{Document, DocumentMetadata};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Document formats the loader can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Plain text, one document per file
    Text,
    /// PDF, one document per page
    Pdf,
}

impl DocumentFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// A file the loader did not turn into documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of loading a source directory
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Documents in sorted file order, pages in ascending order
    pub documents: Vec<Document>,
    /// Number of files that produced documents
    pub files: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Reads CV files from a single directory.
///
/// Only the top level is scanned; hidden files are ignored. Files are
/// visited in sorted path order so repeated runs assign the same ids.
pub struct DocumentLoader {
    root: PathBuf,
}

impl DocumentLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Candidate files under the root, sorted
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(IndexerError::InvalidPath(self.root.display().to_string()));
        }

        let mut builder = WalkBuilder::new(&self.root);
        builder.standard_filters(false).hidden(true).max_depth(Some(1));

        let mut files = Vec::new();
        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }
        files.sort();

        log::debug!("Found {} file(s) in {}", files.len(), self.root.display());
        Ok(files)
    }

    /// Load every readable document. Unsupported or unreadable files are
    /// logged and reported, never fatal.
    pub fn load(&self) -> Result<LoadOutcome> {
        let mut outcome = LoadOutcome::default();

        for path in self.scan()? {
            match self.load_file(&path) {
                Ok(documents) => {
                    log::debug!("Loaded {} document(s) from {}", documents.len(), path.display());
                    outcome.files += 1;
                    outcome.documents.extend(documents);
                }
                Err(e) => {
                    log::warn!("Skipping {}: {e}", path.display());
                    outcome.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Loaded {} document(s) from {} file(s) in {}",
            outcome.documents.len(),
            outcome.files,
            self.root.display()
        );
        Ok(outcome)
    }

    /// Load one file according to its format
    pub fn load_file(&self, path: &Path) -> Result<Vec<Document>> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| IndexerError::UnsupportedDocumentFormat(path.to_path_buf()))?;
        let source = self.source_name(path);

        match format {
            DocumentFormat::Text => {
                let text = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
                let mut raw = Map::new();
                raw.insert("source".to_string(), Value::String(source));
                Ok(vec![Document::new(text, DocumentMetadata::from_raw(&raw))])
            }
            DocumentFormat::Pdf => load_pdf(path, &source),
        }
    }

    fn source_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

fn load_pdf(path: &Path, source: &str) -> Result<Vec<Document>> {
    let pdf = lopdf::Document::load(path).map_err(|e| read_error(path, e))?;

    let mut documents = Vec::new();
    for page in pdf.get_pages().into_keys() {
        let text = pdf.extract_text(&[page]).map_err(|e| read_error(path, e))?;
        let mut raw = Map::new();
        raw.insert("source".to_string(), Value::String(source.to_string()));
        raw.insert("page".to_string(), Value::from(page));
        documents.push(Document::new(text, DocumentMetadata::from_raw(&raw)));
    }
    Ok(documents)
}

fn read_error(path: &Path, err: impl std::fmt::Display) -> IndexerError {
    IndexerError::DocumentRead {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
