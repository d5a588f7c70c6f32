use crate::error::{Result, VectorStoreError};
use std::path::{Path, PathBuf};

pub const DEFAULT_INDEX_DIR: &str = ".cv-rag/index";
pub const INDEX_FILE_NAME: &str = "index.json";
pub const LOCK_FILE_NAME: &str = "index.lock";
pub const COMMIT_LOCK_FILE_NAME: &str = "commit.lock";

/// Directory holding one collection's files.
///
/// Collection names are single path components so a name can never escape
/// the index root.
pub fn collection_dir(root: &Path, collection: &str) -> Result<PathBuf> {
    validate_collection_name(collection)?;
    Ok(root.join(collection))
}

#[must_use]
pub fn index_file_in(collection_dir: &Path) -> PathBuf {
    collection_dir.join(INDEX_FILE_NAME)
}

#[must_use]
pub fn lock_file_in(collection_dir: &Path) -> PathBuf {
    collection_dir.join(LOCK_FILE_NAME)
}

#[must_use]
pub fn commit_lock_file_in(collection_dir: &Path) -> PathBuf {
    collection_dir.join(COMMIT_LOCK_FILE_NAME)
}

fn validate_collection_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(VectorStoreError::invalid_argument(format!(
            "invalid collection name '{name}' (use letters, digits, '_', '-', '.')"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        let dir = collection_dir(Path::new("/tmp/idx"), "cv_chunks").unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/idx/cv_chunks"));
        assert_eq!(index_file_in(&dir), PathBuf::from("/tmp/idx/cv_chunks/index.json"));
    }

    #[test]
    fn rejects_path_like_names() {
        for name in ["", ".", "..", "../escape", "a/b", "with space"] {
            assert!(
                collection_dir(Path::new("/tmp/idx"), name).is_err(),
                "{name:?} should be rejected"
            );
        }
    }
}
