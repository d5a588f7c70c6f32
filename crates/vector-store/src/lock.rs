use crate::error::{Result, VectorStoreError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive advisory lock held for as long as a collection is open
pub(crate) struct CollectionLock {
    file: File,
    path: PathBuf,
}

impl CollectionLock {
    /// Take the lock without waiting; a held lock fails with `Locked`
    pub(crate) fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        file.try_lock_exclusive()
            .map_err(|_| VectorStoreError::Locked(path.to_path_buf()))?;
        log::debug!("Acquired collection lock {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn release(self) -> Result<()> {
        self.file.unlock()?;
        log::debug!("Released collection lock {}", self.path.display());
        Ok(())
    }
}

impl Drop for CollectionLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Guard around reading or replacing `index.json`.
///
/// Loads hold it shared and commits hold it exclusive, so a reader never
/// opens the file while a writer swaps it in. Held only for the duration of
/// one load or commit.
pub(crate) struct CommitLock {
    file: File,
}

impl CommitLock {
    pub(crate) async fn shared(path: &Path) -> Result<Self> {
        Self::acquire(path, false).await
    }

    pub(crate) async fn exclusive(path: &Path) -> Result<Self> {
        Self::acquire(path, true).await
    }

    async fn acquire(path: &Path, exclusive: bool) -> Result<Self> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<Self> {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(&path)?;
            if exclusive {
                file.lock_exclusive()?;
            } else {
                file.lock_shared()?;
            }
            Ok(Self { file })
        })
        .await
        .map_err(|err| {
            VectorStoreError::IoError(std::io::Error::other(format!(
                "join commit lock task: {err}"
            )))
        })?
    }
}

impl Drop for CommitLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
