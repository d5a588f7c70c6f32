use crate::error::{Result, VectorStoreError};
use crate::lock::{CollectionLock, CommitLock};
use crate::paths::{collection_dir, commit_lock_file_in, index_file_in, lock_file_in};
use crate::similarity::rank;
use crate::types::{CollectionStats, EmbeddedChunk, IndexRecord, QueryResult, ScoredRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

pub const INDEX_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default)]
struct IndexState {
    dimension: Option<usize>,
    next_id: u64,
    records: Vec<IndexRecord>,
}

#[derive(Serialize)]
struct PersistedIndexRef<'a> {
    schema_version: u32,
    collection: &'a str,
    dimension: Option<usize>,
    next_id: u64,
    records: &'a [IndexRecord],
}

#[derive(Deserialize)]
struct PersistedIndex {
    schema_version: u32,
    collection: String,
    dimension: Option<usize>,
    next_id: u64,
    records: Vec<IndexRecord>,
}

/// Durable collection of embedded chunks with exact cosine search.
///
/// A writable handle owns an exclusive lock on its collection until
/// [`close`] or drop, so at most one writer exists per collection. Writes are
/// serialized and committed atomically (temp file, fsync, rename) before
/// becoming visible. Read-only handles ([`open_read_only`]) take no writer
/// lock and serve a snapshot of the last committed state.
///
/// [`close`]: VectorIndex::close
/// [`open_read_only`]: VectorIndex::open_read_only
pub struct VectorIndex {
    collection: String,
    path: PathBuf,
    commit_lock_path: PathBuf,
    state: RwLock<IndexState>,
    write_gate: Mutex<()>,
    lock: Option<CollectionLock>,
}

impl VectorIndex {
    /// Open (or create) `collection` under `root` for writing
    pub async fn open(root: impl AsRef<Path>, collection: &str) -> Result<Self> {
        let dir = collection_dir(root.as_ref(), collection)?;
        tokio::fs::create_dir_all(&dir).await?;
        let lock = CollectionLock::acquire(&lock_file_in(&dir))?;
        Self::open_with(&dir, collection, Some(lock)).await
    }

    /// Open a snapshot of `collection` for queries.
    ///
    /// Does not conflict with a writer holding the collection. A collection
    /// that was never written opens empty and nothing is created on disk.
    pub async fn open_read_only(root: impl AsRef<Path>, collection: &str) -> Result<Self> {
        let dir = collection_dir(root.as_ref(), collection)?;
        Self::open_with(&dir, collection, None).await
    }

    async fn open_with(dir: &Path, collection: &str, lock: Option<CollectionLock>) -> Result<Self> {
        let path = index_file_in(dir);
        let commit_lock_path = commit_lock_file_in(dir);
        let state = Self::load_committed(&path, &commit_lock_path, collection).await?;

        log::info!(
            "Opened collection '{}' at {} ({} records{})",
            collection,
            path.display(),
            state.records.len(),
            if lock.is_none() { ", read-only" } else { "" }
        );

        Ok(Self {
            collection: collection.to_string(),
            path,
            commit_lock_path,
            state: RwLock::new(state),
            write_gate: Mutex::new(()),
            lock,
        })
    }

    async fn load_committed(
        path: &Path,
        commit_lock_path: &Path,
        collection: &str,
    ) -> Result<IndexState> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(IndexState::default());
        }
        let _guard = CommitLock::shared(commit_lock_path).await?;
        Self::load_state(path, collection).await
    }

    /// Replace the snapshot with the last committed state on disk.
    ///
    /// Returns the number of records now visible.
    pub async fn reload(&self) -> Result<usize> {
        let _gate = self.write_gate.lock().await;
        let state =
            Self::load_committed(&self.path, &self.commit_lock_path, &self.collection).await?;
        let records = state.records.len();
        *self.state.write().await = state;
        log::debug!("Reloaded collection '{}' ({records} records)", self.collection);
        Ok(records)
    }

    async fn load_state(path: &Path, collection: &str) -> Result<IndexState> {
        let bytes = tokio::fs::read(path).await?;
        let persisted: PersistedIndex = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != INDEX_SCHEMA_VERSION {
            return Err(VectorStoreError::Corrupt(format!(
                "unsupported index schema_version {} (expected {INDEX_SCHEMA_VERSION})",
                persisted.schema_version
            )));
        }
        if persisted.collection != collection {
            return Err(VectorStoreError::Corrupt(format!(
                "{} belongs to collection '{}', not '{collection}'",
                path.display(),
                persisted.collection
            )));
        }
        if let Some(dimension) = persisted.dimension {
            if let Some(bad) = persisted
                .records
                .iter()
                .find(|record| record.vector.len() != dimension)
            {
                return Err(VectorStoreError::Corrupt(format!(
                    "record {} has {} dimensions, index declares {dimension}",
                    bad.id,
                    bad.vector.len()
                )));
            }
        } else if !persisted.records.is_empty() {
            return Err(VectorStoreError::Corrupt(
                "records present but no dimension recorded".to_string(),
            ));
        }
        if persisted
            .records
            .iter()
            .any(|record| record.id >= persisted.next_id)
        {
            return Err(VectorStoreError::Corrupt(
                "record id at or beyond next_id".to_string(),
            ));
        }

        Ok(IndexState {
            dimension: persisted.dimension,
            next_id: persisted.next_id,
            records: persisted.records,
        })
    }

    /// Insert a batch, returning the ids assigned in batch order.
    ///
    /// Either the whole batch is committed or nothing is: on any error the
    /// file on disk and the visible state are unchanged.
    pub async fn insert(&self, batch: Vec<EmbeddedChunk>) -> Result<Vec<u64>> {
        if self.lock.is_none() {
            return Err(VectorStoreError::invalid_argument(format!(
                "collection '{}' is open read-only",
                self.collection
            )));
        }
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let _gate = self.write_gate.lock().await;
        let mut next = self.state.read().await.clone();

        let expected = next.dimension.unwrap_or(batch[0].vector.len());
        if expected == 0 {
            return Err(VectorStoreError::invalid_argument(
                "cannot insert empty embedding vectors",
            ));
        }
        if let Some(bad) = batch.iter().find(|item| item.vector.len() != expected) {
            return Err(VectorStoreError::DimensionMismatch {
                expected,
                actual: bad.vector.len(),
            });
        }
        if let Some(position) = batch
            .iter()
            .position(|item| !item.vector.iter().all(|v| v.is_finite()))
        {
            return Err(VectorStoreError::invalid_argument(format!(
                "batch item {position} has a non-finite vector component"
            )));
        }

        let mut ids = Vec::with_capacity(batch.len());
        for item in batch {
            let id = next.next_id;
            next.next_id += 1;
            ids.push(id);
            next.records.push(IndexRecord {
                id,
                text: item.chunk.text,
                metadata: item.chunk.metadata,
                vector: item.vector,
            });
        }
        next.dimension = Some(expected);

        self.persist(&next).await?;
        *self.state.write().await = next;

        log::info!(
            "Committed {} record(s) to '{}' (ids {}..={})",
            ids.len(),
            self.collection,
            ids[0],
            ids[ids.len() - 1]
        );
        Ok(ids)
    }

    /// Top-`top_k` records by cosine similarity, ties in insertion order
    pub async fn query(&self, vector: &[f32], top_k: usize) -> Result<QueryResult> {
        if top_k == 0 {
            return Err(VectorStoreError::invalid_argument("top_k must be >= 1"));
        }

        let state = self.state.read().await;
        let Some(dimension) = state.dimension else {
            log::debug!("Query against empty collection '{}'", self.collection);
            return Ok(QueryResult::default());
        };
        if vector.len() != dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: dimension,
                actual: vector.len(),
            });
        }

        let hits = rank(&state.records, vector, top_k)
            .into_iter()
            .map(|(pos, score)| {
                let record = &state.records[pos];
                ScoredRecord {
                    id: record.id,
                    text: record.text.clone(),
                    metadata: record.metadata.clone(),
                    score,
                }
            })
            .collect();

        Ok(QueryResult { hits })
    }

    async fn persist(&self, state: &IndexState) -> Result<()> {
        let persisted = PersistedIndexRef {
            schema_version: INDEX_SCHEMA_VERSION,
            collection: &self.collection,
            dimension: state.dimension,
            next_id: state.next_id,
            records: &state.records,
        };
        let bytes = serde_json::to_vec(&persisted)?;
        let tmp = self.path.with_extension("json.tmp");

        let _guard = CommitLock::exclusive(&self.commit_lock_path).await?;
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Release the collection lock (no-op for read-only handles)
    pub fn close(self) -> Result<()> {
        log::debug!("Closing collection '{}'", self.collection);
        match self.lock {
            Some(lock) => lock.release(),
            None => Ok(()),
        }
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.lock.is_none()
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }

    /// Established vector dimension, if any record was ever committed
    pub async fn dimension(&self) -> Option<usize> {
        self.state.read().await.dimension
    }

    /// Snapshot of all records in insertion order
    pub async fn records(&self) -> Vec<IndexRecord> {
        self.state.read().await.records.clone()
    }

    pub async fn stats(&self) -> CollectionStats {
        let state = self.state.read().await;
        let mut sources = BTreeMap::new();
        for record in &state.records {
            *sources.entry(record.metadata.source.clone()).or_insert(0) += 1;
        }
        CollectionStats {
            collection: self.collection.clone(),
            records: state.records.len(),
            dimension: state.dimension,
            next_id: state.next_id,
            sources,
        }
    }
}
