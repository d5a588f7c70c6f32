use crate::error::{IndexerError, Result};
use crate::loader::{DocumentLoader, LoadOutcome};
use crate::report::IngestReport;
use cvrag_text_chunker::{Chunk, Chunker, ChunkingStats};
use cvrag_vector_store::{EmbeddedChunk, Embedder, VectorIndex};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Default number of embedding requests in flight
pub const DEFAULT_INGEST_CONCURRENCY: usize = 4;

/// Loads, chunks and embeds documents, then commits them to the index in
/// one batch.
pub struct Ingestor {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    concurrency: usize,
}

impl Ingestor {
    pub fn new(chunker: Chunker, embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>) -> Self {
        Self {
            chunker,
            embedder,
            index,
            concurrency: DEFAULT_INGEST_CONCURRENCY,
        }
    }

    /// Builder: cap concurrent embedding requests (at least one)
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Ingest every supported document in `data_dir`.
    ///
    /// An empty directory is not an error: the report carries a warning and
    /// the index is left untouched.
    pub async fn ingest_dir(&self, data_dir: impl AsRef<Path>) -> Result<IngestReport> {
        let start = Instant::now();
        let data_dir = data_dir.as_ref().to_path_buf();
        log::info!("Ingesting documents from {}", data_dir.display());

        let outcome = load_blocking(data_dir.clone()).await?;
        let mut report = IngestReport::new(&data_dir);
        report.files = outcome.files;
        report.documents = outcome.documents.len();
        report.skipped = outcome.skipped;

        if outcome.documents.is_empty() {
            report.add_warning(format!("No CV files found in `{}`", data_dir.display()));
            report.time_ms = elapsed_ms(start);
            return Ok(report);
        }

        let chunks = self.chunker.chunk_documents(&outcome.documents);
        if chunks.is_empty() {
            report.add_warning(format!(
                "Documents in `{}` contain no text",
                data_dir.display()
            ));
            report.time_ms = elapsed_ms(start);
            return Ok(report);
        }

        report.chunks = chunks.len();
        let batch = self.embed_chunks(chunks).await?;
        report.ids = self.index.insert(batch).await?;
        report.time_ms = elapsed_ms(start);

        log::info!("{} ({} ms)", report.summary(), report.time_ms);
        Ok(report)
    }

    /// Embed chunks concurrently, returning them in their original order.
    ///
    /// The first failure stops further requests from being started, aborts
    /// those in flight and is returned.
    pub async fn embed_chunks(&self, chunks: Vec<Chunk>) -> Result<Vec<EmbeddedChunk>> {
        let total = chunks.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut slots: Vec<Option<EmbeddedChunk>> = (0..total).map(|_| None).collect();

        for (position, chunk) in chunks.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| IndexerError::Other(format!("embedding limiter closed: {e}")))?;
            while let Some(joined) = tasks.try_join_next() {
                settle(&mut slots, joined, total)?;
            }
            let embedder = Arc::clone(&self.embedder);
            tasks.spawn(async move {
                let _permit = permit;
                let vector = embedder.embed(&chunk.text).await;
                (position, chunk, vector)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            settle(&mut slots, joined, total)?;
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

type EmbedOutcome = (usize, Chunk, cvrag_vector_store::Result<Vec<f32>>);

/// Store one finished embedding in its slot; dropping the caller's `JoinSet`
/// on error aborts the remaining tasks
fn settle(
    slots: &mut [Option<EmbeddedChunk>],
    joined: std::result::Result<EmbedOutcome, JoinError>,
    total: usize,
) -> Result<()> {
    let (position, chunk, vector) =
        joined.map_err(|e| IndexerError::Other(format!("embedding task failed: {e}")))?;
    slots[position] = Some(EmbeddedChunk::new(chunk, vector?));
    log::debug!("Embedded chunk {}/{total}", position + 1);
    Ok(())
}

/// Loaded documents and their chunks, without embedding
#[derive(Debug, Clone)]
pub struct ChunkPreview {
    pub outcome: LoadOutcome,
    pub chunks: Vec<Chunk>,
    pub stats: ChunkingStats,
}

/// Load and chunk `data_dir` without touching any service or index
pub async fn preview_dir(data_dir: impl AsRef<Path>, chunker: &Chunker) -> Result<ChunkPreview> {
    let outcome = load_blocking(data_dir.as_ref().to_path_buf()).await?;
    let chunks = chunker.chunk_documents(&outcome.documents);
    let stats = Chunker::stats(&chunks);
    log::info!(
        "Loaded {} document(s), split into {} chunk(s)",
        outcome.documents.len(),
        chunks.len()
    );
    Ok(ChunkPreview {
        outcome,
        chunks,
        stats,
    })
}

async fn load_blocking(data_dir: PathBuf) -> Result<LoadOutcome> {
    tokio::task::spawn_blocking(move || DocumentLoader::new(data_dir).load())
        .await
        .map_err(|e| IndexerError::Other(format!("document loader panicked: {e}")))?
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis())
        .unwrap_or(u64::MAX)
        .max(1)
}
