use anyhow::{Context, Result};
use cvrag_answer::{Answerer, GenerationSettings, Generator, OllamaGenerator, Retriever, StubGenerator};
use cvrag_indexer::Ingestor;
use cvrag_protocol::{EmbeddingMode, GenerationMode, RagConfig};
use cvrag_text_chunker::{Chunker, ChunkerConfig};
use cvrag_vector_store::{Embedder, OllamaEmbedder, StubEmbedder, VectorIndex};
use std::sync::Arc;
use std::time::Duration;

/// Components wired from one validated configuration
pub struct App {
    config: RagConfig,
}

impl App {
    pub fn new(config: RagConfig) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &RagConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    pub fn chunker(&self) -> Result<Chunker> {
        let config = ChunkerConfig::new(self.config.chunk_size, self.config.chunk_overlap)
            .separator(self.config.separator.clone());
        Chunker::new(config).context("Invalid chunking configuration")
    }

    pub fn embedder(&self) -> Result<Arc<dyn Embedder>> {
        Ok(match self.config.embedding_mode {
            EmbeddingMode::Stub => {
                log::debug!("Using stub embedder");
                Arc::new(StubEmbedder::default())
            }
            EmbeddingMode::Ollama => Arc::new(
                OllamaEmbedder::new(
                    &self.config.ollama_url,
                    self.config.embedding_model.clone(),
                    self.timeout(),
                )
                .context("Failed to create embedding client")?,
            ),
        })
    }

    pub fn generator(&self) -> Result<Arc<dyn Generator>> {
        Ok(match self.config.generation_mode {
            GenerationMode::Stub => {
                log::debug!("Using stub generator");
                Arc::new(StubGenerator)
            }
            GenerationMode::Ollama => Arc::new(
                OllamaGenerator::new(&self.config.ollama_url, self.timeout())
                    .context("Failed to create generation client")?,
            ),
        })
    }

    /// Writable handle; fails fast if another writer holds the collection
    pub async fn open_index(&self) -> Result<Arc<VectorIndex>> {
        let index = VectorIndex::open(&self.config.index_dir, &self.config.collection)
            .await
            .with_context(|| self.open_failure())?;
        Ok(Arc::new(index))
    }

    /// Snapshot handle for queries; runs alongside an ingest
    pub async fn open_reader(&self) -> Result<Arc<VectorIndex>> {
        let index = VectorIndex::open_read_only(&self.config.index_dir, &self.config.collection)
            .await
            .with_context(|| self.open_failure())?;
        Ok(Arc::new(index))
    }

    fn open_failure(&self) -> String {
        format!(
            "Failed to open collection '{}' in {}",
            self.config.collection,
            self.config.index_dir.display()
        )
    }

    pub async fn ingestor(&self) -> Result<Ingestor> {
        Ok(
            Ingestor::new(self.chunker()?, self.embedder()?, self.open_index().await?)
                .with_concurrency(self.config.ingest_concurrency),
        )
    }

    pub async fn answerer(&self) -> Result<Answerer> {
        let retriever = Retriever::new(self.embedder()?, self.open_reader().await?);
        Ok(Answerer::new(
            retriever,
            self.generator()?,
            GenerationSettings::new(
                self.config.generation_model.clone(),
                self.config.temperature,
            ),
        ))
    }
}
