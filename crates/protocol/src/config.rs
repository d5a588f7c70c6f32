use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file picked up from the working directory when present
pub const CONFIG_FILE_NAME: &str = "cv-rag.toml";

/// Prefix of environment overrides (`CV_RAG_TOP_K`, ...)
pub const ENV_PREFIX: &str = "CV_RAG_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    #[default]
    Ollama,
    Stub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Ollama,
    Stub,
}

fn parse_mode(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "ollama" => Ok(false),
        "stub" => Ok(true),
        other => bail!("unsupported mode '{other}' (expected 'ollama' or 'stub')"),
    }
}

impl FromStr for EmbeddingMode {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        Ok(if parse_mode(raw)? { Self::Stub } else { Self::Ollama })
    }
}

impl FromStr for GenerationMode {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        Ok(if parse_mode(raw)? { Self::Stub } else { Self::Ollama })
    }
}

/// Everything the pipeline needs, supplied at construction time.
///
/// Layered as defaults, then a TOML file, then `CV_RAG_*` environment
/// variables, then command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RagConfig {
    pub embedding_model: String,
    pub generation_model: String,
    /// Decoding temperature; 0 picks the most likely continuation every time
    pub temperature: f32,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separator: String,
    pub top_k: usize,
    pub data_dir: PathBuf,
    pub index_dir: PathBuf,
    pub collection: String,
    pub ollama_url: String,
    pub request_timeout_secs: u64,
    pub ingest_concurrency: usize,
    pub embedding_mode: EmbeddingMode,
    pub generation_mode: GenerationMode,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_model: "nomic-embed-text".to_string(),
            generation_model: "llama2".to_string(),
            temperature: 0.0,
            chunk_size: 1000,
            chunk_overlap: 100,
            separator: "\n".to_string(),
            top_k: 4,
            data_dir: PathBuf::from("data"),
            index_dir: PathBuf::from(".cv-rag/index"),
            collection: "cv_chunks".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            request_timeout_secs: 120,
            ingest_concurrency: 4,
            embedding_mode: EmbeddingMode::Ollama,
            generation_mode: GenerationMode::Ollama,
        }
    }
}

impl RagConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| anyhow!("Config parse error: {err}"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Defaults, overlaid with `explicit` (must exist) or `cv-rag.toml` in
    /// `cwd` (optional), then with the process environment.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidate = cwd.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CV_RAG_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("EMBEDDING_MODEL") {
            self.embedding_model = v;
        }
        if let Some(v) = var("GENERATION_MODEL") {
            self.generation_model = v;
        }
        if let Some(v) = var("TEMPERATURE") {
            self.temperature = parse_env("TEMPERATURE", &v)?;
        }
        if let Some(v) = var("CHUNK_SIZE") {
            self.chunk_size = parse_env("CHUNK_SIZE", &v)?;
        }
        if let Some(v) = var("CHUNK_OVERLAP") {
            self.chunk_overlap = parse_env("CHUNK_OVERLAP", &v)?;
        }
        if let Some(v) = var("TOP_K") {
            self.top_k = parse_env("TOP_K", &v)?;
        }
        if let Some(v) = var("DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = var("INDEX_DIR") {
            self.index_dir = PathBuf::from(v);
        }
        if let Some(v) = var("COLLECTION") {
            self.collection = v;
        }
        if let Some(v) = var("OLLAMA_URL") {
            self.ollama_url = v;
        }
        if let Some(v) = var("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = var("INGEST_CONCURRENCY") {
            self.ingest_concurrency = parse_env("INGEST_CONCURRENCY", &v)?;
        }
        if let Some(v) = var("EMBEDDING_MODE") {
            self.embedding_mode = v.parse()?;
        }
        if let Some(v) = var("GENERATION_MODE") {
            self.generation_mode = v.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding_model.trim().is_empty() {
            bail!("embedding_model must not be empty");
        }
        if self.generation_model.trim().is_empty() {
            bail!("generation_model must not be empty");
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            bail!("temperature must be a finite value >= 0 (got {})", self.temperature);
        }
        if self.chunk_size == 0 {
            bail!("chunk_size must be > 0");
        }
        if self.chunk_overlap >= self.chunk_size {
            bail!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap,
                self.chunk_size
            );
        }
        if self.top_k == 0 {
            bail!("top_k must be >= 1");
        }
        if self.ingest_concurrency == 0 {
            bail!("ingest_concurrency must be >= 1");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be >= 1");
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| anyhow!("{ENV_PREFIX}{name}='{raw}' is invalid: {err}"))
}
