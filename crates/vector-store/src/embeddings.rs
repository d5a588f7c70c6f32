use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dimension of `nomic-embed-text`, the default Ollama embedding model
pub const DEFAULT_STUB_DIMENSION: usize = 768;

/// Turns text into a fixed-dimension vector.
///
/// Implementations do not retry; a failed call surfaces as
/// [`VectorStoreError::EmbeddingService`].
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier of the model producing the vectors
    fn model_id(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Embedder backed by the Ollama `/api/embeddings` endpoint
pub struct OllamaEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                VectorStoreError::embedding_service(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/embeddings", base_url.trim_end_matches('/')),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        log::debug!(
            "Embedding {} chars with {} via {}",
            text.len(),
            self.model,
            self.endpoint
        );
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| {
                VectorStoreError::embedding_service(format!("request to {} failed: {e}", self.endpoint))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(VectorStoreError::embedding_service(format!(
                "{} returned {status}: {body}",
                self.endpoint
            )));
        }

        let parsed: EmbeddingResponse = resp.json().await.map_err(|e| {
            VectorStoreError::embedding_service(format!("malformed embedding response: {e}"))
        })?;
        match parsed.embedding {
            Some(vector) if vector.is_empty() => Err(VectorStoreError::embedding_service(
                "embedding service returned an empty vector",
            )),
            Some(vector) if !vector.iter().all(|v| v.is_finite()) => {
                Err(VectorStoreError::embedding_service(
                    "embedding service returned a non-finite vector component",
                ))
            }
            Some(vector) => Ok(vector),
            None => Err(VectorStoreError::embedding_service(
                "embedding response is missing the `embedding` field",
            )),
        }
    }
}

/// Offline embedder producing deterministic unit vectors from a text hash.
///
/// Identical text always maps to the identical vector; there is no semantic
/// similarity between different texts.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_STUB_DIMENSION)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn model_id(&self) -> &str {
        "stub"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.dimension == 0 {
            return Err(VectorStoreError::embedding_service(
                "stub embedder configured with zero dimension",
            ));
        }
        Ok(stub_embed(text, self.dimension))
    }
}

fn stub_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let mantissa = ((bits >> 32) as u32) >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vec);
    vec
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::cosine_similarity;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(response: Value) -> String {
        let app = Router::new().route(
            "/api/embeddings",
            post(move |Json(body): Json<Value>| {
                let response = response.clone();
                async move {
                    assert_eq!(body["model"], "nomic-embed-text");
                    assert!(body["prompt"].is_string());
                    Json(response)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn embedder(base_url: &str) -> OllamaEmbedder {
        OllamaEmbedder::new(base_url, "nomic-embed-text", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn ollama_embedder_returns_vector() {
        let url = serve(json!({"embedding": [0.1, 0.2, 0.3]})).await;
        let vector = embedder(&url).embed("Rust engineer").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn ollama_embedder_rejects_missing_field() {
        let url = serve(json!({"vector": [0.1]})).await;
        let err = embedder(&url).embed("Rust engineer").await.unwrap_err();
        assert!(matches!(err, VectorStoreError::EmbeddingService(_)), "{err}");
        assert!(err.to_string().contains("embedding"));
    }

    #[tokio::test]
    async fn ollama_embedder_rejects_empty_vector() {
        let url = serve(json!({"embedding": []})).await;
        let err = embedder(&url).embed("Rust engineer").await.unwrap_err();
        assert!(matches!(err, VectorStoreError::EmbeddingService(_)));
    }

    #[tokio::test]
    async fn ollama_embedder_rejects_out_of_range_values() {
        let body: Value = serde_json::from_str(r#"{"embedding": [1e39, 0.5]}"#).unwrap();
        let url = serve(body).await;
        let err = embedder(&url).embed("Rust engineer").await.unwrap_err();
        assert!(matches!(err, VectorStoreError::EmbeddingService(_)), "{err}");
        assert!(err.to_string().contains("non-finite"));
    }

    #[tokio::test]
    async fn ollama_embedder_unreachable_service_is_service_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = embedder(&format!("http://{addr}"))
            .embed("Rust engineer")
            .await
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::EmbeddingService(_)));
    }

    #[tokio::test]
    async fn stub_embedder_is_deterministic_and_normalized() {
        let stub = StubEmbedder::new(64);
        let a = stub.embed("Skilled in Python, Go, and Rust.").await.unwrap();
        let b = stub.embed("Skilled in Python, Go, and Rust.").await.unwrap();
        let c = stub.embed("Ten years of Java").await.unwrap();

        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn default_batch_preserves_order() {
        let stub = StubEmbedder::new(8);
        let batch = stub.embed_batch(&["one", "two"]).await.unwrap();
        assert_eq!(batch[0], stub.embed("one").await.unwrap());
        assert_eq!(batch[1], stub.embed("two").await.unwrap());
    }

    #[tokio::test]
    #[ignore = "Requires a running Ollama server with nomic-embed-text"]
    async fn test_embed_live() {
        let model = embedder("http://localhost:11434");
        let embedding = model.embed("hello world").await.unwrap();
        assert_eq!(embedding.len(), DEFAULT_STUB_DIMENSION);
    }
}
