//! Embedding provider abstraction and implementations.
//!
//! Defines the [`EmbeddingProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]** — returns errors; used when embeddings are not configured.
//! - **[`RemoteApiProvider`]** — calls an OpenAI-compatible embeddings endpoint
//!   with batching, retry, and backoff.
//! - **`LocalModelProvider`** — runs models on-device via fastembed
//!   (`local-embeddings` feature); no network calls after model download.
//!
//! Also provides vector utilities for BLOB storage:
//! - [`cosine_similarity`] — compute similarity between two embedding vectors
//! - [`vec_to_blob`] — encode a `Vec<f32>` as little-endian bytes for SQLite BLOB storage
//! - [`blob_to_vec`] — decode a SQLite BLOB back into a `Vec<f32>`
//!
//! # Retry Strategy
//!
//! The remote provider uses exponential backoff for transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! Changing the provider, model, or dimensionality invalidates every
//! collection built with the old settings; the operator must `reindex`.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::EmbeddingConfig;

/// Trait for embedding providers. The indexer and retriever depend on this
/// interface, never on a concrete backend.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))
    }
}

// ============ Disabled Provider ============

/// A no-op embedding provider that always returns errors.
///
/// Used when `embedding.provider = "disabled"` in the configuration.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        bail!("Embedding provider is disabled")
    }
}

// ============ Remote API Provider ============

/// Embedding provider backed by an OpenAI-compatible embeddings endpoint.
///
/// Calls `POST {endpoint}/embeddings` with the configured model. The API key
/// is read from the environment variable named by `embedding.api_key_env`.
pub struct RemoteApiProvider {
    model: String,
    dims: usize,
    endpoint: String,
    api_key: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl RemoteApiProvider {
    /// Create a new remote provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `model` or `dims` is not set in config,
    /// or if the API key environment variable is not set.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.model required for remote-api provider"))?;
        let dims = config
            .dims
            .ok_or_else(|| anyhow::anyhow!("embedding.dims required for remote-api provider"))?;

        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", config.api_key_env))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model,
            dims,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            max_retries: config.max_retries,
            client,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteApiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(format!("{}/embeddings", self.endpoint))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_embeddings_response(&json);
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err =
                            Some(anyhow::anyhow!("Embeddings API error {}: {}", status, body_text));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Embeddings API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Embedding failed after retries")))
    }
}

/// Parse an OpenAI-style embeddings response, extracting `data[].embedding`
/// arrays in input order.
fn parse_embeddings_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid embeddings response: missing data array"))?;

    let mut embeddings = Vec::with_capacity(data.len());

    for item in data {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| anyhow::anyhow!("Invalid embeddings response: missing embedding"))?;

        let vec: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        embeddings.push(vec);
    }

    Ok(embeddings)
}

// ============ Local Model Provider ============

/// Embedding provider for on-device inference via fastembed.
///
/// Models are downloaded on first use from Hugging Face and cached; after
/// that, embedding runs entirely offline.
#[cfg(feature = "local-embeddings")]
pub struct LocalModelProvider {
    model_name: String,
    dims: usize,
    batch_size: usize,
}

#[cfg(feature = "local-embeddings")]
impl LocalModelProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model_name = config
            .model
            .clone()
            .unwrap_or_else(|| "all-minilm-l6-v2".to_string());

        let dims = config.dims.unwrap_or(match model_name.as_str() {
            "all-minilm-l6-v2" => 384,
            "bge-small-en-v1.5" => 384,
            "bge-base-en-v1.5" => 768,
            "bge-large-en-v1.5" => 1024,
            _ => 384,
        });

        // Fail fast on unknown model names
        local_model_for(&model_name)?;

        Ok(Self {
            model_name,
            dims,
            batch_size: config.batch_size,
        })
    }
}

#[cfg(feature = "local-embeddings")]
fn local_model_for(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "bge-large-en-v1.5" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
        other => bail!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5",
            other
        ),
    }
}

#[cfg(feature = "local-embeddings")]
#[async_trait]
impl EmbeddingProvider for LocalModelProvider {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = local_model_for(&self.model_name)?;
        let batch_size = self.batch_size;
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut embedder = fastembed::TextEmbedding::try_new(
                fastembed::InitOptions::new(model).with_show_download_progress(false),
            )
            .map_err(|e| anyhow::anyhow!("Failed to initialize local embedding model: {}", e))?;

            embedder
                .embed(texts, Some(batch_size))
                .map_err(|e| anyhow::anyhow!("Local embedding failed: {}", e))
        })
        .await?
    }
}

/// Create the appropriate [`EmbeddingProvider`] based on configuration.
///
/// # Supported Providers
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"remote-api"` | [`RemoteApiProvider`] |
/// | `"local-model"` | `LocalModelProvider` (requires the `local-embeddings` feature) |
///
/// # Errors
///
/// Returns an error for unknown provider names or if the provider cannot
/// be initialized (missing config, API key, or feature flag).
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "remote-api" => Ok(Box::new(RemoteApiProvider::new(config)?)),
        #[cfg(feature = "local-embeddings")]
        "local-model" => Ok(Box::new(LocalModelProvider::new(config)?)),
        #[cfg(not(feature = "local-embeddings"))]
        "local-model" => {
            bail!("Local embedding provider requires building with --features local-embeddings")
        }
        other => bail!("Unknown embedding provider: {}", other),
    }
}

/// Encode a float vector as a BLOB (little-endian f32 bytes).
///
/// Each `f32` is stored as 4 bytes in little-endian order, producing
/// a BLOB of `vec.len() × 4` bytes.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
///
/// Reverses [`vec_to_blob`]: reads 4-byte little-endian `f32` values
/// from the byte slice.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`. Returns `0.0` for empty vectors or
/// vectors of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Deterministic toy provider for state-machine tests. Texts containing
    /// `fail_marker` make the whole batch fail, simulating a transient
    /// embedding outage.
    pub struct StubProvider {
        pub dims: usize,
        pub fail_marker: Option<String>,
    }

    impl StubProvider {
        pub fn new(dims: usize) -> Self {
            Self {
                dims,
                fail_marker: None,
            }
        }

        pub fn failing_on(dims: usize, marker: &str) -> Self {
            Self {
                dims,
                fail_marker: Some(marker.to_string()),
            }
        }
    }

    pub fn stub_vector(text: &str, dims: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; dims];
        for (i, b) in text.bytes().enumerate() {
            v[i % dims] += b as f32;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }

    #[async_trait]
    impl EmbeddingProvider for StubProvider {
        fn model_name(&self) -> &str {
            "stub"
        }
        fn dims(&self) -> usize {
            self.dims
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if let Some(marker) = &self.fail_marker {
                if texts.iter().any(|t| t.contains(marker.as_str())) {
                    bail!("stub embedding outage");
                }
            }
            Ok(texts.iter().map(|t| stub_vector(t, self.dims)).collect())
        }
    }
}
