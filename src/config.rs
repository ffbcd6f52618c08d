use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub projector: ProjectorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_embed_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_embed_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            dims: None,
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            batch_size: 64,
            max_retries: 5,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_llm_max_retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexingConfig {
    #[serde(default = "default_index_batch_size")]
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_index_batch_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProjectorConfig {
    #[serde(default = "default_transforms")]
    pub transforms: Vec<String>,
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            transforms: default_transforms(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_embed_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_embed_timeout_secs() -> u64 {
    30
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> usize {
    2000
}
fn default_llm_timeout_secs() -> u64 {
    60
}
fn default_llm_max_retries() -> u32 {
    3
}
fn default_index_batch_size() -> usize {
    100
}
fn default_top_k() -> usize {
    5
}
fn default_transforms() -> Vec<String> {
    vec!["collapse-whitespace".to_string()]
}
fn default_max_body_chars() -> usize {
    8000
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate indexing
    if config.indexing.batch_size < 1 {
        anyhow::bail!("indexing.batch_size must be >= 1");
    }

    // Validate retrieval
    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    // Validate embedding
    if config.embedding.is_enabled() {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    match config.embedding.provider.as_str() {
        "disabled" | "remote-api" | "local-model" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, remote-api, or local-model.",
            other
        ),
    }

    // Validate generation model
    if config.llm.is_enabled() && config.llm.model.is_none() {
        anyhow::bail!(
            "llm.model must be specified when provider is '{}'",
            config.llm.provider
        );
    }

    match config.llm.provider.as_str() {
        "disabled" | "remote-api" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be disabled or remote-api.",
            other
        ),
    }

    // Validate projector transforms
    for name in &config.projector.transforms {
        match name.as_str() {
            "collapse-whitespace" | "truncate-body" => {}
            other => anyhow::bail!(
                "Unknown projector transform: '{}'. Available: collapse-whitespace, truncate-body.",
                other
            ),
        }
    }
    if config
        .projector
        .transforms
        .iter()
        .any(|t| t == "truncate-body")
        && config.projector.max_body_chars == 0
    {
        anyhow::bail!("projector.max_body_chars must be > 0 when truncate-body is enabled");
    }

    Ok(config)
}
