use serde::{Deserialize, Serialize};
use url::Url;

use super::UpstreamDefaults;

/// AI completion, embedding and vector index configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AiConfig {
    /// OpenAI-compatible chat completion endpoint.
    /// TOML: `upstreams.ai.completion_url`.
    #[serde(default = "default_completion_url")]
    pub completion_url: Url,

    /// OpenAI-compatible embeddings endpoint.
    /// TOML: `upstreams.ai.embedding_url`.
    #[serde(default = "default_embedding_url")]
    pub embedding_url: Url,

    /// Bearer key for completion and embeddings.
    /// TOML: `upstreams.ai.api_key`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// TOML: `upstreams.ai.completion_model`. Default: `gpt-4o-mini`.
    #[serde(default = "default_completion_model")]
    pub completion_model: String,

    /// TOML: `upstreams.ai.embedding_model`. Default: `text-embedding-3-small`.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Vector index host (Pinecone-compatible `/vectors/upsert` and `/query`).
    /// TOML: `upstreams.ai.vector_index_url`.
    #[serde(default)]
    pub vector_index_url: Option<Url>,

    /// TOML: `upstreams.ai.vector_index_api_key`.
    #[serde(default)]
    pub vector_index_api_key: Option<String>,

    /// TOML: `upstreams.ai.vector_namespace`.
    #[serde(default)]
    pub vector_namespace: Option<String>,

    /// Documents per embeddings request / vector upsert.
    /// TOML: `upstreams.ai.batch_size`. Default: `64`.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Parallel completion calls while generating summaries.
    /// TOML: `upstreams.ai.concurrency`. Default: `4`.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// TOML: `upstreams.ai.summary_max_tokens`. Default: `200`.
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,

    #[serde(default)]
    pub proxy: Option<Url>,

    #[serde(default)]
    pub enable_multiplexing: Option<bool>,

    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AiResolvedConfig {
    pub completion_url: Url,
    pub embedding_url: Url,
    pub api_key: Option<String>,
    pub completion_model: String,
    pub embedding_model: String,
    pub vector_index_url: Option<Url>,
    pub vector_index_api_key: Option<String>,
    pub vector_namespace: Option<String>,
    pub batch_size: usize,
    pub concurrency: usize,
    pub summary_max_tokens: u32,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub retry_max_times: usize,
}

impl AiConfig {
    pub fn resolve(&self, defaults: &UpstreamDefaults) -> AiResolvedConfig {
        AiResolvedConfig {
            completion_url: self.completion_url.clone(),
            embedding_url: self.embedding_url.clone(),
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            completion_model: self.completion_model.clone(),
            embedding_model: self.embedding_model.clone(),
            vector_index_url: self.vector_index_url.clone(),
            vector_index_api_key: self
                .vector_index_api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            vector_namespace: self.vector_namespace.clone(),
            batch_size: self.batch_size.max(1),
            concurrency: self.concurrency.max(1),
            summary_max_tokens: self.summary_max_tokens,
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            enable_multiplexing: self
                .enable_multiplexing
                .unwrap_or(defaults.enable_multiplexing),
            retry_max_times: self.retry_max_times.unwrap_or(defaults.retry_max_times),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            completion_url: default_completion_url(),
            embedding_url: default_embedding_url(),
            api_key: None,
            completion_model: default_completion_model(),
            embedding_model: default_embedding_model(),
            vector_index_url: None,
            vector_index_api_key: None,
            vector_namespace: None,
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            summary_max_tokens: default_summary_max_tokens(),
            proxy: None,
            enable_multiplexing: None,
            retry_max_times: None,
        }
    }
}

fn default_completion_url() -> Url {
    Url::parse("https://api.openai.com/v1/chat/completions").expect("valid default completion url")
}

fn default_embedding_url() -> Url {
    Url::parse("https://api.openai.com/v1/embeddings").expect("valid default embedding url")
}

fn default_completion_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_batch_size() -> usize {
    64
}

fn default_concurrency() -> usize {
    4
}

fn default_summary_max_tokens() -> u32 {
    200
}
