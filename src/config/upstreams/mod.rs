mod ai;
mod github;
mod registry;

pub use ai::{AiConfig, AiResolvedConfig};
pub use github::{GithubConfig, GithubResolvedConfig};
pub use registry::{RegistryConfig, RegistryResolvedConfig};

use serde::{Deserialize, Serialize};
use url::Url;

/// Global upstream defaults (used when upstream-level config is unset).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamDefaults {
    /// Optional upstream HTTP proxy. If set, used for reqwest clients.
    /// TOML: `upstreams.defaults.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing for reqwest clients; disabled forces HTTP/1.
    /// TOML: `upstreams.defaults.enable_multiplexing`. Default: `false`.
    #[serde(default = "default_enable_multiplexing")]
    pub enable_multiplexing: bool,

    /// Max retry attempts for upstream calls.
    /// TOML: `upstreams.defaults.retry_max_times`. Default: `3`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,
}

impl Default for UpstreamDefaults {
    fn default() -> Self {
        Self {
            proxy: None,
            enable_multiplexing: default_enable_multiplexing(),
            retry_max_times: default_retry_max_times(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct UpstreamsConfig {
    #[serde(default)]
    pub defaults: UpstreamDefaults,

    /// GitHub REST API.
    #[serde(default)]
    pub github: GithubConfig,

    /// npm registry and download-count API.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Chat completion, embedding and vector index endpoints.
    #[serde(default)]
    pub ai: AiConfig,
}

fn default_enable_multiplexing() -> bool {
    false
}

fn default_retry_max_times() -> usize {
    3
}
