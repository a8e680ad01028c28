use serde::{Deserialize, Serialize};
use url::Url;

use super::UpstreamDefaults;

/// npm registry configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Packument base URL.
    /// TOML: `upstreams.registry.registry_url`. Default: `https://registry.npmjs.org`.
    #[serde(default = "default_registry_url")]
    pub registry_url: Url,

    /// Download-count API base URL.
    /// TOML: `upstreams.registry.downloads_url`. Default: `https://api.npmjs.org`.
    #[serde(default = "default_downloads_url")]
    pub downloads_url: Url,

    /// Max in-flight package lookups during a batch sync.
    /// TOML: `upstreams.registry.concurrency`. Default: `10`.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Registry requests per second during a batch sync.
    /// TOML: `upstreams.registry.tps`. Default: `20`.
    #[serde(default = "default_tps")]
    pub tps: usize,

    #[serde(default)]
    pub proxy: Option<Url>,

    #[serde(default)]
    pub enable_multiplexing: Option<bool>,

    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct RegistryResolvedConfig {
    pub registry_url: Url,
    pub downloads_url: Url,
    pub concurrency: usize,
    pub tps: usize,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub retry_max_times: usize,
}

impl RegistryConfig {
    pub fn resolve(&self, defaults: &UpstreamDefaults) -> RegistryResolvedConfig {
        RegistryResolvedConfig {
            registry_url: self.registry_url.clone(),
            downloads_url: self.downloads_url.clone(),
            concurrency: self.concurrency.max(1),
            tps: self.tps.max(1),
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            enable_multiplexing: self
                .enable_multiplexing
                .unwrap_or(defaults.enable_multiplexing),
            retry_max_times: self.retry_max_times.unwrap_or(defaults.retry_max_times),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            downloads_url: default_downloads_url(),
            concurrency: default_concurrency(),
            tps: default_tps(),
            proxy: None,
            enable_multiplexing: None,
            retry_max_times: None,
        }
    }
}

fn default_registry_url() -> Url {
    Url::parse("https://registry.npmjs.org").expect("valid default registry url")
}

fn default_downloads_url() -> Url {
    Url::parse("https://api.npmjs.org").expect("valid default downloads url")
}

fn default_concurrency() -> usize {
    10
}

fn default_tps() -> usize {
    20
}
