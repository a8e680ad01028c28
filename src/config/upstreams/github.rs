use serde::{Deserialize, Serialize};
use url::Url;

use super::UpstreamDefaults;

/// GitHub upstream configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GithubConfig {
    /// REST API base URL.
    /// TOML: `upstreams.github.api_url`. Default: `https://api.github.com`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Personal access token used when the session user has no GitHub account token.
    /// TOML: `upstreams.github.token`.
    #[serde(default)]
    pub token: Option<String>,

    /// Falls back to `upstreams.defaults.proxy` when unset.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Falls back to `upstreams.defaults.enable_multiplexing`.
    #[serde(default)]
    pub enable_multiplexing: Option<bool>,

    /// Falls back to `upstreams.defaults.retry_max_times`.
    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct GithubResolvedConfig {
    pub api_url: Url,
    pub token: Option<String>,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub retry_max_times: usize,
}

impl GithubConfig {
    pub fn resolve(&self, defaults: &UpstreamDefaults) -> GithubResolvedConfig {
        GithubResolvedConfig {
            api_url: self.api_url.clone(),
            token: self.token.clone().filter(|t| !t.trim().is_empty()),
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            enable_multiplexing: self
                .enable_multiplexing
                .unwrap_or(defaults.enable_multiplexing),
            retry_max_times: self.retry_max_times.unwrap_or(defaults.retry_max_times),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            proxy: None,
            enable_multiplexing: None,
            retry_max_times: None,
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://api.github.com").expect("valid default GitHub API url")
}
