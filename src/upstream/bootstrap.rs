use std::sync::Arc;
use tracing::info;

use super::http::{self, ClientSettings};
use super::{AiClient, DiscordClient, GithubClient, RegistryClient};
use std::time::Duration;
use crate::config::Config;
use crate::error::LintBaseError;

/// Aggregates every upstream client; cloned into the router state.
#[derive(Clone)]
pub struct Upstreams {
    pub github: GithubClient,
    pub registry: RegistryClient,
    pub ai: AiClient,
    pub discord: DiscordClient,
    /// Plain client for OAuth token endpoints (no retries, redirects disabled).
    pub oauth: reqwest::Client,
}

impl Upstreams {
    pub fn from_config(cfg: &Config) -> Result<Self, LintBaseError> {
        let defaults = &cfg.upstreams.defaults;
        let github_cfg = cfg.github();
        let registry_cfg = cfg.registry();
        let ai_cfg = Arc::new(cfg.ai());

        // Log resolved upstream configs here so `main` stays wiring-only.
        info!(
            upstreams_defaults_proxy = %defaults.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
            upstreams_defaults_enable_multiplexing = defaults.enable_multiplexing,
            upstreams_defaults_retry_max_times = defaults.retry_max_times,
            "Upstream defaults loaded"
        );
        info!(
            github_api_url = %github_cfg.api_url,
            github_token = github_cfg.token.is_some(),
            github_retry_max_times = github_cfg.retry_max_times,
            "GitHub config (effective)"
        );
        info!(
            registry_url = %registry_cfg.registry_url,
            downloads_url = %registry_cfg.downloads_url,
            registry_concurrency = registry_cfg.concurrency,
            registry_tps = registry_cfg.tps,
            "npm registry config (effective)"
        );
        info!(
            ai_api_key = ai_cfg.api_key.is_some(),
            ai_completion_model = %ai_cfg.completion_model,
            ai_embedding_model = %ai_cfg.embedding_model,
            vector_index = %ai_cfg.vector_index_url.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
            "AI config (effective)"
        );

        Ok(Self {
            github: GithubClient::new(&github_cfg)?,
            registry: RegistryClient::new(&registry_cfg)?,
            ai: AiClient::new(ai_cfg)?,
            discord: DiscordClient::new(defaults)?,
            oauth: http::build_client(ClientSettings {
                user_agent: concat!("lintbase/", env!("CARGO_PKG_VERSION")),
                proxy: defaults.proxy.as_ref(),
                enable_multiplexing: defaults.enable_multiplexing,
                timeout: Duration::from_secs(20),
            })?,
        })
    }
}
