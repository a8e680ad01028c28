use backon::ExponentialBuilder;
use futures::{StreamExt, stream};
use governor::{Quota, RateLimiter};
use lintbase_schema::{DownloadPoint, Packument};
use reqwest::header::HeaderMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use super::http::{self, ClientSettings};
use crate::config::RegistryResolvedConfig;
use crate::db::PackageStats;
use crate::error::LintBaseError;

const UPSTREAM: &str = "npm";

/// npm registry (packuments) and download-count API.
#[derive(Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    registry_url: Url,
    downloads_url: Url,
    retry_policy: ExponentialBuilder,
    concurrency: usize,
    tps: usize,
}

impl RegistryClient {
    pub fn new(cfg: &RegistryResolvedConfig) -> Result<Self, LintBaseError> {
        let client = http::build_client(ClientSettings {
            user_agent: concat!("lintbase/", env!("CARGO_PKG_VERSION")),
            proxy: cfg.proxy.as_ref(),
            enable_multiplexing: cfg.enable_multiplexing,
            timeout: Duration::from_secs(30),
        })?;
        Ok(Self {
            client,
            registry_url: cfg.registry_url.clone(),
            downloads_url: cfg.downloads_url.clone(),
            retry_policy: http::retry_policy(cfg.retry_max_times.max(1)),
            concurrency: cfg.concurrency.max(1),
            tps: cfg.tps.max(1),
        })
    }

    /// `GET {registry}/{name}`; scoped names travel as one encoded segment.
    pub async fn packument(&self, name: &str) -> Result<Packument, LintBaseError> {
        let url = http::join_segments(&self.registry_url, [name])?;
        http::get_json(
            UPSTREAM,
            &self.client,
            self.retry_policy,
            &url,
            HeaderMap::new(),
        )
        .await
    }

    /// `GET {downloads}/downloads/point/last-week/{name}`.
    pub async fn weekly_downloads(&self, name: &str) -> Result<DownloadPoint, LintBaseError> {
        let url = http::join_segments(
            &self.downloads_url,
            ["downloads", "point", "last-week"]
                .into_iter()
                .chain(name.split('/')),
        )?;
        http::get_json(
            UPSTREAM,
            &self.client,
            self.retry_policy,
            &url,
            HeaderMap::new(),
        )
        .await
    }

    pub async fn package_stats(&self, name: &str) -> Result<PackageStats, LintBaseError> {
        let (packument, downloads) =
            futures::try_join!(self.packument(name), self.weekly_downloads(name))?;
        Ok(PackageStats {
            name: name.to_string(),
            repository_url: packument.repository_url(),
            description: packument.description,
            homepage: packument.homepage,
            weekly_downloads: Some(downloads.downloads),
        })
    }

    /// Fetches stats for every name with bounded concurrency and a request
    /// rate limit. Packages that fail are logged and left out.
    pub async fn sync_package_stats(&self, names: Vec<String>) -> Vec<PackageStats> {
        let tps = u32::try_from(self.tps).unwrap_or(u32::MAX);
        let burst = u32::try_from(self.tps.saturating_mul(2)).unwrap_or(u32::MAX);
        let quota = match (NonZeroU32::new(tps), NonZeroU32::new(burst)) {
            (Some(tps), Some(burst)) => Quota::per_second(tps).allow_burst(burst),
            _ => Quota::per_second(NonZeroU32::MIN),
        };
        let limiter = Arc::new(RateLimiter::direct(quota));

        info!(
            packages = names.len(),
            concurrency = self.concurrency,
            tps = self.tps,
            "[npm] Package stats sync started"
        );

        let results: Vec<Option<PackageStats>> = stream::iter(names)
            .map(|name| {
                let limiter = limiter.clone();
                async move {
                    limiter.until_ready().await;
                    match self.package_stats(&name).await {
                        Ok(stats) => Some(stats),
                        Err(err) => {
                            warn!(package = %name, error = %err, "[npm] Package stats fetch failed, skipping");
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }
}
