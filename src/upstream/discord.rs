use backon::ExponentialBuilder;
use lintbase_schema::DiscordUser;
use std::time::Duration;
use url::Url;

use super::http::{self, ClientSettings};
use crate::config::UpstreamDefaults;
use crate::error::LintBaseError;

const UPSTREAM: &str = "discord";
const DISCORD_API_URL: &str = "https://discord.com/api/";

/// Discord REST client, only used to read the signed-in user's profile.
#[derive(Clone)]
pub struct DiscordClient {
    client: reqwest::Client,
    api_url: Url,
    retry_policy: ExponentialBuilder,
}

impl DiscordClient {
    pub fn new(defaults: &UpstreamDefaults) -> Result<Self, LintBaseError> {
        let client = http::build_client(ClientSettings {
            user_agent: concat!("lintbase/", env!("CARGO_PKG_VERSION")),
            proxy: defaults.proxy.as_ref(),
            enable_multiplexing: defaults.enable_multiplexing,
            timeout: Duration::from_secs(20),
        })?;
        Ok(Self {
            client,
            api_url: Url::parse(DISCORD_API_URL)?,
            retry_policy: http::retry_policy(defaults.retry_max_times.max(1)),
        })
    }

    pub async fn get_user(&self, access_token: &str) -> Result<DiscordUser, LintBaseError> {
        let url = http::join_segments(&self.api_url, ["users", "@me"])?;
        http::get_json(
            UPSTREAM,
            &self.client,
            self.retry_policy,
            &url,
            http::bearer_headers(Some(access_token))?,
        )
        .await
    }
}
