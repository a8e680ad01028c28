use serde::{Deserialize, Serialize};

/// OAuth app credentials for one sign-in provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OauthClientConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

impl OauthClientConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// TOML: `auth.github.{client_id,client_secret}`.
    #[serde(default)]
    pub github: OauthClientConfig,

    /// TOML: `auth.discord.{client_id,client_secret}`.
    #[serde(default)]
    pub discord: OauthClientConfig,

    /// User ids allowed to call admin endpoints in production.
    /// TOML: `auth.admin_user_ids`. Default: empty.
    #[serde(default)]
    pub admin_user_ids: Vec<i64>,
}

impl AuthConfig {
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_user_ids.contains(&user_id)
    }
}
