use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use url::Url;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Default: `8190`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Database URL for SQLite.
    /// TOML: `basic.database_url`. Default: `sqlite://lintbase.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Deployment environment. Admin endpoints are open to every signed-in
    /// user outside production.
    /// TOML: `basic.environment`. Default: `development`.
    #[serde(default)]
    pub environment: Environment,

    /// Externally visible base URL, used to build OAuth redirect URLs.
    /// TOML: `basic.public_url`. Default: `http://localhost:8190`.
    #[serde(default = "default_public_url")]
    pub public_url: Url,

    /// Secret (at least 64 bytes) for private cookies. A random key is
    /// generated when unset, which signs everyone out on restart.
    /// TOML: `basic.cookie_secret`.
    #[serde(default)]
    pub cookie_secret: Option<String>,

    /// Session lifetime in days.
    /// TOML: `basic.session_ttl_days`. Default: `30`.
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,

    /// Drop the `Secure` flag from cookies (plain-HTTP local development).
    /// TOML: `basic.insecure_cookie`. Default: `false`.
    #[serde(default)]
    pub insecure_cookie: bool,
}

impl BasicConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_url: default_database_url(),
            loglevel: default_loglevel(),
            environment: Environment::default(),
            public_url: default_public_url(),
            cookie_secret: None,
            session_ttl_days: default_session_ttl_days(),
            insecure_cookie: false,
        }
    }
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    8190
}

fn default_database_url() -> String {
    "sqlite://lintbase.db".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_public_url() -> Url {
    Url::parse("http://localhost:8190").expect("valid default public url")
}

fn default_session_ttl_days() -> i64 {
    30
}
