mod auth;
mod basic;
mod linters;
mod upstreams;

pub use auth::{AuthConfig, OauthClientConfig};
pub use basic::{BasicConfig, Environment};
pub use linters::LintersConfig;
pub use upstreams::{
    AiConfig, AiResolvedConfig, GithubConfig, GithubResolvedConfig, RegistryConfig,
    RegistryResolvedConfig, UpstreamDefaults, UpstreamsConfig,
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Sign-in providers and admin allowlist (see `auth` table in config.toml).
    #[serde(default)]
    pub auth: AuthConfig,

    /// GitHub, npm registry and AI endpoints (see `upstreams` table in config.toml).
    #[serde(default)]
    pub upstreams: UpstreamsConfig,

    /// Linter lookup table source (see `linters` table in config.toml).
    #[serde(default)]
    pub linters: LintersConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "LINTBASE_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and
    /// `LINTBASE_`-prefixed environment variables (`__` separates nested keys,
    /// e.g. `LINTBASE_AUTH__GITHUB__CLIENT_SECRET`).
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from defaults, `config.toml` (if present) and the environment.
    pub fn from_optional_toml() -> Self {
        Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml + env): {err}")
        })
    }

    pub fn github(&self) -> GithubResolvedConfig {
        self.upstreams.github.resolve(&self.upstreams.defaults)
    }

    pub fn registry(&self) -> RegistryResolvedConfig {
        self.upstreams.registry.resolve(&self.upstreams.defaults)
    }

    pub fn ai(&self) -> AiResolvedConfig {
        self.upstreams.ai.resolve(&self.upstreams.defaults)
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::from_optional_toml);
