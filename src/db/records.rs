//! Write payloads and query inputs accepted by the database actor.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{
    ConfigRow, ConfigRuleRow, DbRepository, LinterRow, LocalConfigRow, LocalFrameworkRow,
    LocalLinterRow, LocalPackageRow, LocalRuleRow, RuleConfigRow, RuleRow,
};
use super::page::PageRequest;

/// Profile returned by a sign-in provider, plus the account's access token.
#[derive(Debug, Clone)]
pub struct OauthProfile {
    pub provider: String,
    pub provider_account_id: String,
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryCreate {
    pub owner_id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub size: Option<i64>,
    pub commit_sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinterEnablement {
    pub linter_id: i64,
    pub is_present: bool,
    pub is_suggested: bool,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEnablement {
    pub rule_id: i64,
    pub severity: i64,
    /// JSON array text.
    pub options: String,
}

/// Everything one scan of a repository root produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPackageSnapshot {
    pub path: String,
    pub name: Option<String>,
    pub version: Option<String>,
    pub framework: String,
    pub config_path: String,
    pub linters: Vec<LinterEnablement>,
    pub config_ids: Vec<i64>,
    pub rules: Vec<RuleEnablement>,
}

/// Replaces every LocalPackage-derived row of `(owner_id, full_name)`.
#[derive(Debug, Clone)]
pub struct RepositorySnapshot {
    pub owner_id: i64,
    pub full_name: String,
    pub commit_sha: Option<String>,
    pub committed_at: Option<DateTime<Utc>>,
    pub scanned_at: DateTime<Utc>,
    pub local_package: LocalPackageSnapshot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCounts {
    pub linters: usize,
    pub configs: usize,
    pub rules: usize,
}

/// A stored repository with its current scan snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySnapshotView {
    pub repository: DbRepository,
    pub local_packages: Vec<LocalPackageRow>,
    pub frameworks: Vec<LocalFrameworkRow>,
    pub linters: Vec<LocalLinterRow>,
    pub configs: Vec<LocalConfigRow>,
    pub rules: Vec<LocalRuleRow>,
}

/// Catalog ids of a set of linter packages, keyed by package name.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    pub linters: AHashMap<String, i64>,
    /// `(package name, config name)` -> config id
    pub configs: AHashMap<(String, String), i64>,
    /// `(package name, rule name)` -> rule id
    pub rules: AHashMap<(String, String), i64>,
}

impl CatalogIndex {
    pub fn linter_id(&self, package: &str) -> Option<i64> {
        self.linters.get(package).copied()
    }

    pub fn config_id(&self, package: &str, config: &str) -> Option<i64> {
        self.configs
            .get(&(package.to_string(), config.to_string()))
            .copied()
    }

    pub fn rule_id(&self, package: &str, rule: &str) -> Option<i64> {
        self.rules
            .get(&(package.to_string(), rule.to_string()))
            .copied()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub linters: usize,
    pub rules: usize,
    pub configs: usize,
    pub rule_configs: usize,
    pub unresolved_rule_configs: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedDeletion {
    pub local_packages: u64,
    pub repositories_reset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageStats {
    pub name: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub repository_url: Option<String>,
    pub weekly_downloads: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinterQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub fixable: Option<bool>,
    #[serde(default)]
    pub deprecated: Option<bool>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

macro_rules! impl_page_request {
    ($($query:ty),+) => {
        $(impl $query {
            pub fn page_request(&self) -> PageRequest {
                PageRequest {
                    page: self.page,
                    per_page: self.per_page,
                }
            }
        })+
    };
}

impl_page_request!(LinterQuery, RuleQuery, SearchQuery);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinterDetail {
    pub linter: LinterRow,
    pub configs: Vec<ConfigRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDetail {
    pub rule: RuleRow,
    pub configs: Vec<RuleConfigRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDetail {
    pub config: ConfigRow,
    pub rules: Vec<ConfigRuleRow>,
}
