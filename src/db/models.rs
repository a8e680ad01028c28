use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbUser {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbRepository {
    pub id: i64,
    #[serde(skip_serializing)]
    pub owner_id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub size: Option<i64>,
    pub commit_sha: Option<String>,
    pub committed_at: Option<DateTime<Utc>>,
    pub scanned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbPackage {
    pub id: i64,
    pub name: String,
    pub ecosystem: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub repository_url: Option<String>,
    pub weekly_downloads: Option<i64>,
    pub stars: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

/// A linter joined with its package, framework and child counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LinterRow {
    pub id: i64,
    pub package_id: i64,
    pub package_name: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub repository_url: Option<String>,
    pub weekly_downloads: Option<i64>,
    pub framework: String,
    pub summary: Option<String>,
    pub rule_count: i64,
    pub config_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RuleRow {
    pub id: i64,
    pub linter_id: i64,
    pub package_name: String,
    pub name: String,
    pub description: Option<String>,
    pub fixable: bool,
    pub has_suggestions: bool,
    pub deprecated: bool,
    pub requires_type_checking: bool,
    pub rule_type: Option<String>,
    pub url: Option<String>,
    /// JSON text of the rule's options schema.
    #[serde(skip_serializing)]
    pub options: String,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRow {
    pub id: i64,
    pub linter_id: i64,
    pub package_name: String,
    pub name: String,
    pub rule_count: i64,
}

/// One rule severity inside a config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRuleRow {
    pub rule_id: i64,
    pub package_name: String,
    pub rule_name: String,
    pub severity: i64,
}

/// One config that enables a given rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfigRow {
    pub config_id: i64,
    pub config_name: String,
    pub linter_id: i64,
    pub package_name: String,
    pub severity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LocalPackageRow {
    pub id: i64,
    pub path: String,
    pub name: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LocalFrameworkRow {
    pub local_package_id: i64,
    pub framework: String,
    pub config_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LocalLinterRow {
    pub local_package_id: i64,
    pub linter_id: i64,
    pub package_name: String,
    pub is_present: bool,
    pub is_suggested: bool,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LocalConfigRow {
    pub local_package_id: i64,
    pub config_id: i64,
    pub linter_id: i64,
    pub package_name: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LocalRuleRow {
    pub local_package_id: i64,
    pub rule_id: i64,
    pub package_name: String,
    pub name: String,
    pub severity: i64,
    /// JSON array text of the rule's configured options.
    #[serde(skip_serializing)]
    pub options: String,
}

/// A catalog entry to be embedded: `linter:<id>` or `rule:<id>` plus its text.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EmbeddingDocument {
    pub id: String,
    pub text: String,
}

/// A user resolved through an unexpired session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbSessionUser {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    #[serde(skip_serializing)]
    pub expires_at: DateTime<Utc>,
}
