//! Catalog import document: the linters, rules and configs LintBase knows about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default)]
    pub linters: Vec<CatalogLinter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogLinter {
    /// npm package name, e.g. `eslint-plugin-react`.
    pub package: String,
    #[serde(default = "default_framework")]
    pub framework: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub rules: Vec<CatalogRule>,
    #[serde(default)]
    pub configs: Vec<CatalogConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRule {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fixable: bool,
    #[serde(default)]
    pub has_suggestions: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub requires_type_checking: bool,
    /// `problem`, `suggestion` or `layout`.
    #[serde(default, rename = "type")]
    pub rule_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// JSON schema of the rule options.
    #[serde(default)]
    pub options: Value,
}

/// A config in the same shape ESLint plugins export it (`rules` keyed by
/// namespaced rule names).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    pub name: String,
    #[serde(default)]
    pub rules: Map<String, Value>,
}

fn default_framework() -> String {
    "eslint".to_string()
}
