//! npm registry payloads (`registry.npmjs.org` and `api.npmjs.org`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Abbreviated view of a packument (`GET /{name}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Packument {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: BTreeMap<String, String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub repository: Option<PackumentRepository>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PackumentRepository {
    Url(String),
    Object {
        #[serde(default, rename = "type")]
        kind: Option<String>,
        url: String,
    },
}

impl Packument {
    pub fn latest_version(&self) -> Option<&str> {
        self.dist_tags.get("latest").map(String::as_str)
    }

    /// Repository url with the `git+` scheme prefix and `.git` suffix removed.
    pub fn repository_url(&self) -> Option<String> {
        let raw = match self.repository.as_ref()? {
            PackumentRepository::Url(url) => url.as_str(),
            PackumentRepository::Object { url, .. } => url.as_str(),
        };
        let url = raw.strip_prefix("git+").unwrap_or(raw);
        let url = url.strip_suffix(".git").unwrap_or(url);
        Some(url.to_string())
    }
}

/// `GET /downloads/point/{period}/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadPoint {
    pub downloads: i64,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    pub package: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_url_is_normalized() {
        let packument: Packument = serde_json::from_str(
            r#"{
                "name": "eslint-plugin-react",
                "dist-tags": { "latest": "7.33.2" },
                "repository": { "type": "git", "url": "git+https://github.com/jsx-eslint/eslint-plugin-react.git" }
            }"#,
        )
        .expect("valid packument");

        assert_eq!(packument.latest_version(), Some("7.33.2"));
        assert_eq!(
            packument.repository_url().as_deref(),
            Some("https://github.com/jsx-eslint/eslint-plugin-react")
        );
    }

    #[test]
    fn repository_may_be_a_plain_string() {
        let packument: Packument =
            serde_json::from_str(r#"{ "name": "x", "repository": "github:acme/x" }"#)
                .expect("valid packument");
        assert_eq!(packument.repository_url().as_deref(), Some("github:acme/x"));
    }
}
