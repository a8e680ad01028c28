//! GitHub REST v3 payloads consumed by the repository scanner.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of `GET /repos/{owner}/{repo}/contents/{dir}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubContentEntry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: GithubContentKind,
    #[serde(default)]
    pub size: u64,
}

impl GithubContentEntry {
    pub fn is_file(&self) -> bool {
        self.kind == GithubContentKind::File
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GithubContentKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// `GET /repos/{owner}/{repo}/contents/{path}` for a single file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubFileContent {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentDecodeError {
    /// GitHub omits the body for files above 1 MB and reports `encoding: "none"`.
    UnsupportedEncoding(String),
    Base64(String),
    Utf8,
}

impl fmt::Display for ContentDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedEncoding(enc) => write!(f, "unsupported content encoding: {enc:?}"),
            Self::Base64(msg) => write!(f, "invalid base64 content: {msg}"),
            Self::Utf8 => f.write_str("content is not valid UTF-8"),
        }
    }
}

impl std::error::Error for ContentDecodeError {}

impl GithubFileContent {
    /// Decode the (line-wrapped) base64 body into text.
    pub fn decode(&self) -> Result<String, ContentDecodeError> {
        if self.encoding != "base64" {
            return Err(ContentDecodeError::UnsupportedEncoding(
                self.encoding.clone(),
            ));
        }
        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ContentDecodeError::Base64(e.to_string()))?;
        String::from_utf8(bytes).map_err(|_| ContentDecodeError::Utf8)
    }
}

/// Element of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubCommitSummary {
    pub sha: String,
    pub commit: GithubCommitDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubCommitDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<GithubSignature>,
    #[serde(default)]
    pub committer: Option<GithubSignature>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubSignature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl GithubCommitSummary {
    /// Committer date, falling back to the author date.
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        self.commit
            .committer
            .as_ref()
            .and_then(|s| s.date)
            .or_else(|| self.commit.author.as_ref().and_then(|s| s.date))
    }
}

/// Element of `GET /user/repos`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubRepository {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

/// `GET /user`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubUser {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_line_wrapped_base64_content() {
        let file: GithubFileContent = serde_json::from_value(json!({
            "name": "package.json",
            "path": "package.json",
            "sha": "abc",
            "content": "eyJuYW1lIjoi\nd2ViIn0=\n",
            "encoding": "base64"
        }))
        .expect("valid payload");

        assert_eq!(file.decode().as_deref(), Ok(r#"{"name":"web"}"#));
    }

    #[test]
    fn large_files_without_body_are_rejected() {
        let file = GithubFileContent {
            name: "big.json".to_string(),
            path: "big.json".to_string(),
            sha: String::new(),
            content: String::new(),
            encoding: "none".to_string(),
        };

        assert_eq!(
            file.decode(),
            Err(ContentDecodeError::UnsupportedEncoding("none".to_string()))
        );
    }

    #[test]
    fn unknown_entry_kinds_deserialize_as_other() {
        let entry: GithubContentEntry = serde_json::from_value(json!({
            "name": "x",
            "path": "x",
            "type": "worktree"
        }))
        .expect("valid payload");

        assert_eq!(entry.kind, GithubContentKind::Other);
        assert!(!entry.is_file());
    }

    #[test]
    fn committed_at_falls_back_to_author_date() {
        let commit: GithubCommitSummary = serde_json::from_value(json!({
            "sha": "deadbeef",
            "commit": {
                "message": "init",
                "author": { "name": "a", "date": "2024-03-01T10:00:00Z" },
                "committer": null
            }
        }))
        .expect("valid payload");

        assert_eq!(
            commit.committed_at().map(|d| d.to_rfc3339()),
            Some("2024-03-01T10:00:00+00:00".to_string())
        );
    }
}
