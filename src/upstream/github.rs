use backon::ExponentialBuilder;
use lintbase_schema::{
    GithubCommitSummary, GithubContentEntry, GithubFileContent, GithubRepository, GithubUser,
};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::time::Duration;
use url::Url;

use super::http::{self, ClientSettings};
use crate::config::GithubResolvedConfig;
use crate::error::LintBaseError;

const UPSTREAM: &str = "github";

/// GitHub REST client. Calls authenticate with the caller's OAuth token,
/// falling back to the configured personal access token.
#[derive(Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    api_url: Url,
    token: Option<String>,
    retry_policy: ExponentialBuilder,
}

impl GithubClient {
    pub fn new(cfg: &GithubResolvedConfig) -> Result<Self, LintBaseError> {
        let client = http::build_client(ClientSettings {
            user_agent: concat!("lintbase/", env!("CARGO_PKG_VERSION")),
            proxy: cfg.proxy.as_ref(),
            enable_multiplexing: cfg.enable_multiplexing,
            timeout: Duration::from_secs(20),
        })?;
        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            token: cfg.token.clone(),
            retry_policy: http::retry_policy(cfg.retry_max_times.max(1)),
        })
    }

    fn headers(&self, user_token: Option<&str>) -> Result<HeaderMap, LintBaseError> {
        let mut headers = http::bearer_headers(user_token.or(self.token.as_deref()))?;
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    fn repo_url(&self, full_name: &str, rest: &[&str]) -> Result<Url, LintBaseError> {
        let (owner, repo) = split_full_name(full_name)?;
        http::join_segments(
            &self.api_url,
            ["repos", owner, repo].into_iter().chain(rest.iter().copied()),
        )
    }

    /// Most recent commit on the default branch; `None` for an empty repository.
    pub async fn latest_commit(
        &self,
        user_token: Option<&str>,
        full_name: &str,
    ) -> Result<Option<GithubCommitSummary>, LintBaseError> {
        let mut url = self.repo_url(full_name, &["commits"])?;
        url.query_pairs_mut().append_pair("per_page", "1");

        let result: Result<Vec<GithubCommitSummary>, _> = http::get_json(
            UPSTREAM,
            &self.client,
            self.retry_policy,
            &url,
            self.headers(user_token)?,
        )
        .await;
        match result {
            Ok(commits) => Ok(commits.into_iter().next()),
            // 409 Conflict: "Git Repository is empty."
            Err(LintBaseError::UpstreamStatus(StatusCode::CONFLICT)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Files and directories at the repository root.
    pub async fn list_root(
        &self,
        user_token: Option<&str>,
        full_name: &str,
    ) -> Result<Vec<GithubContentEntry>, LintBaseError> {
        let url = self.repo_url(full_name, &["contents", ""])?;
        http::get_json(
            UPSTREAM,
            &self.client,
            self.retry_policy,
            &url,
            self.headers(user_token)?,
        )
        .await
    }

    /// Raw (base64) file payload at `path`.
    pub async fn get_file(
        &self,
        user_token: Option<&str>,
        full_name: &str,
        path: &str,
    ) -> Result<GithubFileContent, LintBaseError> {
        let mut rest = vec!["contents"];
        rest.extend(path.split('/').filter(|s| !s.is_empty()));
        let url = self.repo_url(full_name, &rest)?;
        http::get_json(
            UPSTREAM,
            &self.client,
            self.retry_policy,
            &url,
            self.headers(user_token)?,
        )
        .await
    }

    /// Repositories the token's user owns or collaborates on, most recently pushed first.
    pub async fn list_user_repositories(
        &self,
        user_token: Option<&str>,
    ) -> Result<Vec<GithubRepository>, LintBaseError> {
        let mut url = http::join_segments(&self.api_url, ["user", "repos"])?;
        url.query_pairs_mut()
            .append_pair("sort", "pushed")
            .append_pair("per_page", "100");
        http::get_json(
            UPSTREAM,
            &self.client,
            self.retry_policy,
            &url,
            self.headers(user_token)?,
        )
        .await
    }

    pub async fn get_user(&self, user_token: &str) -> Result<GithubUser, LintBaseError> {
        let url = http::join_segments(&self.api_url, ["user"])?;
        http::get_json(
            UPSTREAM,
            &self.client,
            self.retry_policy,
            &url,
            self.headers(Some(user_token))?,
        )
        .await
    }
}

/// `owner/repo` -> `(owner, repo)`.
pub(crate) fn split_full_name(full_name: &str) -> Result<(&str, &str), LintBaseError> {
    let invalid = || LintBaseError::BadRequest(format!("invalid repository name: {full_name}"));
    let (owner, repo) = full_name.split_once('/').ok_or_else(invalid)?;
    let valid = |s: &str| {
        !s.is_empty()
            && s != "."
            && s != ".."
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if valid(owner) && valid(repo) {
        Ok((owner, repo))
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_validation() {
        assert_eq!(split_full_name("octo/hello.js").unwrap(), ("octo", "hello.js"));
        assert!(split_full_name("octo").is_err());
        assert!(split_full_name("octo/hello/extra").is_err());
        assert!(split_full_name("octo/..").is_err());
        assert!(split_full_name("/hello").is_err());
    }

    #[test]
    fn repo_urls() {
        let client = GithubClient::new(&crate::config::Config::default().github()).unwrap();
        let url = client.repo_url("octo/hello", &["contents", ".eslintrc.json"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/hello/contents/.eslintrc.json"
        );
    }
}
