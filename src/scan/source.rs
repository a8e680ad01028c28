use async_trait::async_trait;
use lintbase_schema::{GithubCommitSummary, GithubContentEntry, GithubFileContent};

use crate::error::LintBaseError;
use crate::upstream::GithubClient;

/// Read access to one hosted repository's default branch.
#[async_trait]
pub trait RepositoryContentSource: Send + Sync {
    async fn latest_commit(
        &self,
        full_name: &str,
    ) -> Result<Option<GithubCommitSummary>, LintBaseError>;

    async fn list_root(&self, full_name: &str) -> Result<Vec<GithubContentEntry>, LintBaseError>;

    async fn read_file(
        &self,
        full_name: &str,
        path: &str,
    ) -> Result<GithubFileContent, LintBaseError>;
}

/// GitHub contents API on behalf of one user.
pub struct GithubContentSource {
    client: GithubClient,
    user_token: Option<String>,
}

impl GithubContentSource {
    pub fn new(client: GithubClient, user_token: Option<String>) -> Self {
        Self { client, user_token }
    }
}

#[async_trait]
impl RepositoryContentSource for GithubContentSource {
    async fn latest_commit(
        &self,
        full_name: &str,
    ) -> Result<Option<GithubCommitSummary>, LintBaseError> {
        self.client
            .latest_commit(self.user_token.as_deref(), full_name)
            .await
    }

    async fn list_root(&self, full_name: &str) -> Result<Vec<GithubContentEntry>, LintBaseError> {
        self.client
            .list_root(self.user_token.as_deref(), full_name)
            .await
    }

    async fn read_file(
        &self,
        full_name: &str,
        path: &str,
    ) -> Result<GithubFileContent, LintBaseError> {
        self.client
            .get_file(self.user_token.as_deref(), full_name, path)
            .await
    }
}
