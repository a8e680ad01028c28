use crate::db::{DbRepository, LocalConfigRow, RepositoryCreate, RepositorySnapshotView};
use crate::error::LintBaseError;
use crate::present::config_emojis;
use crate::scan::{GithubContentSource, RefreshOutcome, refresh_repository};
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::guards::{MaybeSession, SessionUser};
use crate::server::router::LintBaseState;
use crate::upstream::split_full_name;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

const GITHUB_PROVIDER: &str = "github";

pub fn router() -> Router<LintBaseState> {
    Router::new()
        .route("/api/repository:add", post(repository_add))
        .route("/api/repository:refresh", post(repository_refresh))
        .route("/api/repository:remove", post(repository_remove))
        .route("/api/repositories", get(repositories_list))
        .route("/api/repositories/{owner}/{repo}", get(repository_snapshot))
        .route("/api/github/repositories", get(github_repositories))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRepositoryBody {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub commit_sha: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullNameBody {
    pub full_name: String,
}

/// POST /api/repository:add
pub async fn repository_add(
    State(state): State<LintBaseState>,
    session: SessionUser,
    ApiJson(body): ApiJson<AddRepositoryBody>,
) -> Result<Json<DbRepository>, LintBaseError> {
    let (_, repo_name) = split_full_name(&body.full_name)?;
    if body.name.trim().is_empty() {
        return Err(LintBaseError::BadRequest("name must not be empty".to_string()));
    }
    if repo_name != body.name {
        return Err(LintBaseError::BadRequest(format!(
            "name `{}` does not match fullName `{}`",
            body.name, body.full_name
        )));
    }

    let repository = state
        .db
        .add_repository(RepositoryCreate {
            owner_id: session.id(),
            name: body.name,
            full_name: body.full_name,
            description: body.description,
            language: body.language,
            size: body.size,
            commit_sha: body.commit_sha,
        })
        .await?;
    info!(user_id = session.id(), full_name = %repository.full_name, "repository added");
    Ok(Json(repository))
}

/// POST /api/repository:refresh
pub async fn repository_refresh(
    State(state): State<LintBaseState>,
    session: SessionUser,
    ApiJson(body): ApiJson<FullNameBody>,
) -> Result<Json<RefreshOutcome>, LintBaseError> {
    split_full_name(&body.full_name)?;
    let user_token = state
        .db
        .get_account_token(session.id(), GITHUB_PROVIDER)
        .await?;
    let source = GithubContentSource::new(state.upstreams.github.clone(), user_token);

    let outcome = refresh_repository(
        &state.db,
        &state.linter_table,
        &source,
        session.id(),
        &body.full_name,
    )
    .await?;
    Ok(Json(outcome))
}

/// POST /api/repository:remove
pub async fn repository_remove(
    State(state): State<LintBaseState>,
    session: SessionUser,
    ApiJson(body): ApiJson<FullNameBody>,
) -> Result<StatusCode, LintBaseError> {
    state
        .db
        .remove_repository(session.id(), &body.full_name)
        .await?;
    info!(user_id = session.id(), full_name = %body.full_name, "repository removed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/repositories
///
/// Empty for anonymous requests.
pub async fn repositories_list(
    State(state): State<LintBaseState>,
    MaybeSession(session): MaybeSession,
) -> Result<Json<Vec<DbRepository>>, LintBaseError> {
    let Some(session) = session else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.db.list_repositories(session.id()).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalConfigView {
    #[serde(flatten)]
    pub config: LocalConfigRow,
    pub emoji: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySnapshotResponse {
    #[serde(flatten)]
    pub snapshot: RepositorySnapshotView,
    pub config_views: Vec<LocalConfigView>,
}

impl From<RepositorySnapshotView> for RepositorySnapshotResponse {
    fn from(snapshot: RepositorySnapshotView) -> Self {
        let emojis = config_emojis(snapshot.configs.iter().map(|c| c.name.as_str()));
        let config_views = snapshot
            .configs
            .iter()
            .map(|config| LocalConfigView {
                emoji: emojis.get(&config.name).copied().unwrap_or_default(),
                config: config.clone(),
            })
            .collect();
        Self {
            snapshot,
            config_views,
        }
    }
}

/// GET /api/repositories/{owner}/{repo}
pub async fn repository_snapshot(
    State(state): State<LintBaseState>,
    session: SessionUser,
    ApiPath((owner, repo)): ApiPath<(String, String)>,
) -> Result<Json<RepositorySnapshotResponse>, LintBaseError> {
    let full_name = format!("{owner}/{repo}");
    let snapshot = state
        .db
        .load_snapshot(session.id(), &full_name)
        .await?
        .ok_or_else(|| LintBaseError::not_found("Repository"))?;
    Ok(Json(snapshot.into()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubRepositoryView {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub size: i64,
    pub private: bool,
    pub pushed_at: Option<DateTime<Utc>>,
    /// Already added to LintBase by this user.
    pub connected: bool,
}

/// GET /api/github/repositories
pub async fn github_repositories(
    State(state): State<LintBaseState>,
    session: SessionUser,
) -> Result<Json<Vec<GithubRepositoryView>>, LintBaseError> {
    let token = state
        .db
        .get_account_token(session.id(), GITHUB_PROVIDER)
        .await?
        .ok_or_else(|| {
            LintBaseError::BadRequest("Sign in with GitHub to list repositories".to_string())
        })?;

    let remote = state
        .upstreams
        .github
        .list_user_repositories(Some(&token))
        .await?;
    let connected: HashSet<String> = state
        .db
        .list_repositories(session.id())
        .await?
        .into_iter()
        .map(|r| r.full_name)
        .collect();

    let views = remote
        .into_iter()
        .map(|r| GithubRepositoryView {
            connected: connected.contains(&r.full_name),
            name: r.name,
            full_name: r.full_name,
            description: r.description,
            language: r.language,
            size: r.size,
            private: r.private,
            pushed_at: r.pushed_at,
        })
        .collect();
    Ok(Json(views))
}
