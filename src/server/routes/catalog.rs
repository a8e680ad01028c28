use crate::db::{
    ConfigDetail, ConfigRow, DbPackage, LinterQuery, LinterRow, Page, RuleDetail, RuleQuery,
    RuleRow, SearchQuery,
};
use crate::error::LintBaseError;
use crate::present::{RELATED_LINTERS_LIMIT, config_emojis, related_linters};
use crate::server::extract::{ApiPath, ApiQuery};
use crate::server::router::LintBaseState;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

pub fn router() -> Router<LintBaseState> {
    Router::new()
        .route("/api/linters", get(linters_search))
        .route("/api/linters/{id}", get(linter_detail))
        .route("/api/linters/{id}/rules", get(linter_rules))
        .route("/api/linters/{id}/related", get(linter_related))
        .route("/api/rules", get(rules_search))
        .route("/api/rules/{id}", get(rule_detail))
        .route("/api/configs/{id}", get(config_detail))
        .route("/api/packages", get(packages_search))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    #[serde(flatten)]
    pub config: ConfigRow,
    pub emoji: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinterDetailResponse {
    pub linter: LinterRow,
    pub configs: Vec<ConfigView>,
}

fn with_emojis(configs: Vec<ConfigRow>) -> Vec<ConfigView> {
    let emojis = config_emojis(configs.iter().map(|c| c.name.as_str()));
    configs
        .into_iter()
        .map(|config| ConfigView {
            emoji: emojis.get(&config.name).copied().unwrap_or_default(),
            config,
        })
        .collect()
}

/// GET /api/linters
pub async fn linters_search(
    State(state): State<LintBaseState>,
    ApiQuery(query): ApiQuery<LinterQuery>,
) -> Result<Json<Page<LinterRow>>, LintBaseError> {
    Ok(Json(state.db.search_linters(query).await?))
}

/// GET /api/linters/{id}
pub async fn linter_detail(
    State(state): State<LintBaseState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<LinterDetailResponse>, LintBaseError> {
    let detail = state
        .db
        .get_linter(id)
        .await?
        .ok_or_else(|| LintBaseError::not_found("Linter"))?;
    Ok(Json(LinterDetailResponse {
        linter: detail.linter,
        configs: with_emojis(detail.configs),
    }))
}

/// GET /api/linters/{id}/rules
pub async fn linter_rules(
    State(state): State<LintBaseState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Page<RuleRow>>, LintBaseError> {
    state
        .db
        .get_linters_by_ids(vec![id])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| LintBaseError::not_found("Linter"))?;
    Ok(Json(state.db.list_linter_rules(id, query).await?))
}

/// GET /api/linters/{id}/related
///
/// Empty when the AI or vector index upstream is unavailable.
pub async fn linter_related(
    State(state): State<LintBaseState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<LinterRow>>, LintBaseError> {
    let linter = state
        .db
        .get_linters_by_ids(vec![id])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| LintBaseError::not_found("Linter"))?;
    let related = related_linters(
        &state.db,
        &state.upstreams.ai,
        &linter,
        RELATED_LINTERS_LIMIT,
    )
    .await;
    Ok(Json(related))
}

/// GET /api/rules
pub async fn rules_search(
    State(state): State<LintBaseState>,
    ApiQuery(query): ApiQuery<RuleQuery>,
) -> Result<Json<Page<RuleRow>>, LintBaseError> {
    Ok(Json(state.db.search_rules(query).await?))
}

/// GET /api/rules/{id}
pub async fn rule_detail(
    State(state): State<LintBaseState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<RuleDetail>, LintBaseError> {
    state
        .db
        .get_rule(id)
        .await?
        .map(Json)
        .ok_or_else(|| LintBaseError::not_found("Rule"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDetailResponse {
    #[serde(flatten)]
    pub detail: ConfigDetail,
    pub emoji: &'static str,
}

/// GET /api/configs/{id}
pub async fn config_detail(
    State(state): State<LintBaseState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ConfigDetailResponse>, LintBaseError> {
    let detail = state
        .db
        .get_config(id)
        .await?
        .ok_or_else(|| LintBaseError::not_found("Config"))?;

    // Badges are assigned across the linter's configs so they match the linter page.
    let siblings = state
        .db
        .get_linter(detail.config.linter_id)
        .await?
        .map(|l| l.configs)
        .unwrap_or_default();
    let emojis = config_emojis(siblings.iter().map(|c| c.name.as_str()));
    let emoji = emojis
        .get(&detail.config.name)
        .copied()
        .unwrap_or_default();

    Ok(Json(ConfigDetailResponse { detail, emoji }))
}

/// GET /api/packages
pub async fn packages_search(
    State(state): State<LintBaseState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Page<DbPackage>>, LintBaseError> {
    Ok(Json(state.db.search_packages(query).await?))
}
