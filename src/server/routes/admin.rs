use crate::db::{DerivedDeletion, ImportSummary};
use crate::error::LintBaseError;
use crate::maintenance::{EmbeddingUpload, SummaryRun, generate_rule_summaries, upload_embeddings};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::guards::RequireAdmin;
use crate::server::router::LintBaseState;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::post,
};
use lintbase_schema::CatalogDocument;
use serde::{Deserialize, Serialize};
use tower_http::decompression::RequestDecompressionLayer;
use tracing::info;

const DEFAULT_SUMMARY_LIMIT: i64 = 50;
const MAX_SUMMARY_LIMIT: i64 = 500;
const CATALOG_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Maintenance endpoints. The caller layers [`RequireAdmin`] over all of them.
pub fn router() -> Router<LintBaseState> {
    let import = Router::new()
        .route("/admin/catalog:import", post(catalog_import))
        .layer(DefaultBodyLimit::max(CATALOG_BODY_LIMIT))
        .layer(RequestDecompressionLayer::new());

    Router::new()
        .route("/admin/derived:delete", post(derived_delete))
        .route("/admin/summaries:clear", post(summaries_clear))
        .route("/admin/summaries:generate", post(summaries_generate))
        .route("/admin/embeddings:upload", post(embeddings_upload))
        .route("/admin/packages:sync", post(packages_sync))
        .merge(import)
}

fn actor_id(admin: &RequireAdmin) -> Option<i64> {
    admin.0.as_ref().map(|s| s.id())
}

/// POST /admin/derived:delete
pub async fn derived_delete(
    State(state): State<LintBaseState>,
    admin: RequireAdmin,
) -> Result<Json<DerivedDeletion>, LintBaseError> {
    let deleted = state.db.delete_derived_data().await?;
    info!(
        by = ?actor_id(&admin),
        local_packages = deleted.local_packages,
        repositories_reset = deleted.repositories_reset,
        "derived data deleted"
    );
    Ok(Json(deleted))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummariesCleared {
    pub linters: u64,
    pub rules: u64,
}

/// POST /admin/summaries:clear
pub async fn summaries_clear(
    State(state): State<LintBaseState>,
    admin: RequireAdmin,
) -> Result<Json<SummariesCleared>, LintBaseError> {
    let (linters, rules) = state.db.clear_summaries().await?;
    info!(by = ?actor_id(&admin), linters, rules, "summaries cleared");
    Ok(Json(SummariesCleared { linters, rules }))
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryLimit {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// POST /admin/summaries:generate?limit=
pub async fn summaries_generate(
    State(state): State<LintBaseState>,
    ApiQuery(query): ApiQuery<SummaryLimit>,
) -> Result<Json<SummaryRun>, LintBaseError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SUMMARY_LIMIT)
        .clamp(1, MAX_SUMMARY_LIMIT);
    let run = generate_rule_summaries(&state.db, &state.upstreams.ai, limit).await?;
    Ok(Json(run))
}

/// POST /admin/embeddings:upload
pub async fn embeddings_upload(
    State(state): State<LintBaseState>,
) -> Result<Json<EmbeddingUpload>, LintBaseError> {
    Ok(Json(upload_embeddings(&state.db, &state.upstreams.ai).await?))
}

/// POST /admin/catalog:import
///
/// Accepts `Content-Encoding: gzip|zstd` bodies.
pub async fn catalog_import(
    State(state): State<LintBaseState>,
    admin: RequireAdmin,
    ApiJson(document): ApiJson<CatalogDocument>,
) -> Result<Json<ImportSummary>, LintBaseError> {
    let summary = state.db.import_catalog(document).await?;
    info!(
        by = ?actor_id(&admin),
        linters = summary.linters,
        rules = summary.rules,
        configs = summary.configs,
        rule_configs = summary.rule_configs,
        unresolved_rule_configs = summary.unresolved_rule_configs,
        "catalog imported"
    );
    Ok(Json(summary))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagesSynced {
    pub requested: usize,
    pub fetched: usize,
    pub updated: u64,
}

/// POST /admin/packages:sync
pub async fn packages_sync(
    State(state): State<LintBaseState>,
) -> Result<Json<PackagesSynced>, LintBaseError> {
    let names = state.db.list_package_names().await?;
    let requested = names.len();
    let stats = state.upstreams.registry.sync_package_stats(names).await;
    let fetched = stats.len();
    let updated = state.db.update_package_stats(stats).await?;
    info!(requested, fetched, updated, "package stats synced");
    Ok(Json(PackagesSynced {
        requested,
        fetched,
        updated,
    }))
}
