use chrono::Utc;
use lintbase_lintconfig_core::{
    BASE_FRAMEWORK, ConfigFormat, LinterTable, extract_config, find_config_file,
    parse_config_source,
};
use lintbase_schema::PackageManifest;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::plan::{PlanInput, plan_local_package};
use super::source::RepositoryContentSource;
use crate::db::{DbActorHandle, RepositorySnapshot, SnapshotCounts};
use crate::error::LintBaseError;
use crate::utils::logging::with_pretty_json_debug;

const MANIFEST_FILE: &str = "package.json";

/// Why a refresh left the stored snapshot untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    MissingManifest,
    MissingLintConfig,
    MalformedManifest,
    MalformedLintConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RefreshOutcome {
    #[serde(rename_all = "camelCase")]
    Refreshed {
        commit_sha: Option<String>,
        config_path: String,
        counts: SnapshotCounts,
        unrecognized_extends: Vec<String>,
    },
    Skipped {
        reason: SkipReason,
    },
}

impl RefreshOutcome {
    fn skipped(full_name: &str, reason: SkipReason, detail: impl std::fmt::Display) -> Self {
        warn!(full_name, ?reason, %detail, "repository refresh skipped");
        RefreshOutcome::Skipped { reason }
    }
}

/// Re-scans the root of `(owner_id, full_name)` and replaces its snapshot.
///
/// Missing or unparseable inputs yield [`RefreshOutcome::Skipped`] without
/// touching the database. Upstream and database failures are errors.
pub async fn refresh_repository(
    db: &DbActorHandle,
    table: &LinterTable,
    source: &dyn RepositoryContentSource,
    owner_id: i64,
    full_name: &str,
) -> Result<RefreshOutcome, LintBaseError> {
    db.get_repository(owner_id, full_name)
        .await?
        .ok_or_else(|| LintBaseError::not_found("Repository"))?;

    let commit = source.latest_commit(full_name).await?;
    let (commit_sha, committed_at) = match &commit {
        Some(c) => (Some(c.sha.clone()), c.committed_at()),
        None => (None, None),
    };
    debug!(full_name, commit_sha = ?commit_sha, "latest commit resolved");

    let entries = source.list_root(full_name).await?;
    let file_names: Vec<&str> = entries
        .iter()
        .filter(|e| e.is_file())
        .map(|e| e.name.as_str())
        .collect();

    if !file_names.contains(&MANIFEST_FILE) {
        return Ok(RefreshOutcome::skipped(
            full_name,
            SkipReason::MissingManifest,
            "no package.json at repository root",
        ));
    }

    let manifest_text = match source.read_file(full_name, MANIFEST_FILE).await?.decode() {
        Ok(text) => text,
        Err(err) => {
            return Ok(RefreshOutcome::skipped(
                full_name,
                SkipReason::MalformedManifest,
                err,
            ));
        }
    };
    let manifest: PackageManifest = match serde_json::from_str(&manifest_text) {
        Ok(manifest) => manifest,
        Err(err) => {
            return Ok(RefreshOutcome::skipped(
                full_name,
                SkipReason::MalformedManifest,
                err,
            ));
        }
    };

    let (config_path, config_value) = match find_config_file(file_names.iter().copied()) {
        Some((name, format)) => {
            let text = match source.read_file(full_name, name).await?.decode() {
                Ok(text) => text,
                Err(err) => {
                    return Ok(RefreshOutcome::skipped(
                        full_name,
                        SkipReason::MalformedLintConfig,
                        err,
                    ));
                }
            };
            match parse_config_source(format, &text) {
                Ok(value) => (name.to_string(), value),
                Err(err) => {
                    return Ok(RefreshOutcome::skipped(
                        full_name,
                        SkipReason::MalformedLintConfig,
                        err,
                    ));
                }
            }
        }
        None if manifest.eslint_config.is_some() => {
            match parse_config_source(ConfigFormat::PackageJson, &manifest_text) {
                Ok(value) => (MANIFEST_FILE.to_string(), value),
                Err(err) => {
                    return Ok(RefreshOutcome::skipped(
                        full_name,
                        SkipReason::MalformedLintConfig,
                        err,
                    ));
                }
            }
        }
        None => {
            return Ok(RefreshOutcome::skipped(
                full_name,
                SkipReason::MissingLintConfig,
                "no recognized lint config",
            ));
        }
    };

    let extraction = extract_config(&config_value);
    with_pretty_json_debug(&extraction, |pretty| {
        debug!(full_name, config_path = %config_path, extraction = %pretty, "lint config extracted");
    });
    if !extraction.unrecognized_extends.is_empty() {
        debug!(
            full_name,
            unrecognized = ?extraction.unrecognized_extends,
            "extends entries without a plugin mapping"
        );
    }

    let declared = manifest.declared_dependencies();
    let matched = table.match_dependencies(declared.keys().copied());

    let mut names = extraction.referenced_plugins();
    names.extend(matched.present.iter().cloned());
    names.extend(matched.suggested.iter().cloned());
    names.sort();
    names.dedup();
    let index = db.resolve_catalog(names).await?;

    let local_package = plan_local_package(PlanInput {
        path: "",
        framework: BASE_FRAMEWORK,
        config_path: &config_path,
        manifest: &manifest,
        extraction: &extraction,
        matched: &matched,
        index: &index,
    });

    let counts = db
        .replace_snapshot(RepositorySnapshot {
            owner_id,
            full_name: full_name.to_string(),
            commit_sha: commit_sha.clone(),
            committed_at,
            scanned_at: Utc::now(),
            local_package,
        })
        .await?;

    info!(
        full_name,
        config_path = %config_path,
        present = matched.present.len(),
        suggested = matched.suggested.len(),
        linters = counts.linters,
        configs = counts.configs,
        rules = counts.rules,
        "repository refreshed"
    );

    Ok(RefreshOutcome::Refreshed {
        commit_sha,
        config_path,
        counts,
        unrecognized_extends: extraction.unrecognized_extends,
    })
}
