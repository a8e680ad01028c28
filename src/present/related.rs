use serde_json::json;
use tracing::warn;

use crate::db::{DbActorHandle, LinterRow};
use crate::error::LintBaseError;
use crate::upstream::AiClient;

pub const RELATED_LINTERS_LIMIT: u32 = 5;

const LINTER_ID_PREFIX: &str = "linter:";

/// Text embedded for a linter; the vector upload uses the same shape.
pub fn linter_document_text(linter: &LinterRow) -> String {
    format!(
        "{}: {} {}",
        linter.package_name,
        linter.description.as_deref().unwrap_or_default(),
        linter.summary.as_deref().unwrap_or_default()
    )
    .trim()
    .to_string()
}

/// Linters nearest to `linter` in the vector index, best match first.
///
/// Degrades to an empty list when the AI or vector upstream fails.
pub async fn related_linters(
    db: &DbActorHandle,
    ai: &AiClient,
    linter: &LinterRow,
    limit: u32,
) -> Vec<LinterRow> {
    match try_related_linters(db, ai, linter, limit).await {
        Ok(related) => related,
        Err(err) => {
            warn!(linter_id = linter.id, error = %err, "related linters unavailable");
            Vec::new()
        }
    }
}

async fn try_related_linters(
    db: &DbActorHandle,
    ai: &AiClient,
    linter: &LinterRow,
    limit: u32,
) -> Result<Vec<LinterRow>, LintBaseError> {
    let vector = ai
        .embed(vec![linter_document_text(linter)])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| LintBaseError::UnexpectedError("empty embedding response".into()))?;

    let matches = ai
        .query_vectors(vector, limit + 1, Some(json!({ "kind": { "$eq": "linter" } })))
        .await?;

    let ids: Vec<i64> = matches
        .iter()
        .filter_map(|m| m.id.strip_prefix(LINTER_ID_PREFIX)?.parse().ok())
        .filter(|id| *id != linter.id)
        .take(limit as usize)
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut rows = db.get_linters_by_ids(ids.clone()).await?;
    rows.sort_by_key(|row| ids.iter().position(|id| *id == row.id));
    Ok(rows)
}
