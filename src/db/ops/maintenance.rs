use chrono::Utc;
use sqlx::SqlitePool;

use super::catalog::RULE_SELECT;
use crate::db::models::{EmbeddingDocument, RuleRow};
use crate::db::records::{DerivedDeletion, PackageStats};
use crate::error::LintBaseError;

/// Drops every repository's scan snapshot; repositories themselves stay.
pub(crate) async fn delete_derived_data(pool: &SqlitePool) -> Result<DerivedDeletion, LintBaseError> {
    let mut tx = pool.begin().await?;
    for table in [
        "local_package_rules",
        "local_package_configs",
        "local_package_linters",
        "local_package_lint_frameworks",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }
    let local_packages = sqlx::query("DELETE FROM local_packages")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let repositories_reset =
        sqlx::query("UPDATE repositories SET scanned_at = NULL, updated_at = ? WHERE scanned_at IS NOT NULL")
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?
            .rows_affected();
    tx.commit().await?;

    Ok(DerivedDeletion {
        local_packages,
        repositories_reset,
    })
}

/// Returns `(linters, rules)` cleared.
pub(crate) async fn clear_summaries(pool: &SqlitePool) -> Result<(u64, u64), LintBaseError> {
    let mut tx = pool.begin().await?;
    let linters = sqlx::query("UPDATE linters SET summary = NULL WHERE summary IS NOT NULL")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let rules = sqlx::query("UPDATE rules SET summary = NULL WHERE summary IS NOT NULL")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    tx.commit().await?;
    Ok((linters, rules))
}

pub(crate) async fn list_unsummarized_rules(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<RuleRow>, LintBaseError> {
    let rows = sqlx::query_as::<_, RuleRow>(&format!(
        "{RULE_SELECT} WHERE r.summary IS NULL ORDER BY r.id LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub(crate) async fn set_rule_summary(
    pool: &SqlitePool,
    rule_id: i64,
    summary: String,
) -> Result<(), LintBaseError> {
    let res = sqlx::query("UPDATE rules SET summary = ? WHERE id = ?")
        .bind(summary)
        .bind(rule_id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(LintBaseError::not_found("Rule"));
    }
    Ok(())
}

pub(crate) async fn list_embedding_documents(
    pool: &SqlitePool,
) -> Result<Vec<EmbeddingDocument>, LintBaseError> {
    let mut rows = sqlx::query_as::<_, EmbeddingDocument>(
        r#"
        SELECT
            'linter:' || l.id AS id,
            p.name || ': ' || IFNULL(p.description, '') || ' ' || IFNULL(l.summary, '') AS text
        FROM linters l
        JOIN packages p ON p.id = l.package_id
        UNION ALL
        SELECT
            'rule:' || r.id AS id,
            p.name || ' ' || r.name || ': ' || IFNULL(r.description, '') || ' ' || IFNULL(r.summary, '') AS text
        FROM rules r
        JOIN linters l ON l.id = r.linter_id
        JOIN packages p ON p.id = l.package_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    for row in &mut rows {
        row.text = row.text.trim().to_string();
    }
    Ok(rows)
}

pub(crate) async fn list_package_names(pool: &SqlitePool) -> Result<Vec<String>, LintBaseError> {
    let names: Vec<String> =
        sqlx::query_scalar("SELECT name FROM packages WHERE ecosystem = 'npm' ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(names)
}

pub(crate) async fn update_package_stats(
    pool: &SqlitePool,
    stats: Vec<PackageStats>,
) -> Result<u64, LintBaseError> {
    let now = Utc::now();
    let mut updated = 0;
    let mut tx = pool.begin().await?;
    for stat in stats {
        updated += sqlx::query(
            r#"
            UPDATE packages
            SET
                description = COALESCE(?, description),
                homepage = COALESCE(?, homepage),
                repository_url = COALESCE(?, repository_url),
                weekly_downloads = COALESCE(?, weekly_downloads),
                updated_at = ?
            WHERE name = ? AND ecosystem = 'npm'
            "#,
        )
        .bind(stat.description)
        .bind(stat.homepage)
        .bind(stat.repository_url)
        .bind(stat.weekly_downloads)
        .bind(now)
        .bind(stat.name)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }
    tx.commit().await?;
    Ok(updated)
}
