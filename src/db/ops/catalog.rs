//! Linter catalog: import, lookup for the scan pipeline and the read API.

use chrono::Utc;
use lintbase_lintconfig_core::extract_rules;
use lintbase_schema::CatalogDocument;
use serde_json::Value;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::db::models::{
    ConfigRow, ConfigRuleRow, DbPackage, LinterRow, RuleConfigRow, RuleRow,
};
use crate::db::page::{Page, like_pattern};
use crate::db::records::{
    CatalogIndex, ConfigDetail, ImportSummary, LinterDetail, LinterQuery, RuleDetail, RuleQuery,
    SearchQuery,
};
use crate::error::LintBaseError;

pub(crate) const LINTER_SELECT: &str = r#"
    SELECT
        l.id, l.package_id, p.name AS package_name, p.description, p.homepage,
        p.repository_url, p.weekly_downloads, f.name AS framework, l.summary,
        (SELECT COUNT(*) FROM rules r WHERE r.linter_id = l.id) AS rule_count,
        (SELECT COUNT(*) FROM configs c WHERE c.linter_id = l.id) AS config_count
    FROM linters l
    JOIN packages p ON p.id = l.package_id
    JOIN lint_frameworks f ON f.id = l.lint_framework_id
"#;

pub(crate) const RULE_SELECT: &str = r#"
    SELECT
        r.id, r.linter_id, p.name AS package_name, r.name, r.description, r.fixable,
        r.has_suggestions, r.deprecated, r.requires_type_checking, r.rule_type, r.url,
        r.options, r.summary
    FROM rules r
    JOIN linters l ON l.id = r.linter_id
    JOIN packages p ON p.id = l.package_id
"#;

const CONFIG_SELECT: &str = r#"
    SELECT
        c.id, c.linter_id, p.name AS package_name, c.name,
        (SELECT COUNT(*) FROM rule_configs rc WHERE rc.config_id = c.id) AS rule_count
    FROM configs c
    JOIN linters l ON l.id = c.linter_id
    JOIN packages p ON p.id = l.package_id
"#;

const PACKAGE_COLUMNS: &str = "id, name, ecosystem, description, homepage, repository_url, \
     weekly_downloads, stars, updated_at";

/// Upserts the whole document in one transaction. Rules are written before
/// configs so a config may reference rules of any linter in the document.
pub(crate) async fn import_catalog(
    pool: &SqlitePool,
    document: CatalogDocument,
) -> Result<ImportSummary, LintBaseError> {
    let now = Utc::now();
    let mut summary = ImportSummary::default();
    let mut tx = pool.begin().await?;

    let mut linter_ids = Vec::with_capacity(document.linters.len());
    for linter in &document.linters {
        let framework_id = upsert_framework(&mut *tx, &linter.framework).await?;

        let package_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO packages (
                name, ecosystem, description, homepage, repository_url, created_at, updated_at
            )
            VALUES (?, 'npm', ?, ?, ?, ?, ?)
            ON CONFLICT(name, ecosystem) DO UPDATE SET
                description = COALESCE(excluded.description, description),
                homepage = COALESCE(excluded.homepage, homepage),
                repository_url = COALESCE(excluded.repository_url, repository_url),
                updated_at = excluded.updated_at
            RETURNING id
            "#,
        )
        .bind(&linter.package)
        .bind(&linter.description)
        .bind(&linter.homepage)
        .bind(&linter.repository_url)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let linter_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO linters (package_id, lint_framework_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(package_id) DO UPDATE SET
                lint_framework_id = excluded.lint_framework_id,
                updated_at = excluded.updated_at
            RETURNING id
            "#,
        )
        .bind(package_id)
        .bind(framework_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for rule in &linter.rules {
            let options = serde_json::to_string(&rule.options)?;
            sqlx::query(
                r#"
                INSERT INTO rules (
                    linter_id, name, description, fixable, has_suggestions, deprecated,
                    requires_type_checking, rule_type, url, options
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(name, linter_id) DO UPDATE SET
                    description = excluded.description,
                    fixable = excluded.fixable,
                    has_suggestions = excluded.has_suggestions,
                    deprecated = excluded.deprecated,
                    requires_type_checking = excluded.requires_type_checking,
                    rule_type = excluded.rule_type,
                    url = excluded.url,
                    options = excluded.options
                "#,
            )
            .bind(linter_id)
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.fixable)
            .bind(rule.has_suggestions)
            .bind(rule.deprecated)
            .bind(rule.requires_type_checking)
            .bind(&rule.rule_type)
            .bind(&rule.url)
            .bind(options)
            .execute(&mut *tx)
            .await?;
        }

        summary.linters += 1;
        summary.rules += linter.rules.len();
        linter_ids.push(linter_id);
    }

    for (linter, linter_id) in document.linters.iter().zip(linter_ids) {
        for config in &linter.configs {
            let config_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO configs (linter_id, name) VALUES (?, ?)
                ON CONFLICT(name, linter_id) DO UPDATE SET name = excluded.name
                RETURNING id
                "#,
            )
            .bind(linter_id)
            .bind(&config.name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM rule_configs WHERE config_id = ?")
                .bind(config_id)
                .execute(&mut *tx)
                .await?;

            let rules = Value::Object(config.rules.clone());
            for rule_ref in extract_rules(Some(&rules)) {
                let Some(rule_id) =
                    find_rule_id(&mut *tx, &rule_ref.plugin, &rule_ref.rule_name).await?
                else {
                    debug!(
                        config = %config.name,
                        plugin = %rule_ref.plugin,
                        rule = %rule_ref.rule_name,
                        "config references an unknown rule"
                    );
                    summary.unresolved_rule_configs += 1;
                    continue;
                };

                sqlx::query(
                    r#"
                    INSERT INTO rule_configs (config_id, rule_id, severity)
                    VALUES (?, ?, ?)
                    ON CONFLICT(config_id, rule_id) DO UPDATE SET severity = excluded.severity
                    "#,
                )
                .bind(config_id)
                .bind(rule_id)
                .bind(rule_ref.severity.as_i64())
                .execute(&mut *tx)
                .await?;
                summary.rule_configs += 1;
            }
            summary.configs += 1;
        }
    }

    tx.commit().await?;
    info!(
        linters = summary.linters,
        rules = summary.rules,
        configs = summary.configs,
        rule_configs = summary.rule_configs,
        unresolved = summary.unresolved_rule_configs,
        "catalog imported"
    );
    Ok(summary)
}

/// Linter, config and rule ids of the given linter packages. Names with no
/// catalog entry are absent from the index.
pub(crate) async fn resolve_catalog(
    pool: &SqlitePool,
    packages: Vec<String>,
) -> Result<CatalogIndex, LintBaseError> {
    let mut index = CatalogIndex::default();
    for package in packages {
        let linter_id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT l.id FROM linters l
            JOIN packages p ON p.id = l.package_id
            WHERE p.name = ?
            ORDER BY p.ecosystem = 'npm' DESC
            LIMIT 1
            "#,
        )
        .bind(&package)
        .fetch_optional(pool)
        .await?;
        let Some(linter_id) = linter_id else {
            continue;
        };

        let configs: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM configs WHERE linter_id = ?")
                .bind(linter_id)
                .fetch_all(pool)
                .await?;
        for (id, name) in configs {
            index.configs.insert((package.clone(), name), id);
        }

        let rules: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM rules WHERE linter_id = ?")
                .bind(linter_id)
                .fetch_all(pool)
                .await?;
        for (id, name) in rules {
            index.rules.insert((package.clone(), name), id);
        }

        index.linters.insert(package, linter_id);
    }
    Ok(index)
}

pub(crate) async fn search_linters(
    pool: &SqlitePool,
    query: LinterQuery,
) -> Result<Page<LinterRow>, LintBaseError> {
    let page = query.page_request();
    let pattern = like_pattern(query.q.as_deref());
    let framework = query.framework.filter(|f| !f.trim().is_empty());
    let filter = r#"
        WHERE (p.name LIKE ?1 ESCAPE '\' OR IFNULL(p.description, '') LIKE ?1 ESCAPE '\')
          AND (?2 IS NULL OR f.name = ?2)
    "#;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM linters l \
         JOIN packages p ON p.id = l.package_id \
         JOIN lint_frameworks f ON f.id = l.lint_framework_id {filter}"
    ))
    .bind(&pattern)
    .bind(&framework)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, LinterRow>(&format!(
        "{LINTER_SELECT} {filter} \
         ORDER BY IFNULL(p.weekly_downloads, -1) DESC, p.name \
         LIMIT ?3 OFFSET ?4"
    ))
    .bind(&pattern)
    .bind(&framework)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(items, total, page))
}

pub(crate) async fn get_linter(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<LinterDetail>, LintBaseError> {
    let linter = sqlx::query_as::<_, LinterRow>(&format!("{LINTER_SELECT} WHERE l.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(linter) = linter else {
        return Ok(None);
    };

    let configs = sqlx::query_as::<_, ConfigRow>(&format!(
        "{CONFIG_SELECT} WHERE c.linter_id = ? ORDER BY c.name"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(LinterDetail { linter, configs }))
}

pub(crate) async fn get_linters_by_ids(
    pool: &SqlitePool,
    ids: Vec<i64>,
) -> Result<Vec<LinterRow>, LintBaseError> {
    let sql = format!("{LINTER_SELECT} WHERE l.id = ?");
    let mut rows = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(row) = sqlx::query_as::<_, LinterRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
        {
            rows.push(row);
        }
    }
    Ok(rows)
}

pub(crate) async fn list_linter_rules(
    pool: &SqlitePool,
    linter_id: i64,
    query: SearchQuery,
) -> Result<Page<RuleRow>, LintBaseError> {
    let page = query.page_request();
    let pattern = like_pattern(query.q.as_deref());
    let filter = r#"
        WHERE r.linter_id = ?1
          AND (r.name LIKE ?2 ESCAPE '\' OR IFNULL(r.description, '') LIKE ?2 ESCAPE '\')
    "#;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM rules r {filter}"))
        .bind(linter_id)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, RuleRow>(&format!(
        "{RULE_SELECT} {filter} ORDER BY r.name LIMIT ?3 OFFSET ?4"
    ))
    .bind(linter_id)
    .bind(&pattern)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(items, total, page))
}

pub(crate) async fn search_rules(
    pool: &SqlitePool,
    query: RuleQuery,
) -> Result<Page<RuleRow>, LintBaseError> {
    let page = query.page_request();
    let pattern = like_pattern(query.q.as_deref());
    let filter = r#"
        WHERE (r.name LIKE ?1 ESCAPE '\' OR IFNULL(r.description, '') LIKE ?1 ESCAPE '\')
          AND (?2 IS NULL OR r.fixable = ?2)
          AND (?3 IS NULL OR r.deprecated = ?3)
    "#;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM rules r {filter}"
    ))
    .bind(&pattern)
    .bind(query.fixable)
    .bind(query.deprecated)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, RuleRow>(&format!(
        "{RULE_SELECT} {filter} ORDER BY p.name, r.name LIMIT ?4 OFFSET ?5"
    ))
    .bind(&pattern)
    .bind(query.fixable)
    .bind(query.deprecated)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(items, total, page))
}

pub(crate) async fn get_rule(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<RuleDetail>, LintBaseError> {
    let rule = sqlx::query_as::<_, RuleRow>(&format!("{RULE_SELECT} WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(rule) = rule else {
        return Ok(None);
    };

    let configs = sqlx::query_as::<_, RuleConfigRow>(
        r#"
        SELECT rc.config_id, c.name AS config_name, c.linter_id, p.name AS package_name, rc.severity
        FROM rule_configs rc
        JOIN configs c ON c.id = rc.config_id
        JOIN linters l ON l.id = c.linter_id
        JOIN packages p ON p.id = l.package_id
        WHERE rc.rule_id = ?
        ORDER BY p.name, c.name
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(RuleDetail { rule, configs }))
}

pub(crate) async fn get_config(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<ConfigDetail>, LintBaseError> {
    let config = sqlx::query_as::<_, ConfigRow>(&format!("{CONFIG_SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(config) = config else {
        return Ok(None);
    };

    let rules = sqlx::query_as::<_, ConfigRuleRow>(
        r#"
        SELECT rc.rule_id, p.name AS package_name, r.name AS rule_name, rc.severity
        FROM rule_configs rc
        JOIN rules r ON r.id = rc.rule_id
        JOIN linters l ON l.id = r.linter_id
        JOIN packages p ON p.id = l.package_id
        WHERE rc.config_id = ?
        ORDER BY p.name, r.name
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(ConfigDetail { config, rules }))
}

pub(crate) async fn search_packages(
    pool: &SqlitePool,
    query: SearchQuery,
) -> Result<Page<DbPackage>, LintBaseError> {
    let page = query.page_request();
    let pattern = like_pattern(query.q.as_deref());
    let filter = r#"
        WHERE name LIKE ?1 ESCAPE '\' OR IFNULL(description, '') LIKE ?1 ESCAPE '\'
    "#;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM packages {filter}"))
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, DbPackage>(&format!(
        "SELECT {PACKAGE_COLUMNS} FROM packages {filter} \
         ORDER BY IFNULL(weekly_downloads, -1) DESC, name \
         LIMIT ?2 OFFSET ?3"
    ))
    .bind(&pattern)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(items, total, page))
}

async fn upsert_framework(conn: &mut SqliteConnection, name: &str) -> Result<i64, LintBaseError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO lint_frameworks (name) VALUES (?)
        ON CONFLICT(name) DO UPDATE SET name = excluded.name
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn find_rule_id(
    conn: &mut SqliteConnection,
    package: &str,
    rule: &str,
) -> Result<Option<i64>, LintBaseError> {
    let id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT r.id FROM rules r
        JOIN linters l ON l.id = r.linter_id
        JOIN packages p ON p.id = l.package_id
        WHERE p.name = ? AND r.name = ?
        LIMIT 1
        "#,
    )
    .bind(package)
    .bind(rule)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(id)
}
