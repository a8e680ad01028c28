//! Repository rows and their scan snapshot. Every statement is scoped by
//! `owner_id`; a repository of another user is indistinguishable from a
//! missing one.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::db::models::{
    DbRepository, LocalConfigRow, LocalFrameworkRow, LocalLinterRow, LocalPackageRow,
    LocalRuleRow,
};
use crate::db::records::{
    RepositoryCreate, RepositorySnapshot, RepositorySnapshotView, SnapshotCounts,
};
use crate::error::LintBaseError;

const REPOSITORY_COLUMNS: &str = "id, owner_id, name, full_name, description, language, size, \
     commit_sha, committed_at, scanned_at, created_at, updated_at";

/// Local packages of `(owner_id, full_name)`; binds owner then full name.
const OWNED_LOCAL_PACKAGES: &str = "SELECT lp.id FROM local_packages lp \
     JOIN repositories r ON r.id = lp.repository_id \
     WHERE r.owner_id = ? AND r.full_name = ?";

pub(crate) async fn add_repository(
    pool: &SqlitePool,
    create: RepositoryCreate,
) -> Result<DbRepository, LintBaseError> {
    let now = Utc::now();
    let sql = format!(
        r#"
        INSERT INTO repositories (
            owner_id, name, full_name, description, language, size, commit_sha, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(owner_id, full_name) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            language = excluded.language,
            size = excluded.size,
            commit_sha = COALESCE(excluded.commit_sha, commit_sha),
            updated_at = excluded.updated_at
        RETURNING {REPOSITORY_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, DbRepository>(&sql)
        .bind(create.owner_id)
        .bind(create.name)
        .bind(create.full_name)
        .bind(create.description)
        .bind(create.language)
        .bind(create.size)
        .bind(create.commit_sha)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

pub(crate) async fn get_repository(
    pool: &SqlitePool,
    owner_id: i64,
    full_name: &str,
) -> Result<Option<DbRepository>, LintBaseError> {
    let sql = format!(
        "SELECT {REPOSITORY_COLUMNS} FROM repositories WHERE owner_id = ? AND full_name = ?"
    );
    let row = sqlx::query_as::<_, DbRepository>(&sql)
        .bind(owner_id)
        .bind(full_name)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub(crate) async fn list_repositories(
    pool: &SqlitePool,
    owner_id: i64,
) -> Result<Vec<DbRepository>, LintBaseError> {
    let sql = format!(
        "SELECT {REPOSITORY_COLUMNS} FROM repositories WHERE owner_id = ? ORDER BY full_name"
    );
    let rows = sqlx::query_as::<_, DbRepository>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Deletes the repository and everything derived from it, children first.
pub(crate) async fn remove_repository(
    pool: &SqlitePool,
    owner_id: i64,
    full_name: &str,
) -> Result<(), LintBaseError> {
    let mut tx = pool.begin().await?;
    delete_local_packages(&mut *tx, owner_id, full_name).await?;

    let res = sqlx::query("DELETE FROM repositories WHERE owner_id = ? AND full_name = ?")
        .bind(owner_id)
        .bind(full_name)
        .execute(&mut *tx)
        .await?;
    if res.rows_affected() == 0 {
        return Err(LintBaseError::not_found("Repository"));
    }

    tx.commit().await?;
    debug!(owner_id, full_name, "repository removed");
    Ok(())
}

/// Atomically swaps the repository's LocalPackage-derived rows for `snapshot`.
pub(crate) async fn replace_snapshot(
    pool: &SqlitePool,
    snapshot: RepositorySnapshot,
) -> Result<SnapshotCounts, LintBaseError> {
    let RepositorySnapshot {
        owner_id,
        full_name,
        commit_sha,
        committed_at,
        scanned_at,
        local_package,
    } = snapshot;

    let mut tx = pool.begin().await?;

    let repository_id: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE repositories
        SET
            commit_sha = COALESCE(?, commit_sha),
            committed_at = COALESCE(?, committed_at),
            scanned_at = ?,
            updated_at = ?
        WHERE owner_id = ? AND full_name = ?
        RETURNING id
        "#,
    )
    .bind(commit_sha)
    .bind(committed_at)
    .bind(scanned_at)
    .bind(Utc::now())
    .bind(owner_id)
    .bind(&full_name)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(repository_id) = repository_id else {
        return Err(LintBaseError::not_found("Repository"));
    };

    delete_local_packages(&mut *tx, owner_id, &full_name).await?;

    let framework_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO lint_frameworks (name) VALUES (?)
        ON CONFLICT(name) DO UPDATE SET name = excluded.name
        RETURNING id
        "#,
    )
    .bind(&local_package.framework)
    .fetch_one(&mut *tx)
    .await?;

    let local_package_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO local_packages (repository_id, path, name, version, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(repository_id)
    .bind(&local_package.path)
    .bind(&local_package.name)
    .bind(&local_package.version)
    .bind(scanned_at)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO local_package_lint_frameworks (local_package_id, lint_framework_id, config_path)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(local_package_id)
    .bind(framework_id)
    .bind(&local_package.config_path)
    .execute(&mut *tx)
    .await?;

    for linter in &local_package.linters {
        sqlx::query(
            r#"
            INSERT INTO local_package_linters (local_package_id, linter_id, is_present, is_suggested, version)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(local_package_id)
        .bind(linter.linter_id)
        .bind(linter.is_present)
        .bind(linter.is_suggested)
        .bind(&linter.version)
        .execute(&mut *tx)
        .await?;
    }

    for config_id in &local_package.config_ids {
        sqlx::query("INSERT INTO local_package_configs (local_package_id, config_id) VALUES (?, ?)")
            .bind(local_package_id)
            .bind(config_id)
            .execute(&mut *tx)
            .await?;
    }

    for rule in &local_package.rules {
        sqlx::query(
            r#"
            INSERT INTO local_package_rules (local_package_id, rule_id, severity, options)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(local_package_id)
        .bind(rule.rule_id)
        .bind(rule.severity)
        .bind(&rule.options)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let counts = SnapshotCounts {
        linters: local_package.linters.len(),
        configs: local_package.config_ids.len(),
        rules: local_package.rules.len(),
    };
    debug!(
        owner_id,
        full_name = %full_name,
        linters = counts.linters,
        configs = counts.configs,
        rules = counts.rules,
        "repository snapshot replaced"
    );
    Ok(counts)
}

pub(crate) async fn load_snapshot(
    pool: &SqlitePool,
    owner_id: i64,
    full_name: &str,
) -> Result<Option<RepositorySnapshotView>, LintBaseError> {
    let Some(repository) = get_repository(pool, owner_id, full_name).await? else {
        return Ok(None);
    };

    let local_packages = sqlx::query_as::<_, LocalPackageRow>(&format!(
        "SELECT id, path, name, version FROM local_packages \
         WHERE id IN ({OWNED_LOCAL_PACKAGES}) ORDER BY path"
    ))
    .bind(owner_id)
    .bind(full_name)
    .fetch_all(pool)
    .await?;

    let frameworks = sqlx::query_as::<_, LocalFrameworkRow>(&format!(
        "SELECT lf.local_package_id, f.name AS framework, lf.config_path \
         FROM local_package_lint_frameworks lf \
         JOIN lint_frameworks f ON f.id = lf.lint_framework_id \
         WHERE lf.local_package_id IN ({OWNED_LOCAL_PACKAGES}) ORDER BY f.name"
    ))
    .bind(owner_id)
    .bind(full_name)
    .fetch_all(pool)
    .await?;

    let linters = sqlx::query_as::<_, LocalLinterRow>(&format!(
        "SELECT ll.local_package_id, ll.linter_id, p.name AS package_name, \
                ll.is_present, ll.is_suggested, ll.version \
         FROM local_package_linters ll \
         JOIN linters l ON l.id = ll.linter_id \
         JOIN packages p ON p.id = l.package_id \
         WHERE ll.local_package_id IN ({OWNED_LOCAL_PACKAGES}) \
         ORDER BY ll.is_present DESC, p.name"
    ))
    .bind(owner_id)
    .bind(full_name)
    .fetch_all(pool)
    .await?;

    let configs = sqlx::query_as::<_, LocalConfigRow>(&format!(
        "SELECT lc.local_package_id, lc.config_id, c.linter_id, p.name AS package_name, c.name \
         FROM local_package_configs lc \
         JOIN configs c ON c.id = lc.config_id \
         JOIN linters l ON l.id = c.linter_id \
         JOIN packages p ON p.id = l.package_id \
         WHERE lc.local_package_id IN ({OWNED_LOCAL_PACKAGES}) \
         ORDER BY p.name, c.name"
    ))
    .bind(owner_id)
    .bind(full_name)
    .fetch_all(pool)
    .await?;

    let rules = sqlx::query_as::<_, LocalRuleRow>(&format!(
        "SELECT lr.local_package_id, lr.rule_id, p.name AS package_name, r.name, \
                lr.severity, lr.options \
         FROM local_package_rules lr \
         JOIN rules r ON r.id = lr.rule_id \
         JOIN linters l ON l.id = r.linter_id \
         JOIN packages p ON p.id = l.package_id \
         WHERE lr.local_package_id IN ({OWNED_LOCAL_PACKAGES}) \
         ORDER BY p.name, r.name"
    ))
    .bind(owner_id)
    .bind(full_name)
    .fetch_all(pool)
    .await?;

    Ok(Some(RepositorySnapshotView {
        repository,
        local_packages,
        frameworks,
        linters,
        configs,
        rules,
    }))
}

/// Deletes all LocalPackage-derived rows of one owned repository.
async fn delete_local_packages(
    conn: &mut SqliteConnection,
    owner_id: i64,
    full_name: &str,
) -> Result<(), LintBaseError> {
    for table in [
        "local_package_rules",
        "local_package_configs",
        "local_package_linters",
        "local_package_lint_frameworks",
    ] {
        let sql = format!("DELETE FROM {table} WHERE local_package_id IN ({OWNED_LOCAL_PACKAGES})");
        sqlx::query(&sql)
            .bind(owner_id)
            .bind(full_name)
            .execute(&mut *conn)
            .await?;
    }

    let sql = format!("DELETE FROM local_packages WHERE id IN ({OWNED_LOCAL_PACKAGES})");
    sqlx::query(&sql)
        .bind(owner_id)
        .bind(full_name)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
