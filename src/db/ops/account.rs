use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::models::{DbSessionUser, DbUser};
use crate::db::records::OauthProfile;
use crate::error::LintBaseError;

/// Links the provider account to a user, creating both on first sign-in.
pub(crate) async fn upsert_oauth_user(
    pool: &SqlitePool,
    profile: OauthProfile,
) -> Result<DbUser, LintBaseError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let existing: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT user_id FROM accounts
        WHERE provider = ? AND provider_account_id = ?
        "#,
    )
    .bind(&profile.provider)
    .bind(&profile.provider_account_id)
    .fetch_optional(&mut *tx)
    .await?;

    let user_id = match existing {
        Some(user_id) => {
            sqlx::query(
                r#"
                UPDATE users
                SET
                    name = COALESCE(?, name),
                    email = COALESCE(?, email),
                    image = COALESCE(?, image),
                    updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.image)
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE accounts
                SET
                    login = COALESCE(?, login),
                    access_token = COALESCE(?, access_token),
                    updated_at = ?
                WHERE provider = ? AND provider_account_id = ?
                "#,
            )
            .bind(&profile.login)
            .bind(&profile.access_token)
            .bind(now)
            .bind(&profile.provider)
            .bind(&profile.provider_account_id)
            .execute(&mut *tx)
            .await?;

            user_id
        }
        None => {
            let user_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO users (name, email, image, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?)
                RETURNING id
                "#,
            )
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.image)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO accounts (
                    user_id, provider, provider_account_id, login, access_token, created_at, updated_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(user_id)
            .bind(&profile.provider)
            .bind(&profile.provider_account_id)
            .bind(&profile.login)
            .bind(&profile.access_token)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            debug!(provider = %profile.provider, user_id, "user created from oauth profile");
            user_id
        }
    };

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, name, email, image, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(user)
}

pub(crate) async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    token: String,
    expires_at: DateTime<Utc>,
) -> Result<(), LintBaseError> {
    sqlx::query(
        r#"
        INSERT INTO sessions (token, user_id, expires_at, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(expires_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn find_session_user(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<DbSessionUser>, LintBaseError> {
    let row = sqlx::query_as::<_, DbSessionUser>(
        r#"
        SELECT u.id, u.name, u.email, u.image, s.expires_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ? AND s.expires_at > ?
        "#,
    )
    .bind(token)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub(crate) async fn delete_session(pool: &SqlitePool, token: &str) -> Result<u64, LintBaseError> {
    let res = sqlx::query("DELETE FROM sessions WHERE token = ? OR expires_at <= ?")
        .bind(token)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub(crate) async fn account_token(
    pool: &SqlitePool,
    user_id: i64,
    provider: &str,
) -> Result<Option<String>, LintBaseError> {
    let token: Option<Option<String>> = sqlx::query_scalar(
        r#"
        SELECT access_token FROM accounts
        WHERE user_id = ? AND provider = ?
        ORDER BY updated_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(provider)
    .fetch_optional(pool)
    .await?;
    Ok(token.flatten())
}
