use crate::auth::SESSION_COOKIE;
use crate::db::DbSessionUser;
use crate::error::LintBaseError;
use crate::server::router::LintBaseState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::cookie::{Key, PrivateCookieJar};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

/// Session token from `Authorization: Bearer` or the private session cookie.
pub fn session_token(headers: &HeaderMap, key: Key) -> Option<String> {
    if let Some(auth) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(auth.token().to_string());
    }
    PrivateCookieJar::from_headers(headers, key)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// An authenticated request. Rejects with 401 when there is no live session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user: DbSessionUser,
    pub token: String,
}

impl SessionUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// The session of the request, if any. Never rejects on a missing session.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<SessionUser>);

impl FromRequestParts<LintBaseState> for MaybeSession {
    type Rejection = LintBaseError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &LintBaseState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers, Key::from_ref(state)) else {
            return Ok(MaybeSession(None));
        };

        if let Some(user) = state.sessions.get(&token) {
            return Ok(MaybeSession(Some(SessionUser { user, token })));
        }

        match state.db.find_session_user(token.clone()).await? {
            Some(user) => {
                state.sessions.insert(token.clone(), user.clone());
                Ok(MaybeSession(Some(SessionUser { user, token })))
            }
            None => {
                debug!("unknown or expired session token");
                Ok(MaybeSession(None))
            }
        }
    }
}

impl FromRequestParts<LintBaseState> for SessionUser {
    type Rejection = LintBaseError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &LintBaseState,
    ) -> Result<Self, Self::Rejection> {
        MaybeSession::from_request_parts(parts, state)
            .await?
            .0
            .ok_or(LintBaseError::Unauthenticated)
    }
}

/// Admin gate: open outside production, otherwise the session user must be
/// in `auth.admin_user_ids`.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Option<SessionUser>);

impl FromRequestParts<LintBaseState> for RequireAdmin {
    type Rejection = LintBaseError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &LintBaseState,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.basic.is_production() {
            let MaybeSession(session) = MaybeSession::from_request_parts(parts, state).await?;
            return Ok(RequireAdmin(session));
        }

        let session = SessionUser::from_request_parts(parts, state).await?;
        if state.config.auth.is_admin(session.id()) {
            Ok(RequireAdmin(Some(session)))
        } else {
            Err(LintBaseError::Forbidden)
        }
    }
}
