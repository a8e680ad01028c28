use crate::auth::{
    OauthTokenResponse, Provider, SESSION_COOKIE, build_oauth2_client, generate_session_token,
};
use crate::db::{DbSessionUser, OauthProfile};
use crate::error::{LintBaseError, OauthError};
use crate::server::extract::{ApiPath, ApiQuery};
use crate::server::guards::MaybeSession;
use crate::server::router::LintBaseState;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use chrono::Utc;
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier, TokenResponse};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use time::Duration;
use tracing::{error, info};

const CSRF_COOKIE: &str = "lintbase_oauth_csrf";
const PKCE_COOKIE: &str = "lintbase_oauth_pkce";

pub fn router() -> Router<LintBaseState> {
    Router::new()
        .route("/auth/{provider}", get(oauth_entry))
        .route("/auth/{provider}/callback", get(oauth_callback))
        .route("/auth/signout", post(signout))
        .route("/api/session", get(current_session))
}

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: String,
    pub state: String,
}

/// GET /auth/{provider}
///
/// Starts the authorization-code + PKCE flow and redirects to the provider.
pub async fn oauth_entry(
    State(state): State<LintBaseState>,
    ApiPath(provider): ApiPath<String>,
    jar: PrivateCookieJar,
) -> Result<Response, LintBaseError> {
    let provider: Provider = provider.parse()?;
    let client = build_oauth2_client(provider, &state.config.auth, &state.config.basic.public_url)?;

    let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
    let (auth_url, csrf_token) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(provider.scopes())
        .set_pkce_challenge(challenge)
        .url();

    let secure = !state.config.basic.insecure_cookie;
    let jar = jar
        .add(flow_cookie(CSRF_COOKIE, csrf_token.secret().to_string(), secure))
        .add(flow_cookie(PKCE_COOKIE, verifier.secret().to_string(), secure));

    info!(%provider, "dispatching OAuth redirect");
    Ok((jar, Redirect::temporary(auth_url.as_str())).into_response())
}

/// GET /auth/{provider}/callback
///
/// Finishes the flow, links the account and starts a session.
pub async fn oauth_callback(
    State(state): State<LintBaseState>,
    ApiPath(provider): ApiPath<String>,
    ApiQuery(query): ApiQuery<AuthCallbackQuery>,
    jar: PrivateCookieJar,
) -> Response {
    let (jar, flow) = take_flow_cookies(jar);

    match complete_sign_in(&state, &provider, &query, flow).await {
        Ok((user_id, token)) => {
            info!(%provider, user_id, "sign-in completed");
            let jar = jar.add(session_cookie(
                token,
                state.config.basic.session_ttl_days,
                !state.config.basic.insecure_cookie,
            ));
            (jar, Redirect::to(state.config.basic.public_url.as_str())).into_response()
        }
        Err(err) => {
            error!(%provider, error = ?err, "sign-in failed");
            (jar, err.into_response()).into_response()
        }
    }
}

async fn complete_sign_in(
    state: &LintBaseState,
    provider: &str,
    query: &AuthCallbackQuery,
    flow: Option<(String, String)>,
) -> Result<(i64, String), LintBaseError> {
    let provider: Provider = provider.parse()?;
    let (pkce_verifier, csrf_token) = flow
        .ok_or_else(|| OauthError::flow("OAUTH_SESSION_MISSING", "Missing OAuth session cookies"))?;

    if !bool::from(query.state.as_bytes().ct_eq(csrf_token.as_bytes())) {
        return Err(OauthError::flow("CSRF_MISMATCH", "CSRF token mismatch").into());
    }

    let client = build_oauth2_client(provider, &state.config.auth, &state.config.basic.public_url)?;
    let token_response: OauthTokenResponse = client
        .exchange_code(AuthorizationCode::new(query.code.clone()))
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
        .request_async(&state.upstreams.oauth)
        .await
        .map_err(|e| {
            OauthError::flow(
                "TOKEN_EXCHANGE_FAILED",
                format!("Token exchange failed: {}", OauthError::from(e)),
            )
        })?;

    let access_token = token_response.access_token().secret().to_string();
    let profile = fetch_profile(state, provider, access_token).await?;
    let user = state.db.upsert_oauth_user(profile).await?;

    let token = generate_session_token();
    let expires_at = Utc::now() + chrono::Duration::days(state.config.basic.session_ttl_days);
    state
        .db
        .create_session(user.id, token.clone(), expires_at)
        .await?;
    Ok((user.id, token))
}

async fn fetch_profile(
    state: &LintBaseState,
    provider: Provider,
    access_token: String,
) -> Result<OauthProfile, LintBaseError> {
    let profile = match provider {
        Provider::Github => {
            let user = state.upstreams.github.get_user(&access_token).await?;
            OauthProfile {
                provider: provider.as_str().to_string(),
                provider_account_id: user.id.to_string(),
                name: user.name.or_else(|| Some(user.login.clone())),
                login: Some(user.login),
                email: user.email,
                image: user.avatar_url,
                access_token: Some(access_token),
            }
        }
        Provider::Discord => {
            let user = state.upstreams.discord.get_user(&access_token).await?;
            OauthProfile {
                provider: provider.as_str().to_string(),
                provider_account_id: user.id.clone(),
                image: user.avatar_url(),
                name: user.global_name.or_else(|| Some(user.username.clone())),
                login: Some(user.username),
                email: user.email,
                access_token: Some(access_token),
            }
        }
    };
    Ok(profile)
}

/// POST /auth/signout
pub async fn signout(
    State(state): State<LintBaseState>,
    MaybeSession(session): MaybeSession,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, LintBaseError> {
    if let Some(session) = session {
        state.sessions.invalidate(&session.token);
        state.db.delete_session(session.token).await?;
        info!(user_id = session.user.id, "signed out");
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<DbSessionUser>,
}

/// GET /api/session
pub async fn current_session(MaybeSession(session): MaybeSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: session.map(|s| s.user),
    })
}

fn take_flow_cookies(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<(String, String)>) {
    let csrf = jar.get(CSRF_COOKIE).map(|c| c.value().to_string());
    let pkce = jar.get(PKCE_COOKIE).map(|c| c.value().to_string());

    let jar = jar
        .remove(Cookie::build(CSRF_COOKIE).path("/"))
        .remove(Cookie::build(PKCE_COOKIE).path("/"));

    match (pkce, csrf) {
        (Some(p), Some(c)) => (jar, Some((p, c))),
        _ => (jar, None),
    }
}

fn flow_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(15))
        .build()
}

fn session_cookie(token: String, ttl_days: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(ttl_days))
        .build()
}
