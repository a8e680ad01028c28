use crate::auth::SessionCache;
use crate::config::Config;
use crate::db::DbActorHandle;
use crate::server::guards::RequireAdmin;
use crate::server::routes::{admin, auth, catalog, repository};
use crate::upstream::Upstreams;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, StatusCode, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use axum_extra::extract::cookie::Key;
use base64::Engine as _;
use lintbase_lintconfig_core::LinterTable;
use rand::RngCore;
use reqwest::header::HeaderValue;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct LintBaseState {
    pub db: DbActorHandle,
    pub upstreams: Upstreams,
    pub config: Arc<Config>,
    pub linter_table: Arc<LinterTable>,
    pub sessions: SessionCache,
    cookie_key: Key,
}

impl LintBaseState {
    pub fn new(
        db: DbActorHandle,
        upstreams: Upstreams,
        config: Arc<Config>,
        linter_table: Arc<LinterTable>,
    ) -> Self {
        let cookie_key = cookie_key(config.basic.cookie_secret.as_deref());
        Self {
            db,
            upstreams,
            config,
            linter_table,
            sessions: SessionCache::new(),
            cookie_key,
        }
    }
}

/// Key for the private cookie jar. Without a (64+ byte) secret, a random key
/// is used and every cookie is invalidated on restart.
fn cookie_key(secret: Option<&str>) -> Key {
    match secret.map(|s| Key::try_from(s.as_bytes())) {
        Some(Ok(key)) => key,
        Some(Err(_)) => {
            warn!("basic.cookie_secret is shorter than 64 bytes; using a random cookie key");
            Key::generate()
        }
        None => {
            warn!("basic.cookie_secret is not set; sessions will not survive a restart");
            Key::generate()
        }
    }
}

impl FromRef<LintBaseState> for Key {
    fn from_ref(state: &LintBaseState) -> Self {
        state.cookie_key.clone()
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status().as_u16();
    let latency_ms = start.elapsed().as_millis() as u64;
    let path = uri.path();
    let protocol = format_http_version(version);
    let method = method.as_str();

    if resp.status().is_server_error() {
        error!("| {status:>3} | {request_id} | {method:^7} | {protocol:<8} | {path} | {latency_ms}ms | {user_agent}");
    } else if resp.status().is_client_error() {
        warn!("| {status:>3} | {request_id} | {method:^7} | {protocol:<8} | {path} | {latency_ms}ms | {user_agent}");
    } else {
        info!("| {status:>3} | {request_id} | {method:^7} | {protocol:<8} | {path} | {latency_ms}ms | {user_agent}");
    }

    resp
}

pub fn lintbase_router(state: LintBaseState) -> Router {
    let admin = admin::router().layer(middleware::from_extractor_with_state::<RequireAdmin, _>(
        state.clone(),
    ));

    Router::new()
        .merge(auth::router())
        .merge(repository::router())
        .merge(catalog::router())
        .merge(admin)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
