use crate::db::DbSessionUser;
use base64::Engine as _;
use moka::sync::Cache;
use rand::RngCore;
use std::time::Duration;

/// Private cookie holding the session token.
pub const SESSION_COOKIE: &str = "lintbase_session";

const SESSION_TOKEN_BYTES: usize = 32;
const SESSION_CACHE_TTL: Duration = Duration::from_secs(60);
const SESSION_CACHE_CAPACITY: u64 = 10_000;

/// 256-bit random token, base64url without padding.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Short-lived token -> user cache in front of the sessions table.
///
/// Entries never outlive the session's own expiry: lookups re-check
/// `expires_at` before returning a cached user.
#[derive(Clone)]
pub struct SessionCache {
    inner: Cache<String, DbSessionUser>,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCache {
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(SESSION_CACHE_CAPACITY)
                .time_to_live(SESSION_CACHE_TTL)
                .build(),
        }
    }

    pub fn get(&self, token: &str) -> Option<DbSessionUser> {
        let user = self.inner.get(token)?;
        if user.expires_at <= chrono::Utc::now() {
            self.inner.invalidate(token);
            return None;
        }
        Some(user)
    }

    pub fn insert(&self, token: String, user: DbSessionUser) {
        self.inner.insert(token, user);
    }

    pub fn invalidate(&self, token: &str) {
        self.inner.invalidate(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn user(expires_in: ChronoDuration) -> DbSessionUser {
        DbSessionUser {
            id: 7,
            name: Some("octo".to_string()),
            email: None,
            image: None,
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn tokens_are_url_safe_and_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn cache_drops_expired_sessions() {
        let cache = SessionCache::new();
        cache.insert("live".to_string(), user(ChronoDuration::hours(1)));
        cache.insert("stale".to_string(), user(ChronoDuration::seconds(-1)));

        assert_eq!(cache.get("live").map(|u| u.id), Some(7));
        assert!(cache.get("stale").is_none());

        cache.invalidate("live");
        assert!(cache.get("live").is_none());
    }
}
