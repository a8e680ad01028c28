//! Sign-in with GitHub or Discord and the opaque session tokens issued afterwards.

mod provider;
mod session;

pub use provider::{OauthTokenResponse, Provider, StandardOauth2Client, build_oauth2_client};
pub use session::{SESSION_COOKIE, SessionCache, generate_session_token};
