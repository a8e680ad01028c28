mod session;

pub use session::{MaybeSession, RequireAdmin, SessionUser, session_token};
