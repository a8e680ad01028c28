mod lintbase;
mod oauth;

pub use lintbase::{ApiErrorBody, ApiErrorObject, LintBaseError};
pub use oauth::OauthError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
