use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use lintbase_lintconfig_core::ConfigSourceError;
use lintbase_schema::ContentDecodeError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

use super::IsRetryable;
use super::oauth::OauthError;

#[derive(Debug, ThisError)]
pub enum LintBaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Upstream not configured: {0}")]
    UpstreamNotConfigured(&'static str),

    #[error(transparent)]
    Oauth(#[from] OauthError),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Content decode error: {0}")]
    ContentDecode(#[from] ContentDecodeError),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] ConfigSourceError),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl LintBaseError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl IntoResponse for LintBaseError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            LintBaseError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{what} not found."),
                    details: None,
                },
            ),

            LintBaseError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ApiErrorObject {
                    code: "UNAUTHENTICATED".to_string(),
                    message: "Sign in to continue.".to_string(),
                    details: None,
                },
            ),

            LintBaseError::Forbidden => (
                StatusCode::FORBIDDEN,
                ApiErrorObject {
                    code: "FORBIDDEN".to_string(),
                    message: "You are not allowed to perform this action.".to_string(),
                    details: None,
                },
            ),

            LintBaseError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code: "BAD_REQUEST".to_string(),
                    message,
                    details: None,
                },
            ),

            LintBaseError::DatabaseError(_)
            | LintBaseError::RactorError(_)
            | LintBaseError::UnexpectedError(_)
            | LintBaseError::Oauth(OauthError::Other { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                },
            ),

            LintBaseError::Oauth(OauthError::Flow {
                code,
                message,
                details,
            }) => (
                StatusCode::FORBIDDEN,
                ApiErrorObject {
                    code,
                    message,
                    details,
                },
            ),

            LintBaseError::UpstreamNotConfigured(name) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorObject {
                    code: "UPSTREAM_NOT_CONFIGURED".to_string(),
                    message: format!("{name} is not configured."),
                    details: None,
                },
            ),

            LintBaseError::JsonError(_)
            | LintBaseError::ContentDecode(_)
            | LintBaseError::ConfigSource(_)
            | LintBaseError::Oauth(OauthError::Parse { .. }) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorObject {
                    code: "BAD_UPSTREAM_PAYLOAD".to_string(),
                    message: "Failed to parse upstream response.".to_string(),
                    details: None,
                },
            ),

            LintBaseError::Oauth(OauthError::Request(_))
            | LintBaseError::Oauth(OauthError::ServerResponse { .. })
            | LintBaseError::ReqwestError(_)
            | LintBaseError::UrlError(_) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorObject {
                    code: "UPSTREAM_ERROR".to_string(),
                    message: "Upstream service error.".to_string(),
                    details: None,
                },
            ),

            LintBaseError::UpstreamStatus(code)
            | LintBaseError::Oauth(OauthError::UpstreamStatus(code)) => {
                let (status, err_code, msg) = match code {
                    StatusCode::TOO_MANY_REQUESTS => (
                        code,
                        "RATE_LIMIT",
                        "Upstream rate limit exceeded.",
                    ),
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_DENIED",
                        "Upstream permission denied.",
                    ),
                    StatusCode::NOT_FOUND => (
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        "Upstream resource not found.",
                    ),
                    _ => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "An upstream error occurred.",
                    ),
                };
                (
                    status,
                    ApiErrorObject {
                        code: err_code.to_string(),
                        message: msg.to_string(),
                        details: Some(serde_json::json!({ "upstreamStatus": code.as_u16() })),
                    },
                )
            }
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}

impl From<JsonRejection> for LintBaseError {
    fn from(rejection: JsonRejection) -> Self {
        LintBaseError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for LintBaseError {
    fn from(rejection: QueryRejection) -> Self {
        LintBaseError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for LintBaseError {
    fn from(rejection: PathRejection) -> Self {
        LintBaseError::BadRequest(rejection.body_text())
    }
}

impl IsRetryable for LintBaseError {
    fn is_retryable(&self) -> bool {
        match self {
            LintBaseError::ReqwestError(_) => true,
            LintBaseError::UpstreamStatus(status) => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            LintBaseError::Oauth(err) => err.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(LintBaseError::UpstreamStatus(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(LintBaseError::UpstreamStatus(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(!LintBaseError::UpstreamStatus(StatusCode::NOT_FOUND).is_retryable());
        assert!(!LintBaseError::Unauthenticated.is_retryable());
    }

    #[test]
    fn error_statuses() {
        let cases = [
            (LintBaseError::not_found("Repository"), StatusCode::NOT_FOUND),
            (LintBaseError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (LintBaseError::Forbidden, StatusCode::FORBIDDEN),
            (
                LintBaseError::BadRequest("nope".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                LintBaseError::UpstreamStatus(StatusCode::INTERNAL_SERVER_ERROR),
                StatusCode::BAD_GATEWAY,
            ),
            (
                LintBaseError::UnexpectedError("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
