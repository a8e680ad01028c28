use super::IsRetryable;
use super::lintbase::LintBaseError;
use axum::http::StatusCode;
use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use serde_json::Value;
use thiserror::Error as ThisError;

/// Failures of the sign-in flow (GitHub / Discord authorization code + PKCE).
#[derive(Debug, ThisError)]
pub enum OauthError {
    /// The browser-facing part of the flow is inconsistent (CSRF mismatch,
    /// missing verifier cookie, provider not configured).
    #[error("OAuth flow error: {message}")]
    Flow {
        code: String,
        message: String,
        details: Option<Value>,
    },

    #[error("OAuth2 request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OAuth2 upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("OAuth2 server response error: {error}")]
    ServerResponse { error: String },

    #[error("OAuth2 token endpoint parse error: {message}. Body: {body}")]
    Parse { message: String, body: String },

    #[error("OAuth2 unexpected error: {message}")]
    Other { message: String },
}

impl OauthError {
    pub fn flow(code: &str, message: impl Into<String>) -> Self {
        OauthError::Flow {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl IsRetryable for OauthError {
    fn is_retryable(&self) -> bool {
        match self {
            OauthError::Request(_) => true,
            OauthError::UpstreamStatus(status) => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}

type TokenExchangeError = RequestTokenError<
    HttpClientError<ReqwestClientError>,
    StandardErrorResponse<BasicErrorResponseType>,
>;

const PARSE_BODY_PREVIEW_CHARS: usize = 100;

impl From<TokenExchangeError> for OauthError {
    fn from(e: TokenExchangeError) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => OauthError::ServerResponse {
                error: err.error().to_string(),
            },
            RequestTokenError::Request(HttpClientError::Reqwest(inner)) => {
                OauthError::Request(*inner)
            }
            RequestTokenError::Request(other) => OauthError::Other {
                message: format!("token exchange transport: {other:?}"),
            },
            RequestTokenError::Parse(parse_err, body) => {
                let body = String::from_utf8_lossy(&body);
                let body = match body.char_indices().nth(PARSE_BODY_PREVIEW_CHARS) {
                    Some((idx, _)) => format!("{}...<truncated>", &body[..idx]),
                    None => body.into_owned(),
                };
                OauthError::Parse {
                    message: parse_err.to_string(),
                    body,
                }
            }
            RequestTokenError::Other(message) => OauthError::Other { message },
        }
    }
}

impl From<TokenExchangeError> for LintBaseError {
    fn from(e: TokenExchangeError) -> Self {
        OauthError::from(e).into()
    }
}
