use backon::{ExponentialBuilder, Retryable};
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{IsRetryable, LintBaseError};
use crate::utils::logging::body_preview;

/// Connection settings shared by every upstream client.
pub(crate) struct ClientSettings<'a> {
    pub user_agent: &'static str,
    pub proxy: Option<&'a Url>,
    pub enable_multiplexing: bool,
    pub timeout: Duration,
}

pub(crate) fn build_client(settings: ClientSettings<'_>) -> Result<reqwest::Client, LintBaseError> {
    let mut headers = HeaderMap::new();
    let mut builder = reqwest::Client::builder()
        .user_agent(settings.user_agent)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(5))
        .timeout(settings.timeout);

    if let Some(proxy_url) = settings.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    if !settings.enable_multiplexing {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        builder = builder
            .http1_only()
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(0));
    } else {
        builder = builder.http2_adaptive_window(true);
    }

    Ok(builder.default_headers(headers).build()?)
}

pub(crate) fn retry_policy(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(200))
        .with_max_delay(Duration::from_secs(3))
        .with_max_times(max_times)
        .with_jitter()
}

/// Sends the request built by `build`, retrying network errors, 429 and 5xx.
/// Any other non-success status becomes [`LintBaseError::UpstreamStatus`].
pub(crate) async fn send_with_retry<F>(
    upstream: &'static str,
    policy: ExponentialBuilder,
    build: F,
) -> Result<reqwest::Response, LintBaseError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let build = &build;
    (move || async move {
        let resp = build().send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let url = resp.url().clone();
        let body_preview = match resp.bytes().await {
            Ok(bytes) => body_preview(&bytes),
            Err(e) => format!("<failed to read body: {e}>"),
        };
        debug!(
            upstream,
            %status,
            url = %url,
            body = %body_preview,
            "[{upstream}] Upstream returned error status"
        );
        Err(LintBaseError::UpstreamStatus(status))
    })
    .retry(policy)
    .when(|err: &LintBaseError| err.is_retryable())
    .notify(|err: &LintBaseError, delay: Duration| {
        debug!(upstream, ?delay, error = %err, "[{upstream}] Retrying upstream call");
    })
    .await
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, LintBaseError> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    upstream: &'static str,
    client: &reqwest::Client,
    policy: ExponentialBuilder,
    url: &Url,
    headers: HeaderMap,
) -> Result<T, LintBaseError> {
    let resp = send_with_retry(upstream, policy, || {
        client.get(url.clone()).headers(headers.clone())
    })
    .await?;
    read_json(resp).await
}

pub(crate) async fn post_json<B, T>(
    upstream: &'static str,
    client: &reqwest::Client,
    policy: ExponentialBuilder,
    url: &Url,
    headers: HeaderMap,
    body: &B,
) -> Result<T, LintBaseError>
where
    B: Serialize,
    T: DeserializeOwned,
{
    let resp = send_with_retry(upstream, policy, || {
        client.post(url.clone()).headers(headers.clone()).json(body)
    })
    .await?;
    read_json(resp).await
}

/// `Authorization: Bearer <token>` as a header map.
pub(crate) fn bearer_headers(token: Option<&str>) -> Result<HeaderMap, LintBaseError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            LintBaseError::UnexpectedError("token is not a valid header value".to_string())
        })?;
        headers.insert(reqwest::header::AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Appends path segments (percent-encoding each) to a base URL.
pub(crate) fn join_segments<'a>(
    base: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, LintBaseError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| LintBaseError::UnexpectedError(format!("cannot-be-a-base url: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_segments_encodes_each_segment() {
        let base = Url::parse("https://registry.npmjs.org").unwrap();
        let url = join_segments(&base, ["@typescript-eslint/eslint-plugin"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://registry.npmjs.org/@typescript-eslint%2Feslint-plugin"
        );

        let base = Url::parse("https://api.github.com/").unwrap();
        let url = join_segments(&base, ["repos", "octo", "hello", "contents", ""]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/octo/hello/contents/");
    }

    #[test]
    fn bearer_headers_rejects_control_characters() {
        assert!(bearer_headers(Some("abc\n")).is_err());
        assert!(bearer_headers(None).unwrap().is_empty());
        assert!(bearer_headers(Some("abc")).unwrap().contains_key("authorization"));
    }
}
