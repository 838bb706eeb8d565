//! Resilient HTTP transport for the GitHub REST API
//!
//! [`HttpClient`] wraps every outbound request with:
//! - rate-limit detection (429, or 403 carrying rate-limit headers) honoring `Retry-After`
//! - exponential backoff for rate limits and transient network failures
//! - 404 passthrough for callers that treat absence as a valid state
//! - normalization of error bodies into [`Error`] variants
//!
//! It knows nothing about what success means for a particular endpoint.

use crate::config::{GitHubConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::with_retry;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, RETRY_AFTER};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Media type requested from the API
pub const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// REST API version pinned on every request
pub const API_VERSION: &str = "2022-11-28";

/// Length of the raw-body excerpt attached to parse errors
const SNIPPET_LEN: usize = 200;

/// Per-request behavior switches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Return a 404 response to the caller instead of failing
    pub allow_not_found: bool,
    /// Do not follow redirects; return 3xx responses to the caller
    pub accept_redirect: bool,
}

impl RequestOptions {
    /// Options for an existence probe
    pub fn allow_not_found() -> Self {
        Self {
            allow_not_found: true,
            ..Default::default()
        }
    }

    /// Options for an endpoint that may answer with a redirect
    pub fn accept_redirect() -> Self {
        Self {
            accept_redirect: true,
            ..Default::default()
        }
    }
}

/// Authenticated, retrying HTTP client
#[derive(Clone)]
pub struct HttpClient {
    /// Client that follows redirects (regular API calls)
    client: reqwest::Client,
    /// Client that hands redirects back to the caller
    no_redirect: reqwest::Client,
    /// Access token sent as a bearer credential
    token: String,
    /// Retry policy shared by every request
    retry: RetryConfig,
}

impl HttpClient {
    /// Create a new client
    ///
    /// # Errors
    /// Returns [`Error::Other`] if the underlying HTTP client cannot be created
    pub fn new(github: &GitHubConfig, retry: RetryConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, ACCEPT_HEADER.parse().map_err(invalid_header)?);
        headers.insert(
            "x-github-api-version",
            API_VERSION.parse().map_err(invalid_header)?,
        );

        let build = |policy: reqwest::redirect::Policy| {
            reqwest::Client::builder()
                .timeout(github.request_timeout)
                .user_agent(&github.user_agent)
                .default_headers(headers.clone())
                .redirect(policy)
                .build()
                .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))
        };

        Ok(Self {
            client: build(reqwest::redirect::Policy::limited(10))?,
            no_redirect: build(reqwest::redirect::Policy::none())?,
            token: github.token.clone(),
            retry,
        })
    }

    /// Issue an authenticated request with retries
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `url` - Absolute URL
    /// * `body` - Optional JSON body
    /// * `options` - 404 and redirect handling
    ///
    /// # Errors
    /// - [`Error::RetriesExhausted`] if every attempt was rate limited
    /// - [`Error::Network`] if the final attempt failed at the transport level
    /// - [`Error::Unauthorized`], [`Error::Forbidden`], [`Error::NotFound`] or
    ///   [`Error::Api`] for non-success responses
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        options: RequestOptions,
    ) -> Result<Response> {
        let this = self;
        let result = with_retry(&self.retry, move || {
            this.send_once(method.clone(), url, body, options, true)
        })
        .await;
        self.finish(result)
    }

    /// GET a URL without sending the credential
    ///
    /// Used for redirect targets that embed their own short-lived authorization.
    pub async fn get_unauthenticated(&self, url: &str) -> Result<Vec<u8>> {
        let this = self;
        let result = with_retry(&self.retry, move || {
            this.send_once(Method::GET, url, None, RequestOptions::default(), false)
        })
        .await;
        let response = self.finish(result)?;
        Ok(response.bytes().await?.to_vec())
    }

    /// GET a URL and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T> {
        let response = self
            .request(Method::GET, url, None, RequestOptions::default())
            .await?;
        read_json(response, context).await
    }

    /// Report a rate limit that outlasted the retries as exhausted
    ///
    /// A rate limit whose server delay exceeds the retry ceiling was never
    /// retried and is returned as is.
    fn finish(&self, result: Result<Response>) -> Result<Response> {
        match result {
            Err(Error::RateLimited {
                status,
                retry_after: Some(delay),
            }) if delay > self.retry.max_delay => Err(Error::RateLimited {
                status,
                retry_after: Some(delay),
            }),
            Err(Error::RateLimited { .. }) => Err(Error::RetriesExhausted {
                attempts: self.retry.max_attempts.max(1),
            }),
            other => other,
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        options: RequestOptions,
        authenticated: bool,
    ) -> Result<Response> {
        let client = if options.accept_redirect {
            &self.no_redirect
        } else {
            &self.client
        };

        debug!(%method, url, "sending request");

        let mut request = client.request(method.clone(), url);
        if authenticated {
            request = request.header(AUTHORIZATION, format!("Bearer {}", self.token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }
        if status.is_redirection() && options.accept_redirect {
            return Ok(response);
        }
        if let Some(retry_after) = rate_limit(status, response.headers()) {
            warn!(
                %method,
                url,
                status = status.as_u16(),
                retry_after_secs = retry_after.map(|d| d.as_secs()),
                "rate limited"
            );
            return Err(Error::RateLimited {
                status: status.as_u16(),
                retry_after,
            });
        }
        if status == StatusCode::NOT_FOUND && options.allow_not_found {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = extract_message(status, &text);
        debug!(%method, url, status = status.as_u16(), %message, "request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
            StatusCode::FORBIDDEN => Error::Forbidden(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

fn invalid_header(e: reqwest::header::InvalidHeaderValue) -> Error {
    Error::Other(format!("invalid header value: {}", e))
}

/// Classify a response as rate limited
///
/// Returns `None` if the response is not a rate limit, `Some(delay)` otherwise,
/// where `delay` is the server-supplied wait if one was sent.
fn rate_limit(status: StatusCode, headers: &HeaderMap) -> Option<Option<Duration>> {
    let retry_after = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    let exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    match status {
        StatusCode::TOO_MANY_REQUESTS => Some(retry_after),
        // A bare 403 is a permission problem, not throttling
        StatusCode::FORBIDDEN if retry_after.is_some() || exhausted => Some(retry_after),
        _ => None,
    }
}

/// Best-available error message from a response body
///
/// Prefers the JSON `message` field (with `errors` appended when present),
/// then the raw text, then the status reason.
pub(crate) fn extract_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = json.get("message").and_then(|m| m.as_str())
    {
        return match json.get("errors") {
            Some(errors) if !errors.is_null() => format!("{} - {}", message, errors),
            _ => message.to_string(),
        };
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return snippet(trimmed, 500);
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Decode a JSON response body, keeping a raw excerpt on failure
pub async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| Error::Parse {
        context: context.to_string(),
        message: e.to_string(),
        snippet: snippet(&text, SNIPPET_LEN),
    })
}

fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
