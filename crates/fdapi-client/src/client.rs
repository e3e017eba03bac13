//! Resilient HTTP client for FDAPI endpoints.
//!
//! One [`FdapiClient`] owns one long-lived `reqwest::Client` (the session). Requests go through a
//! bounded retry loop: connect failures and timeouts are retried with exponential backoff, while
//! HTTP error statuses and undecodable bodies fail on the first attempt.

use crate::config::ClientConfig;
use crate::error::{FdapiError, Result};
use crate::redact::{redact_url, sanitize_reqwest_error};
use parking_lot::RwLock;
use reqwest::header::{
    ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT,
};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Liveness endpoint probed by [`FdapiClient::health_check`].
pub const HEALTH_PATH: &str = "/v1/health";

const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);
const MAX_REDIRECTS: usize = 10;

/// Query parameters, passed through verbatim.
pub type Query<'a> = &'a [(&'a str, String)];

pub struct FdapiClient {
    config: ClientConfig,
    session: RwLock<Option<Client>>,
    backoff_unit: Duration,
}

/// Outcome of a single request attempt.
enum Attempt {
    Success(Value),
    /// Connect failure or timeout; the outer loop may try again.
    Retryable(reqwest::Error),
    Terminal(FdapiError),
}

impl FdapiClient {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            session: RwLock::new(None),
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }

    /// Override the backoff unit (the wait before retry `n` is `unit * 2^n`).
    #[must_use]
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.session.read().is_some()
    }

    /// Open the session. Calling this on a started client is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`FdapiError::Configuration`] if the token is not a valid header value or the
    /// underlying HTTP client cannot be built.
    pub fn start(&self) -> Result<()> {
        let mut session = self.session.write();
        if session.is_some() {
            return Ok(());
        }

        let client = Client::builder()
            .default_headers(self.default_headers()?)
            .timeout(self.config.timeout())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| {
                FdapiError::Configuration(format!(
                    "cannot build HTTP client: {}",
                    sanitize_reqwest_error(&e)
                ))
            })?;

        *session = Some(client);
        info!(base_url = %self.config.base_url(), "FDAPI client started");
        Ok(())
    }

    /// Release the session. Safe to call repeatedly or before [`Self::start`].
    pub fn close(&self) {
        if self.session.write().take().is_some() {
            info!("FDAPI client closed");
        }
    }

    /// Backoff before the retry that follows failed attempt `attempt` (0-based).
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(2u32.checked_pow(attempt).unwrap_or(u32::MAX))
    }

    /// Send a request and decode the JSON response.
    ///
    /// Up to `max_retries + 1` attempts are made. Only connect failures and timeouts are
    /// retried.
    ///
    /// # Errors
    ///
    /// - [`FdapiError::ClientNotStarted`] if there is no session
    /// - [`FdapiError::Connection`] if every attempt hit a connect failure or timeout
    /// - [`FdapiError::Response`] on HTTP status >= 400 or an undecodable success body
    /// - [`FdapiError::Request`] on any other transport failure
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<Query<'_>>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.resolve_url(path)?;
        let attempts = self.config.max_retries().saturating_add(1);

        for attempt in 0..attempts {
            // Re-read every time so a concurrent close() stops the loop.
            let session = self.session()?;
            debug!(
                method = %method,
                url = %redact_url(&url),
                attempt = attempt + 1,
                "sending FDAPI request"
            );

            match send_once(&session, &method, &url, query, body).await {
                Attempt::Success(value) => return Ok(value),
                Attempt::Terminal(err) => return Err(err),
                Attempt::Retryable(err) => {
                    let reason = if err.is_timeout() {
                        "request timeout"
                    } else {
                        "connection failed"
                    };
                    if attempt + 1 >= attempts {
                        return Err(FdapiError::Connection {
                            attempts,
                            message: format!(
                                "{reason} after {attempts} attempts: {}",
                                sanitize_reqwest_error(&err)
                            ),
                        });
                    }

                    let delay = self.backoff_delay(attempt);
                    warn!(
                        url = %redact_url(&url),
                        attempt = attempt + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "{reason}, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(FdapiError::Request(
            "request failed after all retry attempts".to_string(),
        ))
    }

    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn get(&self, path: &str, query: Option<Query<'_>>) -> Result<Value> {
        self.request(Method::GET, path, query, None).await
    }

    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        query: Option<Query<'_>>,
    ) -> Result<Value> {
        self.request(Method::POST, path, query, body).await
    }

    /// Probe [`HEALTH_PATH`]. Never fails: every error (including a missing session) is
    /// reported as `false`.
    pub async fn health_check(&self) -> bool {
        match self.get(HEALTH_PATH, None).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "FDAPI health check failed");
                false
            }
        }
    }

    fn session(&self) -> Result<Client> {
        self.session
            .read()
            .clone()
            .ok_or(FdapiError::ClientNotStarted)
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("fdapi-mcp/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.config.api_key() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                FdapiError::Configuration("API key is not a valid header value".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    fn resolve_url(&self, path: &str) -> Result<Url> {
        let raw = if path.starts_with("http") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.config.base_url(),
                path.trim_start_matches('/')
            )
        };
        Url::parse(&raw).map_err(|e| FdapiError::Request(format!("invalid request URL: {e}")))
    }
}

async fn send_once(
    session: &Client,
    method: &Method,
    url: &Url,
    query: Option<Query<'_>>,
    body: Option<&Value>,
) -> Attempt {
    let mut request = session.request(method.clone(), url.clone());
    if let Some(query) = query {
        request = request.query(query);
    }
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = match request.send().await {
        Ok(r) => r,
        Err(e) => return classify_transport_error(e),
    };

    let status = response.status();
    debug!(status = status.as_u16(), "FDAPI response received");
    let retry_after = parse_retry_after(response.headers());

    let bytes = match response.bytes().await {
        Ok(b) => b,
        Err(e) => return classify_transport_error(e),
    };

    if status.as_u16() >= 400 {
        return Attempt::Terminal(FdapiError::Response {
            status: Some(status.as_u16()),
            message: error_message(status, &bytes),
            retry_after,
        });
    }

    match serde_json::from_slice(&bytes) {
        Ok(value) => Attempt::Success(value),
        Err(e) => Attempt::Terminal(FdapiError::Response {
            status: None,
            message: format!("failed to parse JSON response: {e}"),
            retry_after: None,
        }),
    }
}

fn classify_transport_error(e: reqwest::Error) -> Attempt {
    if e.is_connect() || e.is_timeout() {
        Attempt::Retryable(e)
    } else {
        Attempt::Terminal(FdapiError::Request(sanitize_reqwest_error(&e)))
    }
}

/// `HTTP <status>`, enriched with the body's `message` field, or the raw body when it is not
/// JSON.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    let mut msg = format!("HTTP {}", status.as_u16());
    match serde_json::from_slice::<Value>(body) {
        Ok(json) => {
            if let Some(message) = json.get("message") {
                match message.as_str() {
                    Some(s) => msg.push_str(&format!(": {s}")),
                    None => msg.push_str(&format!(": {message}")),
                }
            }
        }
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            if !text.trim().is_empty() {
                msg.push_str(&format!(": {text}"));
            }
        }
    }
    msg
}

fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}
