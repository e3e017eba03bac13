//! Client configuration.

use crate::error::{FdapiError, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_LANGUAGE: &str = "en-gb";

/// Immutable, validated settings for one [`crate::FdapiClient`].
///
/// The base URL always starts with `http://` or `https://` and never ends with `/`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    max_retries: u32,
    default_language: String,
}

impl ClientConfig {
    /// Build a config with default timeout, retries and language.
    ///
    /// # Errors
    ///
    /// Returns [`FdapiError::Configuration`] if the base URL is empty, does not use the
    /// `http`/`https` scheme, or does not parse as an absolute URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(&base_url.into())?,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            default_language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    /// Set the bearer token. Empty tokens count as "no token".
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }
}

// The token must not end up in logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("default_language", &self.default_language)
            .finish()
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FdapiError::Configuration(
            "FDAPI base URL is required".to_string(),
        ));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(FdapiError::Configuration(format!(
            "FDAPI base URL must start with http:// or https:// (got '{trimmed}')"
        )));
    }

    let normalized = trimmed.trim_end_matches('/');
    Url::parse(normalized).map_err(|e| {
        FdapiError::Configuration(format!("invalid FDAPI base URL '{normalized}': {e}"))
    })?;

    Ok(normalized.to_string())
}
