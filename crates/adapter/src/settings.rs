//! Runtime settings, read from flags or `FDAPI_*` environment variables.

use crate::error::{AdapterError, Result};
use clap::{Args, ValueEnum};
use fdapi_client::{ClientConfig, FdapiError};
use fdapi_client::config::{DEFAULT_LANGUAGE, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

/// Upstream connection options.
#[derive(Debug, Clone, Args)]
pub struct UpstreamArgs {
    /// Base URL of the FDAPI service
    #[arg(long, env = "FDAPI_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token sent to FDAPI
    #[arg(long, env = "FDAPI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Per-attempt request timeout in seconds
    #[arg(long = "timeout", env = "FDAPI_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Retries after the first attempt for connect failures and timeouts
    #[arg(long, env = "FDAPI_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES, global = true)]
    pub max_retries: u32,

    /// Language used when a tool call omits one
    #[arg(long, env = "FDAPI_DEFAULT_LANGUAGE", default_value = DEFAULT_LANGUAGE, global = true)]
    pub default_language: String,
}

/// Listener and logging options.
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// Host to bind
    #[arg(long, env = "FDAPI_MCP_HOST", default_value = DEFAULT_HOST, global = true)]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "FDAPI_MCP_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Enable debug logging (overrides --log-level)
    #[arg(long, env = "FDAPI_MCP_DEBUG", global = true)]
    pub debug: bool,

    /// Log level (error|warn|info|debug|trace); `RUST_LOG` takes precedence
    #[arg(long, env = "FDAPI_MCP_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "FDAPI_MCP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

/// Effective settings, built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub log_level: String,
    pub log_format: LogFormat,
    pub client: ClientConfig,
}

impl ServerSettings {
    /// Validate the parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Config`] if the base URL is missing or invalid, or the host is
    /// empty.
    pub fn from_args(server: &ServerArgs, upstream: &UpstreamArgs) -> Result<Self> {
        let host = server.host.trim();
        if host.is_empty() {
            return Err(AdapterError::Config("FDAPI_MCP_HOST must not be empty".into()));
        }

        Ok(Self {
            host: host.to_string(),
            port: server.port,
            debug: server.debug,
            log_level: server.log_level.trim().to_ascii_lowercase(),
            log_format: server.log_format,
            client: upstream.client_config()?,
        })
    }

    /// `debug` forces the debug level regardless of the configured one.
    #[must_use]
    pub fn effective_log_level(&self) -> &str {
        if self.debug { "debug" } else { &self.log_level }
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl UpstreamArgs {
    /// Build the client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Config`] if the base URL is missing or malformed.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| AdapterError::Config("FDAPI_BASE_URL is required".into()))?;

        let config = ClientConfig::new(base_url)
            .map_err(|e| match e {
                FdapiError::Configuration(msg) => AdapterError::Config(msg),
                other => AdapterError::Config(other.to_string()),
            })?
            .with_api_key(self.api_key.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries)
            .with_default_language(self.default_language.trim());
        Ok(config)
    }
}
