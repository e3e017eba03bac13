//! Content operations on top of one shared [`FdapiClient`].
//!
//! The adapter owns the client lifecycle (`start` / `stop`) and turns each tool invocation into
//! exactly one logical upstream request. MCP framing lives in [`crate::tools`].

use crate::error::{AdapterError, Result};
use fdapi_client::{ClientConfig, ContentKind, Entity, FdapiClient};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 20;

pub struct ContentAdapter {
    client: FdapiClient,
}

#[derive(Serialize)]
struct HealthReport<'a> {
    status: &'static str,
    base_url: &'a str,
    has_api_key: bool,
    timeout: u64,
    max_retries: u32,
}

impl ContentAdapter {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::from_client(FdapiClient::new(config))
    }

    #[must_use]
    pub fn from_client(client: FdapiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &FdapiClient {
        &self.client
    }

    #[must_use]
    pub fn default_language(&self) -> &str {
        self.client.config().default_language()
    }

    /// Open the upstream session and probe `/v1/health`.
    ///
    /// A failed probe is logged and otherwise ignored; the upstream may come up later.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP session cannot be built.
    pub async fn start(&self) -> Result<()> {
        self.client.start()?;

        if self.client.health_check().await {
            info!(base_url = %self.client.config().base_url(), "FDAPI health check passed");
        } else {
            warn!("FDAPI health check failed; serving anyway");
        }
        Ok(())
    }

    pub fn stop(&self) {
        self.client.close();
    }

    fn started_client(&self) -> Result<&FdapiClient> {
        if self.client.is_started() {
            Ok(&self.client)
        } else {
            Err(AdapterError::NotInitialized)
        }
    }

    /// Fetch one item by slug and validate it strictly against `E`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::NotInitialized`] before `start`, the typed client error on upstream
    /// failure (404/429/401/403 refined for this resource), or a validation error if the payload
    /// does not match `E`.
    pub async fn get<E: Entity>(&self, language: &str, slug: &str) -> Result<Value> {
        let client = self.started_client()?;
        let kind = E::KIND;
        let path = kind.item_path(language, slug);
        debug!(%kind, language, slug, "get");

        let raw = client
            .get(&path, None)
            .await
            .map_err(|e| e.for_resource(kind.name(), slug))?;
        let entity = E::from_value(raw)?;

        serde_json::to_value(&entity).map_err(|e| {
            error!(%kind, slug, error = %e, "failed to serialize entity");
            AdapterError::Other(format!("failed to get {kind}: {e}"))
        })
    }

    /// List one page of a collection. The upstream envelope is returned unvalidated.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidParams`] if `page` or `per_page` is zero, otherwise see
    /// [`ContentAdapter::get`].
    pub async fn list(
        &self,
        kind: ContentKind,
        language: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Value> {
        if page < 1 {
            return Err(AdapterError::InvalidParams("page must be >= 1".into()));
        }
        if per_page < 1 {
            return Err(AdapterError::InvalidParams("per_page must be >= 1".into()));
        }

        let client = self.started_client()?;
        debug!(%kind, language, page, per_page, "list");
        let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
        Ok(client
            .get(&kind.collection_path(language), Some(query.as_slice()))
            .await?)
    }

    /// Report upstream reachability and the effective client settings. Never fails.
    pub async fn health(&self) -> Value {
        if !self.client.is_started() {
            return json!({ "status": "error", "message": "client not initialized" });
        }

        let config = self.client.config();
        let healthy = self.client.health_check().await;
        let report = HealthReport {
            status: if healthy { "healthy" } else { "unhealthy" },
            base_url: config.base_url(),
            has_api_key: config.has_api_key(),
            timeout: config.timeout().as_secs(),
            max_retries: config.max_retries(),
        };

        serde_json::to_value(&report).unwrap_or_else(|e| {
            error!(error = %e, "failed to build health report");
            json!({
                "status": "error",
                "message": e.to_string(),
                "base_url": config.base_url(),
            })
        })
    }
}
