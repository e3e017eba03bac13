//! MCP tool surface.
//!
//! One [`ContentTools`] value is created per MCP session; all of them share the same
//! [`ContentAdapter`] (and therefore the same upstream HTTP session).

use crate::adapter::{ContentAdapter, DEFAULT_PAGE, DEFAULT_PER_PAGE};
use crate::error::AdapterError;
use fdapi_client::{Album, Article, ContentKind, Document, Entity, FdapiError, Live};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

const INSTRUCTIONS: &str = "Read-only access to FDAPI content. Use get_* with a slug for one item \
and list_* for a page of a collection. Language tags look like `en-gb`; when omitted the server's \
default language is used.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetItemArgs {
    /// Content language tag, e.g. `en-gb`. Defaults to the server's configured language.
    #[serde(default)]
    pub language: Option<String>,
    /// Item slug.
    pub slug: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListArgs {
    /// Content language tag, e.g. `en-gb`. Defaults to the server's configured language.
    #[serde(default)]
    pub language: Option<String>,
    /// 1-based page number.
    #[serde(default = "default_page")]
    #[schemars(range(min = 1))]
    pub page: u32,
    /// Items per page.
    #[serde(default = "default_per_page")]
    #[schemars(range(min = 1))]
    pub per_page: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

#[derive(Clone)]
pub struct ContentTools {
    adapter: Arc<ContentAdapter>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ContentTools {
    #[must_use]
    pub fn new(adapter: Arc<ContentAdapter>) -> Self {
        Self {
            adapter,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get one album by slug")]
    async fn get_album(
        &self,
        Parameters(args): Parameters<GetItemArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        self.get_entity::<Album>(args).await
    }

    #[tool(description = "List albums (one page, returned as sent by FDAPI)")]
    async fn list_albums(
        &self,
        Parameters(args): Parameters<ListArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        self.list_kind(ContentKind::Album, args).await
    }

    #[tool(description = "Get one document by slug")]
    async fn get_document(
        &self,
        Parameters(args): Parameters<GetItemArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        self.get_entity::<Document>(args).await
    }

    #[tool(description = "List documents (one page, returned as sent by FDAPI)")]
    async fn list_documents(
        &self,
        Parameters(args): Parameters<ListArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        self.list_kind(ContentKind::Document, args).await
    }

    #[tool(description = "Get one article by slug")]
    async fn get_article(
        &self,
        Parameters(args): Parameters<GetItemArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        self.get_entity::<Article>(args).await
    }

    #[tool(description = "List articles (one page, returned as sent by FDAPI)")]
    async fn list_articles(
        &self,
        Parameters(args): Parameters<ListArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        self.list_kind(ContentKind::Article, args).await
    }

    #[tool(description = "Get one live event by slug")]
    async fn get_live(
        &self,
        Parameters(args): Parameters<GetItemArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        self.get_entity::<Live>(args).await
    }

    #[tool(description = "List live events (one page, returned as sent by FDAPI)")]
    async fn list_live(
        &self,
        Parameters(args): Parameters<ListArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        self.list_kind(ContentKind::Live, args).await
    }

    #[tool(description = "Check FDAPI reachability and report the client settings")]
    async fn health_check(&self) -> Result<CallToolResult, ErrorData> {
        json_result(&self.adapter.health().await)
    }
}

impl ContentTools {
    fn language<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.adapter.default_language())
    }

    async fn get_entity<E: Entity>(&self, args: GetItemArgs) -> Result<CallToolResult, ErrorData> {
        let language = self.language(args.language.as_deref());
        let value = self
            .adapter
            .get::<E>(language, &args.slug)
            .await
            .map_err(|e| tool_failure("get", E::KIND, e))?;
        json_result(&value)
    }

    async fn list_kind(
        &self,
        kind: ContentKind,
        args: ListArgs,
    ) -> Result<CallToolResult, ErrorData> {
        let language = self.language(args.language.as_deref());
        let value = self
            .adapter
            .list(kind, language, args.page, args.per_page)
            .await
            .map_err(|e| tool_failure("list", kind, e))?;
        json_result(&value)
    }
}

#[tool_handler]
impl ServerHandler for ContentTools {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info.name = env!("CARGO_PKG_NAME").into();
        info.server_info.version = env!("CARGO_PKG_VERSION").into();
        info.instructions = Some(INSTRUCTIONS.into());
        info
    }
}

fn tool_failure(op: &str, kind: ContentKind, err: AdapterError) -> ErrorData {
    match &err {
        AdapterError::Fdapi(FdapiError::NotFound { .. }) | AdapterError::InvalidParams(_) => {}
        AdapterError::Fdapi(e) => warn!(op, %kind, kind_of = e.kind(), error = %e, "tool call failed"),
        other => error!(op, %kind, error = %other, "tool call failed"),
    }
    err.into()
}

fn json_result(value: &Value) -> Result<CallToolResult, ErrorData> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ErrorData::internal_error(format!("failed to serialize result: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
