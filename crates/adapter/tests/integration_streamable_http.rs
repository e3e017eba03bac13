mod common;
mod common_mcp;

use anyhow::Context as _;
use axum::Router;
use axum::extract::{Path, RawQuery};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use serde_json::{Value, json};
use std::time::Duration;

use common::{MockUpstream, start_adapter};
use common_mcp::{McpStreamableHttpSession, tool_call_body_json};

/// Upstream stand-in. Every content response echoes the bearer token it received.
fn content_api() -> Router {
    Router::new()
        .route("/v1/health", get(|| async { axum::Json(json!({"status": "ok"})) }))
        .route(
            "/v1/content/{language}/{plural}/{slug}",
            get(
                |Path((language, plural, slug)): Path<(String, String, String)>,
                 headers: HeaderMap| async move {
                    if slug == "missing" {
                        return (
                            StatusCode::NOT_FOUND,
                            axum::Json(json!({"message": "not here"})),
                        );
                    }
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    (
                        StatusCode::OK,
                        axum::Json(json!({
                            "id": format!("{plural}:{slug}"),
                            "title": "Integration",
                            "slug": slug,
                            "language": language,
                            "metadata": { "auth": auth },
                        })),
                    )
                },
            ),
        )
        .route(
            "/v1/content/{language}/{plural}",
            get(
                |Path((language, plural)): Path<(String, String)>,
                 RawQuery(query): RawQuery| async move {
                    axum::Json(json!({
                        "items": [{ "slug": "one" }],
                        "language": language,
                        "kind": plural,
                        "query": query,
                    }))
                },
            ),
        )
}

async fn call_tool(
    session: &McpStreamableHttpSession,
    id: u64,
    name: &str,
    arguments: Value,
) -> anyhow::Result<Value> {
    session
        .request(
            id,
            "tools/call",
            json!({ "name": name, "arguments": arguments }),
            Duration::from_secs(20),
        )
        .await
}

#[tokio::test]
async fn tools_list_exposes_every_content_tool() -> anyhow::Result<()> {
    let upstream = MockUpstream::spawn(content_api()).await?;
    let (base_url, _adapter) = start_adapter(upstream.base_url()).await?;
    let session = McpStreamableHttpSession::connect(&base_url).await?;

    let msg = session
        .request(1, "tools/list", json!({}), Duration::from_secs(10))
        .await?;
    let tools = msg
        .get("result")
        .and_then(|r| r.get("tools"))
        .and_then(Value::as_array)
        .context("tools/list missing result.tools")?;

    for name in [
        "get_album",
        "list_albums",
        "get_document",
        "list_documents",
        "get_article",
        "list_articles",
        "get_live",
        "list_live",
        "health_check",
    ] {
        anyhow::ensure!(
            tools.iter().any(|t| t.get("name") == Some(&json!(name))),
            "expected {name} in tools/list"
        );
    }

    let get_album = tools
        .iter()
        .find(|t| t.get("name") == Some(&json!("get_album")))
        .context("get_album")?;
    let required = get_album
        .pointer("/inputSchema/required")
        .and_then(Value::as_array)
        .context("get_album inputSchema.required")?;
    anyhow::ensure!(required.contains(&json!("slug")), "slug must be required");

    Ok(())
}

#[tokio::test]
async fn get_and_list_roundtrip_through_the_upstream() -> anyhow::Result<()> {
    let upstream = MockUpstream::spawn(content_api()).await?;
    let (base_url, _adapter) = start_adapter(upstream.base_url()).await?;
    let session = McpStreamableHttpSession::connect(&base_url).await?;

    let msg = call_tool(
        &session,
        2,
        "get_album",
        json!({ "language": "en-gb", "slug": "test-album" }),
    )
    .await?;
    let album = tool_call_body_json(&msg)?;
    anyhow::ensure!(album.get("id") == Some(&json!("albums:test-album")));
    anyhow::ensure!(album.get("description") == Some(&Value::Null));
    anyhow::ensure!(
        album.pointer("/metadata/auth") == Some(&json!("Bearer integration-token")),
        "bearer token not forwarded: {album}"
    );

    let msg = call_tool(&session, 3, "get_live", json!({ "slug": "final" })).await?;
    let live = tool_call_body_json(&msg)?;
    anyhow::ensure!(live.get("language") == Some(&json!("en-gb")));

    let msg = call_tool(
        &session,
        4,
        "list_articles",
        json!({ "language": "fr-fr", "page": 2, "per_page": 5 }),
    )
    .await?;
    let page = tool_call_body_json(&msg)?;
    anyhow::ensure!(page.get("kind") == Some(&json!("articles")));
    anyhow::ensure!(page.get("query") == Some(&json!("page=2&per_page=5")));

    let msg = call_tool(&session, 5, "health_check", json!({})).await?;
    let health = tool_call_body_json(&msg)?;
    anyhow::ensure!(health.get("status") == Some(&json!("healthy")));
    anyhow::ensure!(health.get("has_api_key") == Some(&json!(true)));

    Ok(())
}

#[tokio::test]
async fn tool_errors_surface_as_jsonrpc_errors() -> anyhow::Result<()> {
    let upstream = MockUpstream::spawn(content_api()).await?;
    let (base_url, _adapter) = start_adapter(upstream.base_url()).await?;
    let session = McpStreamableHttpSession::connect(&base_url).await?;

    let msg = call_tool(
        &session,
        6,
        "get_document",
        json!({ "language": "en-gb", "slug": "missing" }),
    )
    .await?;
    let err = msg.get("error").context("expected a JSON-RPC error")?;
    anyhow::ensure!(err.get("code") == Some(&json!(-32002)), "got {err}");
    anyhow::ensure!(err.pointer("/data/kind") == Some(&json!("not_found")));
    anyhow::ensure!(err.pointer("/data/status") == Some(&json!(404)));

    let msg = call_tool(
        &session,
        7,
        "list_albums",
        json!({ "language": "en-gb", "page": 0 }),
    )
    .await?;
    let err = msg.get("error").context("expected a JSON-RPC error")?;
    anyhow::ensure!(err.get("code") == Some(&json!(-32602)), "got {err}");

    Ok(())
}

#[tokio::test]
async fn serves_with_unreachable_upstream() -> anyhow::Result<()> {
    let dead = fdapi_test_support::unused_local_url()?;
    let (base_url, _adapter) = start_adapter(&dead).await?;
    let session = McpStreamableHttpSession::connect(&base_url).await?;

    let msg = call_tool(&session, 8, "health_check", json!({})).await?;
    let health = tool_call_body_json(&msg)?;
    anyhow::ensure!(health.get("status") == Some(&json!("unhealthy")));

    let msg = call_tool(
        &session,
        9,
        "get_article",
        json!({ "language": "en-gb", "slug": "x" }),
    )
    .await?;
    let err = msg.get("error").context("expected a JSON-RPC error")?;
    anyhow::ensure!(err.pointer("/data/kind") == Some(&json!("connection")), "got {err}");

    Ok(())
}
