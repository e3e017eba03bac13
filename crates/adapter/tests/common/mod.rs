#![allow(dead_code)]

use anyhow::Context as _;
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

pub use fdapi_test_support::{KillOnDrop, MockUpstream};

pub fn pick_unused_port() -> anyhow::Result<u16> {
    fdapi_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    fdapi_test_support::wait_http_ok(url, timeout_dur).await
}

/// A `fdapi-mcp` command with every `FDAPI_*` variable cleared, so the host environment cannot
/// leak into a test.
pub fn adapter_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fdapi-mcp"));
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("FDAPI_") {
            cmd.env_remove(&key);
        }
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

pub fn spawn_adapter(upstream_base: &str, port: u16) -> anyhow::Result<Child> {
    adapter_command()
        .arg("serve")
        .env("FDAPI_BASE_URL", upstream_base)
        .env("FDAPI_API_KEY", "integration-token")
        .env("FDAPI_MAX_RETRIES", "0")
        .env("FDAPI_TIMEOUT", "5")
        .env("FDAPI_MCP_HOST", "127.0.0.1")
        .env("FDAPI_MCP_PORT", port.to_string())
        .env("FDAPI_MCP_LOG_LEVEL", "info")
        .stdout(Stdio::null())
        .spawn()
        .context("spawn fdapi-mcp")
}

pub async fn start_adapter(upstream_base: &str) -> anyhow::Result<(String, KillOnDrop)> {
    let port = pick_unused_port()?;
    let child = KillOnDrop(spawn_adapter(upstream_base, port)?);

    let base_url = format!("http://127.0.0.1:{port}");
    wait_http_ok(&format!("{base_url}/health"), Duration::from_secs(20)).await?;

    Ok((base_url, child))
}

/// Run a short-lived command to completion.
pub fn run_adapter(args: &[&str], envs: &[(&str, &str)]) -> anyhow::Result<Output> {
    let mut cmd = adapter_command();
    cmd.args(args);
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.output().context("run fdapi-mcp")
}
