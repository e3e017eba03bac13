//! Command-line entry points.

use crate::logging::init_tracing;
use crate::server;
use crate::settings::{ServerArgs, ServerSettings, UpstreamArgs};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize as _;
use std::fmt::Write as _;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(
    name = "fdapi-mcp",
    version,
    about = "Expose the FDAPI content API as MCP tools over streamable HTTP"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub upstream: UpstreamArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start the MCP server
    Serve,
    /// Print the version
    Version,
    /// Print the effective configuration
    Config,
}

/// Run one CLI command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => {
            print!("{}", render_banner());
            println!("Run `fdapi-mcp --help` for usage.");
            Ok(())
        }
        Some(Command::Version) => {
            println!("fdapi-mcp {VERSION}");
            Ok(())
        }
        Some(Command::Config) => {
            let settings = ServerSettings::from_args(&cli.server, &cli.upstream)?;
            print!("{}", render_config(&settings));
            Ok(())
        }
        Some(Command::Serve) => {
            let settings = ServerSettings::from_args(&cli.server, &cli.upstream)?;
            init_tracing(settings.effective_log_level(), settings.log_format);
            eprint!("{}", render_banner());
            server::serve(&settings).await?;
            Ok(())
        }
    }
}

#[must_use]
pub fn render_banner() -> String {
    format!(
        "{} {}\n{}\n",
        "FDAPI MCP Server".bold().cyan(),
        format!("v{VERSION}").dimmed(),
        "Model Context Protocol tools for FDAPI content".dimmed()
    )
}

/// Human-readable configuration dump. The API key is never printed.
#[must_use]
pub fn render_config(settings: &ServerSettings) -> String {
    let client = &settings.client;
    let api_key = if client.has_api_key() { "***" } else { "Not set" };

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Server".bold().green());
    let _ = writeln!(out, "  {:<18}{}", "Host:", settings.host);
    let _ = writeln!(out, "  {:<18}{}", "Port:", settings.port);
    let _ = writeln!(out, "  {:<18}{}", "Debug:", settings.debug);
    let _ = writeln!(out, "  {:<18}{}", "Log level:", settings.effective_log_level());
    let _ = writeln!(out, "  {:<18}{}", "Log format:", settings.log_format.as_str());
    let _ = writeln!(out, "{}", "FDAPI".bold().green());
    let _ = writeln!(out, "  {:<18}{}", "Base URL:", client.base_url());
    let _ = writeln!(out, "  {:<18}{}", "API key:", api_key);
    let _ = writeln!(out, "  {:<18}{}s", "Timeout:", client.timeout().as_secs());
    let _ = writeln!(out, "  {:<18}{}", "Max retries:", client.max_retries());
    let _ = writeln!(out, "  {:<18}{}", "Default language:", client.default_language());
    out
}
