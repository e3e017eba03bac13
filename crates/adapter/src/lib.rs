//! FDAPI content tools served over the Model Context Protocol.
//!
//! Layers, bottom-up:
//! - [`adapter`]: client lifecycle and one method per content operation
//! - [`tools`]: the MCP tool surface (`get_album`, `list_albums`, ..., `health_check`)
//! - [`server`]: axum router with the streamable HTTP transport at `/mcp`
//! - [`cli`]: `serve`, `version` and `config` commands

pub mod adapter;
pub mod cli;
pub mod error;
pub mod logging;
pub mod server;
pub mod session_manager;
pub mod settings;
pub mod tools;

pub use adapter::ContentAdapter;
pub use error::{AdapterError, Result};
pub use settings::ServerSettings;
pub use tools::ContentTools;
