//! Resilient JSON client for the FDAPI content API.
//!
//! This crate is used by:
//! - `fdapi-mcp` (the MCP tool adapter)
//!
//! It owns the one long-lived HTTP session, the retry/backoff loop, the error taxonomy and the
//! strict entity schemas. It contains **no** MCP-specific code.

pub mod client;
pub mod config;
pub mod error;
pub mod kind;
pub mod models;
pub mod redact;

pub use client::{FdapiClient, HEALTH_PATH};
pub use config::ClientConfig;
pub use error::{FdapiError, Result};
pub use kind::ContentKind;
pub use models::{Album, Article, Document, Entity, Live, Timestamp, TimestampValue};
