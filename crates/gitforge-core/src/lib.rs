//! Core traits, types, and error handling for gitforge-tools.
//!
//! This crate provides the foundational abstractions shared by the API
//! client, the MCP server, and the CLI.

pub mod api;
pub mod config;
pub mod error;

pub use api::ForgeApi;
pub use config::Config;
pub use error::{Error, Result};
