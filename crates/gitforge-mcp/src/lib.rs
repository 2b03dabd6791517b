//! MCP (Model Context Protocol) server for gitforge-tools.
//!
//! Exposes the forge's issue, label, milestone, and project board
//! operations as MCP tools over newline-delimited JSON-RPC 2.0 on a
//! pair of byte streams (stdin/stdout in the shipped binary).

pub mod protocol;
pub mod registry;
pub mod server;
pub mod tools;
pub mod transport;

pub use registry::Registry;
pub use server::McpServer;
pub use transport::Transport;
