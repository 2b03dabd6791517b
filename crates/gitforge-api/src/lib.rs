//! Forge REST API client for gitforge-tools.
//!
//! Implements [`gitforge_core::ForgeApi`] against a Gitea-compatible
//! `/api/v1` REST surface using `reqwest`.

pub mod client;

pub use client::ApiClient;
