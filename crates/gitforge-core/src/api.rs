//! The REST-client seam consumed by tool handlers.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Interface to the forge's REST API.
///
/// Implementations prefix paths with the API root, attach the access
/// token, and decode JSON responses. A success with an empty body maps
/// to [`Value::Null`], not an error.
#[async_trait]
pub trait ForgeApi: Send + Sync {
    /// GET `path` with optional query parameters.
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value>;

    /// POST `path` with an optional JSON body.
    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value>;

    /// PATCH `path` with an optional JSON body.
    async fn patch(&self, path: &str, body: Option<Value>) -> Result<Value>;

    /// DELETE `path`.
    async fn delete(&self, path: &str) -> Result<()>;
}
