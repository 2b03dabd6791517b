//! Tool registry and dispatch.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gitforge_core::{Error, ForgeApi, Result};
use serde_json::{Map, Value};

use crate::protocol::{ToolCallResult, ToolDefinition};

/// Future returned by a tool handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// A tool handler maps resolved call arguments to one backend call and
/// returns the decoded value unchanged.
pub type ToolHandler = fn(Arc<dyn ForgeApi>, Map<String, Value>) -> HandlerFuture;

struct ToolDef {
    tool: ToolDefinition,
    handler: ToolHandler,
}

/// Insertion-ordered catalogue of tools, built once at startup and
/// read-only afterwards.
#[derive(Default)]
pub struct Registry {
    tools: Vec<ToolDef>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a registry with the full resource tool catalogue.
    pub fn with_default_tools() -> Self {
        let mut registry = Self::new();
        crate::tools::register_all(&mut registry);
        registry
    }

    /// Add a tool definition to the registry.
    ///
    /// Panics if the name is already registered: a colliding entry
    /// would be permanently unreachable, so registration fails fast.
    pub fn register(&mut self, tool: ToolDefinition, handler: ToolHandler) {
        assert!(
            !self.tools.iter().any(|def| def.tool.name == tool.name),
            "duplicate tool name: {}",
            tool.name
        );
        self.tools.push(ToolDef { tool, handler });
    }

    /// All tool descriptors, in registration order.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|def| def.tool.clone()).collect()
    }

    /// Dispatch a tool call to the matching handler.
    ///
    /// Handler failures (argument validation, backend errors) come back
    /// as an `Ok` result flagged with `is_error`; only an unknown tool
    /// name is an `Err`, which the server surfaces as a protocol-level
    /// internal error.
    pub async fn call(
        &self,
        client: &Arc<dyn ForgeApi>,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolCallResult> {
        let def = self
            .tools
            .iter()
            .find(|def| def.tool.name == name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;

        tracing::info!(tool = name, "calling tool");

        match (def.handler)(Arc::clone(client), arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => Ok(ToolCallResult::text(text)),
                Err(e) => Ok(ToolCallResult::error(format!(
                    "Error serializing result: {}",
                    e
                ))),
            },
            Err(e) => Ok(ToolCallResult::error(format!("Error: {}", e))),
        }
    }
}
