//! MCP server implementation.
//!
//! Owns the request/response loop: read a line, parse the envelope,
//! route the method, write exactly one flushed response line per
//! request. Processing is strictly sequential; a request's backend
//! call completes before the next line is read, so responses are
//! emitted in input order.

use std::io;
use std::sync::Arc;

use gitforge_core::ForgeApi;
use serde_json::{Map, Value};

use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability, ToolsListResult, MCP_VERSION,
};
use crate::registry::Registry;
use crate::transport::Transport;

/// MCP server bridging JSON-RPC tool calls to the forge API.
pub struct McpServer {
    client: Arc<dyn ForgeApi>,
    registry: Registry,
    default_owner: Option<String>,
    default_repo: Option<String>,
    transport: Transport,
}

impl McpServer {
    /// Create a server with the full tool catalogue.
    ///
    /// `default_owner`/`default_repo` fill in tool-call arguments that
    /// omit them; empty strings count as unset.
    pub fn new(
        client: Arc<dyn ForgeApi>,
        default_owner: Option<String>,
        default_repo: Option<String>,
        transport: Transport,
    ) -> Self {
        Self {
            client,
            registry: Registry::with_default_tools(),
            default_owner: default_owner.filter(|s| !s.is_empty()),
            default_repo: default_repo.filter(|s| !s.is_empty()),
            transport,
        }
    }

    /// Run the request loop until end of input.
    ///
    /// An I/O fault on either stream is the server's terminal error.
    pub async fn run(&mut self) -> io::Result<()> {
        tracing::info!(tools = self.registry.list().len(), "MCP server started");

        while let Some(line) = self.transport.read_line()? {
            tracing::debug!("Received: {}", line);

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    tracing::debug!("Failed to parse message: {}", e);
                    self.transport
                        .write_response(&JsonRpcResponse::error(None, JsonRpcError::parse_error()))?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request).await {
                self.transport.write_response(&response)?;
            }
        }

        tracing::info!("MCP server stopped");
        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Notifications have no id and expect no response, whatever happens
        let Some(id) = request.id else {
            tracing::debug!("Ignoring notification: {}", request.method);
            return None;
        };

        tracing::debug!(method = %request.method, "handling request");

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            method => JsonRpcResponse::error(Some(id), JsonRpcError::method_not_found(method)),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init) => tracing::info!(
                    "Client: {} v{} (protocol: {})",
                    init.client_info.name,
                    init.client_info.version,
                    init.protocol_version
                ),
                Err(e) => tracing::debug!("Unrecognized initialize params: {}", e),
            }
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: "gitforge-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities {
                tools: ToolsCapability {},
            },
        };

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
    }

    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.registry.list(),
        };
        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(params)) => params,
            Ok(None) | Err(_) => {
                return JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::invalid_params("Invalid tool call params"),
                );
            }
        };

        let arguments = self.resolve_arguments(params.arguments);

        match self.registry.call(&self.client, &params.name, arguments).await {
            Ok(result) => JsonRpcResponse::success(id, serde_json::to_value(result).unwrap()),
            Err(e) => JsonRpcResponse::error(Some(id), JsonRpcError::internal_error(&e.to_string())),
        }
    }

    /// Normalize call arguments and inject the configured defaults.
    ///
    /// Non-object arguments become an empty map rather than failing the
    /// call. Caller-supplied `owner`/`repo` always win over defaults.
    fn resolve_arguments(&self, arguments: Option<Value>) -> Map<String, Value> {
        let mut arguments = match arguments {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        if let Some(owner) = &self.default_owner {
            if !arguments.contains_key("owner") {
                arguments.insert("owner".to_string(), Value::String(owner.clone()));
            }
        }
        if let Some(repo) = &self.default_repo {
            if !arguments.contains_key("repo") {
                arguments.insert("repo".to_string(), Value::String(repo.clone()));
            }
        }

        arguments
    }
}
