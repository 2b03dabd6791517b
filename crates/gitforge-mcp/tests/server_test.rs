//! End-to-end tests for the MCP request loop against a mock forge
//! backend: lines in, lines out, real HTTP in between.

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use gitforge_api::ApiClient;
use gitforge_core::ForgeApi;
use gitforge_mcp::{McpServer, Transport};
use httpmock::prelude::*;
use serde_json::{json, Value};

struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Feed `input` through a server wired to the given backend and return
/// the parsed output lines.
async fn run_session(
    backend_url: &str,
    default_owner: Option<&str>,
    default_repo: Option<&str>,
    input: &str,
) -> Vec<Value> {
    let client: Arc<dyn ForgeApi> = Arc::new(ApiClient::new(backend_url, "test-token"));
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let transport = Transport::new(
        Box::new(Cursor::new(input.to_string())),
        Box::new(SharedWriter(buffer.clone())),
    );

    let mut server = McpServer::new(
        client,
        default_owner.map(str::to_string),
        default_repo.map(str::to_string),
        transport,
    );
    server.run().await.unwrap();

    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn list_labels_with_injected_defaults() {
    let backend = MockServer::start_async().await;
    let mock = backend
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/repos/acme/widgets/labels")
                .header("Authorization", "token test-token");
            then.status(200)
                .json_body(json!([{"id": 1, "name": "bug", "color": "ee0701"}]));
        })
        .await;

    let input = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"list_labels","arguments":{}}}"#;
    let responses = run_session(&backend.base_url(), Some("acme"), Some("widgets"), input).await;

    mock.assert_async().await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 1);
    assert!(responses[0].get("error").is_none());
    assert!(responses[0]["result"].get("isError").is_none());
    let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("\"bug\""));
}

#[tokio::test]
async fn caller_owner_wins_over_default() {
    let backend = MockServer::start_async().await;
    let mock = backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/repos/other/widgets/labels");
            then.status(200).json_body(json!([]));
        })
        .await;

    let input = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"list_labels","arguments":{"owner":"other"}}}"#;
    let responses = run_session(&backend.base_url(), Some("acme"), Some("widgets"), input).await;

    mock.assert_async().await;
    assert_eq!(responses.len(), 1);
    assert!(responses[0].get("error").is_none());
}

#[tokio::test]
async fn protected_column_delete_is_a_tool_level_failure() {
    let backend = MockServer::start_async().await;
    backend
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/v1/repos/acme/widgets/projects/1/columns/5");
            then.status(403)
                .json_body(json!({"message": "cannot delete the default column"}));
        })
        .await;

    let input = r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"delete_project_column","arguments":{"project_id":1,"column_id":5}}}"#;
    let responses = run_session(&backend.base_url(), Some("acme"), Some("widgets"), input).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 2);
    // RPC-level success framing with a flagged tool failure inside
    assert!(responses[0].get("error").is_none());
    assert_eq!(responses[0]["result"]["isError"], true);
    let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("cannot delete"));
    assert!(text.contains("403"));
}

#[tokio::test]
async fn notifications_are_never_answered() {
    let backend = MockServer::start_async().await;

    // Unknown method, failing tool call, and a plain notification:
    // none carry an id, so none may produce output.
    let input = concat!(
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"no/such/method"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"get_issue","arguments":{}}}"#,
        "\n",
    );
    let responses = run_session(&backend.base_url(), Some("acme"), Some("widgets"), input).await;

    assert!(responses.is_empty());
}

#[tokio::test]
async fn malformed_line_yields_parse_error_without_id() {
    let backend = MockServer::start_async().await;

    let input = concat!(
        "this is not json\n",
        r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#,
        "\n",
    );
    let responses = run_session(&backend.base_url(), None, None, input).await;

    // The broken line is answered anyway: no id could be recovered, so
    // the parse-error response carries none.
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert!(responses[0].get("id").is_none());

    // The loop keeps going afterwards
    assert_eq!(responses[1]["id"], 7);
    assert!(responses[1]["result"]["tools"].is_array());
}

#[tokio::test]
async fn responses_come_back_in_input_order() {
    let backend = MockServer::start_async().await;
    backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/repos/acme/widgets/labels");
            then.status(200).json_body(json!([]));
        })
        .await;

    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"test","version":"0.0.1"}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":"two","method":"tools/list"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"list_labels","arguments":{}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":4,"method":"bogus"}"#,
        "\n",
    );
    let responses = run_session(&backend.base_url(), Some("acme"), Some("widgets"), input).await;

    assert_eq!(responses.len(), 4);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "gitforge-mcp");
    assert_eq!(responses[1]["id"], "two");
    assert_eq!(responses[2]["id"], 3);
    assert_eq!(responses[3]["id"], 4);
    assert_eq!(responses[3]["error"]["code"], -32601);
    assert!(responses[3]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("bogus"));
}

#[tokio::test]
async fn unknown_tool_is_not_a_tool_result() {
    let backend = MockServer::start_async().await;

    let input = r#"{"jsonrpc":"2.0","id":9,"method":"tools/call","params":{"name":"not_a_tool","arguments":{}}}"#;
    let responses = run_session(&backend.base_url(), Some("acme"), Some("widgets"), input).await;

    assert_eq!(responses.len(), 1);
    assert!(responses[0].get("result").is_none());
    assert_eq!(responses[0]["error"]["code"], -32603);
    assert_eq!(responses[0]["error"]["message"], "unknown tool: not_a_tool");
}

#[tokio::test]
async fn missing_required_parameter_names_it() {
    let backend = MockServer::start_async().await;

    let input = r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"create_issue","arguments":{}}}"#;
    let responses = run_session(&backend.base_url(), Some("acme"), Some("widgets"), input).await;

    assert_eq!(responses.len(), 1);
    assert!(responses[0].get("error").is_none());
    assert_eq!(responses[0]["result"]["isError"], true);
    assert_eq!(
        responses[0]["result"]["content"][0]["text"],
        "Error: title is required"
    );
}

#[tokio::test]
async fn backend_failure_text_reaches_the_caller() {
    let backend = MockServer::start_async().await;
    backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/repos/acme/widgets/issues/42");
            then.status(404).body("issue does not exist");
        })
        .await;

    let input = r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"get_issue","arguments":{"index":42}}}"#;
    let responses = run_session(&backend.base_url(), Some("acme"), Some("widgets"), input).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["result"]["isError"], true);
    let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("404"));
    assert!(text.contains("issue does not exist"));
}
