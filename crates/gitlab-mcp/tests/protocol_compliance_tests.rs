//! MCP Protocol Compliance Integration Tests
//!
//! Tests that the server correctly implements JSON-RPC 2.0 and MCP protocol
//! requirements: ID preservation, error codes and response shape.

use std::sync::Arc;

use gitlab_mcp::{Dispatcher, GitLabMcpServer, SERVER_NAME};
use gitlab_policy::{AuditLogger, PolicyConfig, PolicyEngine};
use gitlab_test_utils::{RecordingAuditSink, StubService};
use serde_json::Value;

fn setup_server() -> GitLabMcpServer {
    let policy = PolicyEngine::new(Arc::new(PolicyConfig::default()));
    let audit: AuditLogger = RecordingAuditSink::new().logger();
    let dispatcher = Dispatcher::new(policy, audit, Arc::new(StubService::new())).unwrap();
    GitLabMcpServer::new(dispatcher)
}

async fn respond(server: &GitLabMcpServer, request: &str) -> Value {
    serde_json::from_str(&server.handle_message(request).await.unwrap()).unwrap()
}

// ==========================================================================
// JSON-RPC 2.0 ID Preservation
// ==========================================================================

#[tokio::test]
async fn test_numeric_id_preserved_in_response() {
    let server = setup_server();
    let response = respond(
        &server,
        r#"{"jsonrpc":"2.0","id":42,"method":"initialize","params":{}}"#,
    )
    .await;

    assert_eq!(response["id"], 42, "Numeric ID must be echoed back exactly");
    assert_eq!(response["jsonrpc"], "2.0");
}

#[tokio::test]
async fn test_string_id_preserved_in_response() {
    let server = setup_server();
    let response = respond(
        &server,
        r#"{"jsonrpc":"2.0","id":"req-abc-123","method":"tools/list"}"#,
    )
    .await;

    assert_eq!(response["id"], "req-abc-123");
}

#[tokio::test]
async fn test_id_preserved_in_tool_error_response() {
    let server = setup_server();
    let response = respond(
        &server,
        r#"{"jsonrpc":"2.0","id":"err-test","method":"tools/call","params":{"name":"nope","arguments":{}}}"#,
    )
    .await;

    assert_eq!(response["id"], "err-test");
    assert!(response.get("error").is_some());
}

#[tokio::test]
async fn test_large_numeric_id_preserved() {
    let server = setup_server();
    let response = respond(
        &server,
        r#"{"jsonrpc":"2.0","id":999999999,"method":"tools/list","params":{}}"#,
    )
    .await;

    assert_eq!(response["id"], 999999999);
}

// ==========================================================================
// Error Code Correctness
// ==========================================================================

#[tokio::test]
async fn test_method_not_found_returns_32601() {
    let server = setup_server();
    let response = respond(
        &server,
        r#"{"jsonrpc":"2.0","id":1,"method":"resources/list","params":{}}"#,
    )
    .await;

    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(
        response["error"]["message"],
        "Method not found: resources/list"
    );
}

#[tokio::test]
async fn test_invalid_json_returns_err() {
    let server = setup_server();
    let result = server.handle_message(r#"{"not valid json"#).await;
    assert!(result.is_err(), "Malformed JSON should fail to parse");
}

#[tokio::test]
async fn test_missing_method_field_returns_err() {
    let server = setup_server();
    let result = server
        .handle_message(r#"{"jsonrpc":"2.0","id":1,"params":{}}"#)
        .await;
    assert!(result.is_err(), "Missing 'method' field should fail");
}

#[tokio::test]
async fn test_non_object_tools_call_params_returns_32602() {
    let server = setup_server();
    let response = respond(
        &server,
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":"not-an-object"}"#,
    )
    .await;

    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_validation_error_returns_32602() {
    let server = setup_server();
    let response = respond(
        &server,
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"search_repositories","arguments":{}}}"#,
    )
    .await;

    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(
        response["error"]["message"],
        "Invalid arguments: search: Required"
    );
}

// ==========================================================================
// Initialize
// ==========================================================================

#[tokio::test]
async fn test_initialize_returns_protocol_version_and_server_info() {
    let server = setup_server();
    let response = respond(
        &server,
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#,
    )
    .await;

    let result = &response["result"];
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
    assert_eq!(result["serverInfo"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(result["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_initialized_notifications_return_empty() {
    let server = setup_server();
    for request in [
        r#"{"jsonrpc":"2.0","method":"initialized"}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
    ] {
        assert_eq!(server.handle_message(request).await.unwrap(), "");
    }
}

// ==========================================================================
// Response shape
// ==========================================================================

#[tokio::test]
async fn test_success_response_has_result_not_error() {
    let server = setup_server();
    let response = respond(&server, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;

    assert!(response.get("result").is_some());
    assert!(response.get("error").is_none());
}

#[tokio::test]
async fn test_error_response_has_error_not_result() {
    let server = setup_server();
    let response = respond(
        &server,
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"create_issue"}}"#,
    )
    .await;

    assert!(response.get("error").is_some());
    assert!(response.get("result").is_none());
}

#[tokio::test]
async fn test_tools_list_returns_all_defined_tools() {
    let server = setup_server();
    let response = respond(&server, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;

    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), gitlab_mcp::get_tool_definitions().len());
    for tool in tools {
        assert!(tool["name"].is_string());
        assert!(tool["description"].is_string());
        assert_eq!(tool["inputSchema"]["type"], "object");
    }
}

#[tokio::test]
async fn test_successful_tool_call_wraps_text_content() {
    let server = setup_server();
    let response = respond(
        &server,
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"search_repositories","arguments":{"search":"demo"}}}"#,
    )
    .await;

    let content = &response["result"]["content"][0];
    assert_eq!(content["type"], "text");
    let payload: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(payload["count"], 1);
    assert!(response["result"].get("isError").is_none());
}
