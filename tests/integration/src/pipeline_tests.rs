//! Full pipeline tests: JSON-RPC lines in, a mock GitLab behind the real
//! HTTP client, audit records captured in memory.

use std::sync::Arc;

use gitlab_api::GitLabClient;
use gitlab_mcp::{Dispatcher, GitLabMcpServer};
use gitlab_policy::{PolicyConfig, PolicyEngine};
use gitlab_test_utils::RecordingAuditSink;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "glpat-integration";

struct Pipeline {
    gitlab: MockServer,
    server: GitLabMcpServer,
    audit: Arc<RecordingAuditSink>,
}

async fn pipeline(disabled: &str, allowed: &str) -> Pipeline {
    let gitlab = MockServer::start().await;
    let client = GitLabClient::new(&format!("{}/api/v4", gitlab.uri()), TOKEN).unwrap();
    let audit = RecordingAuditSink::new();
    let policy = PolicyEngine::new(Arc::new(PolicyConfig::from_lists(disabled, allowed)));
    let dispatcher = Dispatcher::new(policy, audit.logger(), Arc::new(client)).unwrap();
    Pipeline {
        gitlab,
        server: GitLabMcpServer::new(dispatcher),
        audit,
    }
}

/// Feed `requests` as stdio lines and collect the responses keyed by id order.
async fn exchange(server: &GitLabMcpServer, requests: &[Value]) -> Vec<Value> {
    let input: String = requests.iter().map(|r| format!("{r}\n")).collect();
    let (writer, mut output) = tokio::io::duplex(1024 * 1024);
    server.run(input.as_bytes(), writer).await.unwrap();

    let mut text = String::new();
    output.read_to_string(&mut text).await.unwrap();
    let mut responses: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    responses.sort_by_key(|r| r["id"].as_i64());
    responses
}

fn call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

fn commit_json(title: &str) -> Value {
    json!({"id": "abc123def", "short_id": "abc123d", "title": title, "parent_ids": []})
}

#[tokio::test]
async fn test_allowlisted_read_decodes_file_from_gitlab() {
    let p = pipeline("", "group/demo").await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fdemo/repository/files/README.md"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file_name": "README.md",
            "file_path": "README.md",
            "size": 5,
            "encoding": "base64",
            "content": "aGVsbG8=",
            "ref": "main",
            "blob_id": "blob",
            "commit_id": "commit",
            "last_commit_id": "commit"
        })))
        .expect(1)
        .mount(&p.gitlab)
        .await;

    let responses = exchange(
        &p.server,
        &[call(
            1,
            "get_file_contents",
            json!({"project_id": "group/demo", "file_path": "README.md"}),
        )],
    )
    .await;

    let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
    let file: Value = serde_json::from_str(text).unwrap();
    assert_eq!(file["content"], "hello");
    assert_eq!(
        p.audit.reasons(),
        vec!["Project in allowlist", "Operation permitted"]
    );
}

#[tokio::test]
async fn test_denied_calls_never_reach_gitlab() {
    let p = pipeline("fork_repository", "").await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&p.gitlab)
        .await;

    let responses = exchange(
        &p.server,
        &[
            call(1, "fork_repository", json!({"project_id": "42"})),
            call(2, "get_file_contents", json!({"project_id": "42", "file_path": "a"})),
            call(3, "push_files", json!({"project_id": "42"})),
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"name": "create_issue"}}),
            call(5, "drop_database", json!({})),
        ],
    )
    .await;

    let codes: Vec<i64> = responses
        .iter()
        .map(|r| r["error"]["code"].as_i64().unwrap())
        .collect();
    assert_eq!(codes, vec![-32603, -32603, -32602, -32602, -32603]);

    let mut reasons = p.audit.reasons();
    reasons.sort();
    assert_eq!(
        reasons,
        vec![
            "Missing arguments",
            "Operation disabled by policy",
            "Operation permitted",
            "Project not in allowlist",
            "Unknown tool",
        ]
    );
}

#[tokio::test]
async fn test_create_branch_uses_project_default_branch() {
    let p = pipeline("", "").await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "name": "demo",
            "path_with_namespace": "group/demo",
            "web_url": "https://gitlab.example/group/demo",
            "default_branch": "develop"
        })))
        .expect(1)
        .mount(&p.gitlab)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v4/projects/42/repository/branches"))
        .and(body_json(json!({"branch": "feature", "ref": "develop"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "feature",
            "commit": commit_json("Initial commit")
        })))
        .expect(1)
        .mount(&p.gitlab)
        .await;

    let responses = exchange(
        &p.server,
        &[call(1, "create_branch", json!({"project_id": "42", "branch": "feature"}))],
    )
    .await;

    assert!(responses[0].get("error").is_none(), "{}", responses[0]);
}

#[tokio::test]
async fn test_gitlab_rejection_is_reported_verbatim() {
    let p = pipeline("", "").await;

    Mock::given(method("POST"))
        .and(path("/api/v4/projects"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": {"name": ["has already been taken"]}})),
        )
        .expect(1)
        .mount(&p.gitlab)
        .await;

    let responses = exchange(
        &p.server,
        &[call(1, "create_repository", json!({"name": "demo"}))],
    )
    .await;

    assert_eq!(responses[0]["error"]["code"], -32603);
    assert_eq!(
        responses[0]["error"]["message"],
        r#"GitLab API error: Bad Request (400) - {"message":{"name":["has already been taken"]}}"#
    );
}

#[tokio::test]
async fn test_search_passes_pagination() {
    let p = pipeline("", "").await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .and(query_param("search", "demo"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "5"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Total", "6")
                .set_body_json(json!([])),
        )
        .expect(1)
        .mount(&p.gitlab)
        .await;

    let responses = exchange(
        &p.server,
        &[call(
            1,
            "search_repositories",
            json!({"search": "demo", "page": 2, "per_page": 5}),
        )],
    )
    .await;

    let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
    let result: Value = serde_json::from_str(text).unwrap();
    assert_eq!(result, json!({"count": 6, "items": []}));
}
