//! Tool registry
//!
//! Every GitLab operation the server can run is advertised here with its
//! description and JSON Schema. The same schemas drive argument validation in
//! [`crate::validation`], so what `tools/list` shows is what `tools/call`
//! enforces.
//!
//! ## Write operations
//! - `create_or_update_file`, `push_files`
//! - `create_repository`, `fork_repository`, `create_branch`
//! - `create_issue`, `create_merge_request`
//!
//! ## Read operations
//! - `get_file_contents` (subject to the project allowlist)
//! - `search_repositories` (not project-scoped)

use gitlab_policy::{Operation, PolicyEngine};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Tool definition for MCP protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }
}

pub fn description(operation: Operation) -> &'static str {
    match operation {
        Operation::CreateOrUpdateFile => "Create or update a single file in a GitLab project",
        Operation::SearchRepositories => "Search for GitLab projects",
        Operation::CreateRepository => "Create a new GitLab project",
        Operation::GetFileContents => {
            "Get the contents of a file or directory from a GitLab project"
        }
        Operation::PushFiles => "Push multiple files to a GitLab project in a single commit",
        Operation::CreateIssue => "Create a new issue in a GitLab project",
        Operation::CreateMergeRequest => "Create a new merge request in a GitLab project",
        Operation::ForkRepository => {
            "Fork a GitLab project to your account or specified namespace"
        }
        Operation::CreateBranch => "Create a new branch in a GitLab project",
    }
}

fn project_id_property() -> Value {
    json!({
        "type": "string",
        "description": "Project ID or URL-encoded path"
    })
}

/// JSON Schema for the arguments of `operation`.
pub fn input_schema(operation: Operation) -> Value {
    match operation {
        Operation::CreateOrUpdateFile => json!({
            "type": "object",
            "properties": {
                "project_id": project_id_property(),
                "file_path": {"type": "string", "description": "Path where to create/update the file"},
                "content": {"type": "string", "description": "Content of the file"},
                "commit_message": {"type": "string", "description": "Commit message"},
                "branch": {"type": "string", "description": "Branch to create/update the file in"},
                "previous_path": {"type": "string", "description": "Path of the file to move/rename"}
            },
            "required": ["project_id", "file_path", "content", "commit_message", "branch"]
        }),
        Operation::SearchRepositories => json!({
            "type": "object",
            "properties": {
                "search": {"type": "string", "description": "Search query"},
                "page": {"type": "integer", "minimum": 1, "description": "Page number for pagination (default: 1)"},
                "per_page": {"type": "integer", "minimum": 1, "maximum": 100, "description": "Number of results per page (default: 20)"}
            },
            "required": ["search"]
        }),
        Operation::CreateRepository => json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Repository name"},
                "description": {"type": "string", "description": "Repository description"},
                "visibility": {"type": "string", "enum": ["private", "internal", "public"], "description": "Repository visibility level"},
                "initialize_with_readme": {"type": "boolean", "description": "Initialize with README.md"}
            },
            "required": ["name"]
        }),
        Operation::GetFileContents => json!({
            "type": "object",
            "properties": {
                "project_id": project_id_property(),
                "file_path": {"type": "string", "description": "Path to the file or directory"},
                "ref": {"type": "string", "description": "Branch/tag/commit to get contents from"}
            },
            "required": ["project_id", "file_path"]
        }),
        Operation::PushFiles => json!({
            "type": "object",
            "properties": {
                "project_id": project_id_property(),
                "branch": {"type": "string", "description": "Branch to push to"},
                "commit_message": {"type": "string", "description": "Commit message"},
                "files": {
                    "type": "array",
                    "minItems": 1,
                    "description": "Array of files to push",
                    "items": {
                        "type": "object",
                        "properties": {
                            "file_path": {"type": "string", "description": "Path where to create the file"},
                            "content": {"type": "string", "description": "Content of the file"}
                        },
                        "required": ["file_path", "content"]
                    }
                }
            },
            "required": ["project_id", "branch", "commit_message", "files"]
        }),
        Operation::CreateIssue => json!({
            "type": "object",
            "properties": {
                "project_id": project_id_property(),
                "title": {"type": "string", "description": "Issue title"},
                "description": {"type": "string", "description": "Issue description"},
                "assignee_ids": {"type": "array", "items": {"type": "integer", "minimum": 0}, "description": "Array of user IDs to assign"},
                "labels": {"type": "array", "items": {"type": "string"}, "description": "Array of label names"},
                "milestone_id": {"type": "integer", "minimum": 0, "description": "Milestone ID to assign"}
            },
            "required": ["project_id", "title"]
        }),
        Operation::CreateMergeRequest => json!({
            "type": "object",
            "properties": {
                "project_id": project_id_property(),
                "title": {"type": "string", "description": "Merge request title"},
                "description": {"type": "string", "description": "Merge request description"},
                "source_branch": {"type": "string", "description": "Branch containing changes"},
                "target_branch": {"type": "string", "description": "Branch to merge into"},
                "draft": {"type": "boolean", "description": "Create as draft merge request"},
                "allow_collaboration": {"type": "boolean", "description": "Allow commits from upstream members"}
            },
            "required": ["project_id", "title", "source_branch", "target_branch"]
        }),
        Operation::ForkRepository => json!({
            "type": "object",
            "properties": {
                "project_id": project_id_property(),
                "namespace": {"type": "string", "description": "Namespace to fork to (full path)"}
            },
            "required": ["project_id"]
        }),
        Operation::CreateBranch => json!({
            "type": "object",
            "properties": {
                "project_id": project_id_property(),
                "branch": {"type": "string", "description": "Name for the new branch"},
                "ref": {"type": "string", "description": "Source branch/commit for new branch"}
            },
            "required": ["project_id", "branch"]
        }),
    }
}

pub fn tool_definition(operation: Operation) -> ToolDefinition {
    ToolDefinition {
        name: operation.name().to_string(),
        description: description(operation).to_string(),
        input_schema: input_schema(operation),
    }
}

/// Get all tool definitions in declaration order
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    Operation::ALL.into_iter().map(tool_definition).collect()
}

/// Tools advertised under `policy`: everything not disabled, in declaration
/// order.
pub fn list_tools(policy: &PolicyEngine) -> Vec<ToolDefinition> {
    Operation::ALL
        .into_iter()
        .filter(|op| policy.is_listed(*op))
        .map(tool_definition)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitlab_policy::PolicyConfig;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn engine(disabled: &str) -> PolicyEngine {
        PolicyEngine::new(Arc::new(PolicyConfig::from_lists(disabled, "")))
    }

    fn names(tools: &[ToolDefinition]) -> Vec<&str> {
        tools.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_all_tools_in_declaration_order() {
        let tools = get_tool_definitions();
        assert_eq!(
            names(&tools),
            vec![
                "create_or_update_file",
                "search_repositories",
                "create_repository",
                "get_file_contents",
                "push_files",
                "create_issue",
                "create_merge_request",
                "fork_repository",
                "create_branch",
            ]
        );
    }

    #[test]
    fn test_list_tools_omits_disabled() {
        let tools = list_tools(&engine("create_issue,fork_repository"));
        assert_eq!(tools.len(), 7);
        assert!(!names(&tools).contains(&"create_issue"));
        assert!(!names(&tools).contains(&"fork_repository"));
        assert_eq!(tools[0].name, "create_or_update_file");
    }

    #[test]
    fn test_list_tools_ignores_unknown_disabled_names() {
        assert_eq!(list_tools(&engine("no_such_tool")).len(), 9);
    }

    #[test]
    fn test_list_tools_is_stable_across_calls() {
        let policy = engine("push_files");
        assert_eq!(list_tools(&policy), list_tools(&policy));
    }

    #[test]
    fn test_every_schema_is_an_object_schema_with_required_fields() {
        for tool in get_tool_definitions() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            let required = tool.input_schema["required"].as_array().unwrap();
            assert!(!required.is_empty(), "{} has no required fields", tool.name);
            for field in required {
                let field = field.as_str().unwrap();
                assert!(
                    tool.input_schema["properties"].get(field).is_some(),
                    "{}: required field {} is not a property",
                    tool.name,
                    field
                );
            }
        }
    }

    #[test]
    fn test_project_scoped_tools_require_project_id() {
        for op in Operation::ALL {
            let schema = input_schema(op);
            let requires = schema["required"]
                .as_array()
                .unwrap()
                .contains(&json!("project_id"));
            let scoped = !matches!(
                op,
                Operation::SearchRepositories | Operation::CreateRepository
            );
            assert_eq!(requires, scoped, "{}", op);
        }
    }

    #[test]
    fn test_definition_serializes_input_schema_in_camel_case() {
        let value = serde_json::to_value(tool_definition(Operation::ForkRepository)).unwrap();
        assert_eq!(value["name"], "fork_repository");
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
    }

    #[test]
    fn test_tool_result_text() {
        let value = serde_json::to_value(ToolResult::text("{}")).unwrap();
        assert_eq!(value, json!({"content": [{"type": "text", "text": "{}"}]}));
    }
}
