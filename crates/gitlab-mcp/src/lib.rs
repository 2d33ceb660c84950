//! MCP server for GitLab with zero-leak access control
//!
//! Exposes a fixed set of GitLab operations as MCP tools. Every call is
//! checked against the operator's policy and written to an audit trail
//! before anything is sent to GitLab.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ server ] --> [ dispatcher ] --> [ policy + audit (gitlab-policy) ]
//!                      |
//!                      +--> [ validation (JSON Schema) ]
//!                      v
//!              [ RepositoryService (gitlab-api) ] --> GitLab REST API
//! ```
//!
//! # Configuration
//!
//! - `GITLAB_PERSONAL_ACCESS_TOKEN`: required
//! - `GITLAB_API_URL`: defaults to `https://gitlab.com/api/v4`
//! - `DISABLED_HANDLERS`: comma-separated tool names hidden and refused
//! - `ALLOWED_READ_PROJECTS`: comma-separated project ids read tools may use

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod validation;

pub use config::{Args, ServerConfig};
pub use dispatcher::{Dispatcher, peek_project_id};
pub use error::{Error, FieldIssue, Result};
pub use server::{GitLabMcpServer, SERVER_NAME};
pub use tools::{ToolContent, ToolDefinition, ToolResult, get_tool_definitions, list_tools};
pub use validation::{ArgumentValidator, ToolArguments};
