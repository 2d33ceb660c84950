//! Error types for the MCP server

use std::fmt;

use gitlab_policy::PolicyReason;
use thiserror::Error;

use crate::protocol::{INTERNAL_ERROR, INVALID_PARAMS};

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// One failed argument check, reported as `path: message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted path into the arguments object; empty for the root.
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while serving a tool call
#[derive(Debug, Error)]
pub enum Error {
    /// `tools/call` arrived without an `arguments` object
    #[error("Arguments are required")]
    MissingArguments,

    /// Arguments failed the tool's schema
    #[error("Invalid arguments: {}", join_issues(.issues))]
    InvalidArguments { issues: Vec<FieldIssue> },

    /// The policy engine refused the call
    #[error("{message}")]
    PolicyDenied {
        reason: PolicyReason,
        message: String,
    },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// GitLab rejected the request or could not be reached
    #[error(transparent)]
    Api(#[from] gitlab_api::Error),

    /// A tool's input schema did not compile
    #[error("invalid schema for tool {tool}: {message}")]
    Schema { tool: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Denial for `operation` with the message callers see.
    pub fn policy_denied(operation: &str, project_id: Option<&str>, reason: PolicyReason) -> Self {
        let message = match reason {
            PolicyReason::NotInAllowlist => format!(
                "Project \"{}\" is not allowed for read operations.",
                project_id.unwrap_or(gitlab_policy::audit::UNKNOWN_PROJECT)
            ),
            _ => format!("Tool \"{operation}\" is disabled by server policy."),
        };
        Self::PolicyDenied { reason, message }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// JSON-RPC error code for this failure when it ends a `tools/call`.
    pub fn code(&self) -> i32 {
        match self {
            Error::MissingArguments | Error::InvalidArguments { .. } => INVALID_PARAMS,
            _ => INTERNAL_ERROR,
        }
    }
}
