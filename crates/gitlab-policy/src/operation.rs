//! Operation catalogue
//!
//! The fixed set of GitLab operations the server can expose, each tagged with
//! the capability the policy engine keys on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether an operation only reads repository data or mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Read,
    Write,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Read => write!(f, "read"),
            Capability::Write => write!(f, "write"),
        }
    }
}

/// A named GitLab operation exposed as an MCP tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateOrUpdateFile,
    SearchRepositories,
    CreateRepository,
    GetFileContents,
    PushFiles,
    CreateIssue,
    CreateMergeRequest,
    ForkRepository,
    CreateBranch,
}

impl Operation {
    /// Every operation, in the order tools are advertised.
    pub const ALL: [Operation; 9] = [
        Operation::CreateOrUpdateFile,
        Operation::SearchRepositories,
        Operation::CreateRepository,
        Operation::GetFileContents,
        Operation::PushFiles,
        Operation::CreateIssue,
        Operation::CreateMergeRequest,
        Operation::ForkRepository,
        Operation::CreateBranch,
    ];

    /// Wire name of the operation (the MCP tool name).
    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateOrUpdateFile => "create_or_update_file",
            Operation::SearchRepositories => "search_repositories",
            Operation::CreateRepository => "create_repository",
            Operation::GetFileContents => "get_file_contents",
            Operation::PushFiles => "push_files",
            Operation::CreateIssue => "create_issue",
            Operation::CreateMergeRequest => "create_merge_request",
            Operation::ForkRepository => "fork_repository",
            Operation::CreateBranch => "create_branch",
        }
    }

    pub fn capability(self) -> Capability {
        match self {
            Operation::GetFileContents | Operation::SearchRepositories => Capability::Read,
            _ => Capability::Write,
        }
    }

    pub fn is_read(self) -> bool {
        self.capability() == Capability::Read
    }

    /// Whether the operation acts on one existing project named by
    /// `project_id`.
    pub fn is_project_scoped(self) -> bool {
        !matches!(
            self,
            Operation::SearchRepositories | Operation::CreateRepository
        )
    }

    /// Whether the read-project allowlist applies to this operation.
    pub fn uses_read_allowlist(self) -> bool {
        self.is_read() && self.is_project_scoped()
    }

    /// Look up an operation by its wire name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::UnknownOperation {
            name: s.to_string(),
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
