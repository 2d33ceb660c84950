//! Static policy configuration
//!
//! Built once at startup from `DISABLED_HANDLERS` and `ALLOWED_READ_PROJECTS`
//! and shared read-only for the lifetime of the process.

use std::collections::BTreeSet;

use crate::Operation;

/// The two policy sets consulted on every tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    disabled_operations: BTreeSet<String>,
    allowed_read_projects: BTreeSet<String>,
}

impl PolicyConfig {
    pub fn new<D, A>(disabled_operations: D, allowed_read_projects: A) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            disabled_operations: disabled_operations.into_iter().map(Into::into).collect(),
            allowed_read_projects: allowed_read_projects.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from the raw comma-separated environment values.
    ///
    /// # Example
    ///
    /// ```
    /// use gitlab_policy::PolicyConfig;
    ///
    /// let config = PolicyConfig::from_lists("create_issue, push_files", "42,");
    /// assert!(config.is_disabled("push_files"));
    /// assert!(config.is_read_allowed("42"));
    /// ```
    pub fn from_lists(disabled_operations: &str, allowed_read_projects: &str) -> Self {
        Self {
            disabled_operations: parse_list(disabled_operations),
            allowed_read_projects: parse_list(allowed_read_projects),
        }
    }

    pub fn is_disabled(&self, operation: &str) -> bool {
        self.disabled_operations.contains(operation)
    }

    /// An empty allowlist permits nothing.
    pub fn is_read_allowed(&self, project_id: &str) -> bool {
        self.allowed_read_projects.contains(project_id)
    }

    pub fn disabled_operations(&self) -> impl Iterator<Item = &str> {
        self.disabled_operations.iter().map(String::as_str)
    }

    pub fn allowed_read_projects(&self) -> impl Iterator<Item = &str> {
        self.allowed_read_projects.iter().map(String::as_str)
    }

    /// Disabled names that match no known operation (likely typos).
    pub fn unknown_disabled_names(&self) -> Vec<&str> {
        self.disabled_operations()
            .filter(|name| Operation::from_name(name).is_none())
            .collect()
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
