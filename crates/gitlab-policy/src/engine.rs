//! Policy decisions
//!
//! [`PolicyEngine::decide`] is a pure function of the static configuration and
//! the call's operation name and project id. It never touches the audit
//! stream; the dispatcher records decisions through
//! [`AuditLogger`](crate::AuditLogger).

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::{Operation, PolicyConfig};

/// Why a call was allowed or denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyReason {
    Disabled,
    NotInAllowlist,
    InAllowlist,
    Permitted,
}

impl PolicyReason {
    /// Reason text written to the audit stream.
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyReason::Disabled => "Operation disabled by policy",
            PolicyReason::NotInAllowlist => "Project not in allowlist",
            PolicyReason::InAllowlist => "Project in allowlist",
            PolicyReason::Permitted => "Operation permitted",
        }
    }
}

impl fmt::Display for PolicyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: PolicyReason,
}

impl PolicyDecision {
    pub fn allow(reason: PolicyReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    pub fn deny(reason: PolicyReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// Evaluates tool calls against a [`PolicyConfig`].
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: Arc<PolicyConfig>,
}

impl PolicyEngine {
    pub fn new(config: Arc<PolicyConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Decide whether `operation` may run against `project_id`.
    ///
    /// The allowlist only applies to project-scoped reads, and only when a
    /// non-empty project id was extracted from the arguments. A read call
    /// without one is permitted.
    pub fn decide(&self, operation: &str, project_id: Option<&str>) -> PolicyDecision {
        if self.config.is_disabled(operation) {
            return PolicyDecision::deny(PolicyReason::Disabled);
        }

        let gated = Operation::from_name(operation).is_some_and(Operation::uses_read_allowlist);
        match project_id.filter(|id| !id.is_empty()) {
            Some(id) if gated && self.config.is_read_allowed(id) => {
                PolicyDecision::allow(PolicyReason::InAllowlist)
            }
            Some(_) if gated => PolicyDecision::deny(PolicyReason::NotInAllowlist),
            _ => PolicyDecision::allow(PolicyReason::Permitted),
        }
    }

    /// Whether a tool should be advertised in `tools/list`.
    pub fn is_listed(&self, operation: Operation) -> bool {
        !self.config.is_disabled(operation.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn engine(disabled: &str, allowed: &str) -> PolicyEngine {
        PolicyEngine::new(Arc::new(PolicyConfig::from_lists(disabled, allowed)))
    }

    #[test]
    fn test_disabled_operation_is_denied() {
        let engine = engine("create_issue", "");
        assert_eq!(
            engine.decide("create_issue", Some("42")),
            PolicyDecision::deny(PolicyReason::Disabled)
        );
    }

    #[test]
    fn test_disabled_takes_precedence_over_allowlist() {
        let engine = engine("get_file_contents", "42");
        assert_eq!(
            engine.decide("get_file_contents", Some("42")),
            PolicyDecision::deny(PolicyReason::Disabled)
        );
    }

    #[rstest]
    #[case("", "42")]
    #[case("7", "42")]
    #[case("42", "420")]
    fn test_read_denied_when_not_allowlisted(#[case] allowed: &str, #[case] project: &str) {
        let engine = engine("", allowed);
        assert_eq!(
            engine.decide("get_file_contents", Some(project)),
            PolicyDecision::deny(PolicyReason::NotInAllowlist)
        );
    }

    #[test]
    fn test_read_allowed_when_allowlisted() {
        let engine = engine("", "7,42");
        assert_eq!(
            engine.decide("get_file_contents", Some("42")),
            PolicyDecision::allow(PolicyReason::InAllowlist)
        );
    }

    #[test]
    fn test_read_without_project_id_is_permitted_known_fail_open_gap() {
        let engine = engine("", "");
        assert_eq!(
            engine.decide("get_file_contents", None),
            PolicyDecision::allow(PolicyReason::Permitted)
        );
    }

    #[test]
    fn test_read_with_empty_project_id_is_permitted_known_fail_open_gap() {
        let engine = engine("", "");
        assert_eq!(
            engine.decide("get_file_contents", Some("")),
            PolicyDecision::allow(PolicyReason::Permitted)
        );
    }

    #[test]
    fn test_search_ignores_allowlist_even_with_project_id() {
        let engine = engine("", "");
        assert_eq!(
            engine.decide("search_repositories", Some("42")),
            PolicyDecision::allow(PolicyReason::Permitted)
        );
    }

    #[test]
    fn test_write_ignores_allowlist() {
        let engine = engine("", "");
        assert_eq!(
            engine.decide("create_branch", Some("42")),
            PolicyDecision::allow(PolicyReason::Permitted)
        );
    }

    #[test]
    fn test_unknown_operation_is_permitted_by_policy() {
        let engine = engine("", "");
        assert!(engine.decide("nonexistent_tool", Some("42")).allowed);
    }

    #[test]
    fn test_unknown_operation_can_still_be_disabled() {
        let engine = engine("nonexistent_tool", "");
        assert!(!engine.decide("nonexistent_tool", None).allowed);
    }

    #[test]
    fn test_is_listed() {
        let engine = engine("create_issue", "");
        assert!(!engine.is_listed(Operation::CreateIssue));
        assert!(engine.is_listed(Operation::CreateBranch));
    }

    #[test]
    fn test_reason_text() {
        assert_eq!(PolicyReason::Disabled.to_string(), "Operation disabled by policy");
        assert_eq!(PolicyReason::NotInAllowlist.to_string(), "Project not in allowlist");
        assert_eq!(PolicyReason::InAllowlist.to_string(), "Project in allowlist");
        assert_eq!(PolicyReason::Permitted.to_string(), "Operation permitted");
    }
}
