//! Audit trail
//!
//! Every policy decision and every dispatch-level failure produces one
//! [`AuditRecord`]. Records are written once to a sink and not retained.
//! The production sink emits a single line on the `audit` tracing target,
//! which the binary routes to stderr.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::PolicyDecision;

/// Placeholder written when no project id could be extracted.
pub const UNKNOWN_PROJECT: &str = "unknown";

/// One immutable audit entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub project_id: String,
    pub allowed: bool,
    pub reason: String,
}

impl AuditRecord {
    pub fn new(
        operation: impl Into<String>,
        project_id: Option<&str>,
        allowed: bool,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now().trunc_subsecs(3),
            operation: operation.into(),
            project_id: project_id
                .filter(|id| !id.is_empty())
                .unwrap_or(UNKNOWN_PROJECT)
                .to_string(),
            allowed,
            reason: reason.into(),
        }
    }

    /// Render as a single-line JSON object.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"operation\":{:?},\"allowed\":{},\"reason\":{:?}}}",
                self.operation, self.allowed, self.reason
            )
        })
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[AUDIT] {}", self.to_json_line())
    }
}

/// Destination for audit records.
///
/// Implementations must not fail or block the caller.
pub trait AuditSink: Send + Sync {
    fn write(&self, record: &AuditRecord);
}

/// Tracing target audit records are emitted under.
pub const AUDIT_TARGET: &str = "audit";

/// Writes each record as its `[AUDIT] {json}` line through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn write(&self, record: &AuditRecord) {
        tracing::info!(target: AUDIT_TARGET, "{}", record);
    }
}

/// Builds timestamped records and hands them to a sink.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Logger backed by [`TracingAuditSink`].
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingAuditSink))
    }

    pub fn record(
        &self,
        operation: &str,
        project_id: Option<&str>,
        allowed: bool,
        reason: impl fmt::Display,
    ) {
        let record = AuditRecord::new(operation, project_id, allowed, reason.to_string());
        self.sink.write(&record);
    }

    pub fn record_decision(
        &self,
        operation: &str,
        project_id: Option<&str>,
        decision: PolicyDecision,
    ) {
        self.record(operation, project_id, decision.allowed, decision.reason);
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}
