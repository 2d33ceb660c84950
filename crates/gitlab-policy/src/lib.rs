//! Access-control policy for the GitLab MCP server.
//!
//! This crate decides whether a tool call may reach GitLab and records every
//! decision to the audit stream. It knows nothing about the transport or the
//! HTTP API: everything here is a pure function of the static
//! [`PolicyConfig`] built once at startup.
//!
//! # Decision order
//!
//! 1. Operations listed in `DISABLED_HANDLERS` are always denied.
//! 2. Read operations carrying a `project_id` must name an allowlisted project.
//!    An empty allowlist denies every project.
//! 3. Everything else is permitted.

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod operation;

pub use audit::{AUDIT_TARGET, AuditLogger, AuditRecord, AuditSink, TracingAuditSink};
pub use config::PolicyConfig;
pub use engine::{PolicyDecision, PolicyEngine, PolicyReason};
pub use error::{Error, Result};
pub use operation::{Capability, Operation};
