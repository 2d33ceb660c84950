//! Shared test utilities for the gitlab-zero-leak workspace.
//!
//! It is a dev-dependency only: never published.
//!
//! # Modules
//!
//! - [`fixtures`]: canned GitLab response values
//! - [`service`]: [`StubService`], a `RepositoryService` that records calls
//! - [`audit`]: [`RecordingAuditSink`] for asserting on the audit trail

pub mod audit;
pub mod fixtures;
pub mod service;

pub use audit::RecordingAuditSink;
pub use service::{RecordedCall, StubService};
