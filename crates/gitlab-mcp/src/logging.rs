//! Tracing setup for the server binary
//!
//! stdout carries the protocol, so every log line goes to stderr. Audit
//! records have their own layer: `RUST_LOG` tunes diagnostics but cannot
//! silence the audit trail.

use gitlab_policy::AUDIT_TARGET;
use tracing::Level;
use tracing_subscriber::filter::{Targets, filter_fn};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Directives used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "gitlab_mcp=info,gitlab_api=info";

pub fn filter_from_env() -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
}

/// Audit events at info and above, whatever `RUST_LOG` says.
pub fn audit_filter() -> Targets {
    Targets::new().with_target(AUDIT_TARGET, Level::INFO)
}

/// Install the global subscriber.
///
/// Diagnostics use compact lines filtered by `RUST_LOG`. Audit records are
/// printed bare, one `[AUDIT] {json}` line each.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let diagnostics = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_filter(filter_from_env()?)
        .with_filter(filter_fn(|meta| meta.target() != AUDIT_TARGET));

    let audit = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(audit_filter());

    tracing_subscriber::registry()
        .with(diagnostics)
        .with(audit)
        .try_init()?;

    Ok(())
}
