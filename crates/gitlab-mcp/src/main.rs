//! GitLab Zero-Leak MCP Server
//!
//! # Usage
//!
//! ```bash
//! GITLAB_PERSONAL_ACCESS_TOKEN=glpat-... gitlab-mcp
//! ```
//!
//! # Environment Variables
//!
//! - `GITLAB_PERSONAL_ACCESS_TOKEN`, `GITLAB_API_URL`, `DISABLED_HANDLERS`,
//!   `ALLOWED_READ_PROJECTS`: see `gitlab-mcp --help`
//! - `RUST_LOG`: diagnostic verbosity (default: `gitlab_mcp=info,gitlab_api=info`).
//!   Audit lines are always written.
//!
//! # Protocol
//!
//! JSON-RPC 2.0 over stdio. Responses go to stdout; logs and audit records
//! go to stderr.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use gitlab_api::GitLabClient;
use gitlab_mcp::{Args, Dispatcher, GitLabMcpServer, ServerConfig, logging};
use gitlab_policy::{AuditLogger, PolicyEngine};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal error in main(): {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> gitlab_mcp::Result<()> {
    let config = ServerConfig::from_args(args)?;
    config.log_summary();

    let client = GitLabClient::new(&config.api_url, config.token.clone())?;
    let policy = PolicyEngine::new(Arc::new(config.policy.clone()));
    let dispatcher = Dispatcher::new(policy, AuditLogger::tracing(), Arc::new(client))?;
    let server = GitLabMcpServer::new(dispatcher);

    tracing::info!("GitLab MCP Server running on stdio");

    tokio::select! {
        result = server.run_stdio() => {
            result?;
            tracing::info!("stdin closed, shutting down");
            Ok(())
        }
        signal = shutdown_signal() => {
            tracing::info!("Server shutting down ({signal})");
            // The blocking stdin reader would otherwise keep the runtime alive.
            std::process::exit(0);
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        },
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable");
            let _ = tokio::signal::ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
