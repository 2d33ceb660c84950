//! Server configuration from the command line and environment
//!
//! Every setting can come from a flag or its environment variable; the
//! environment names match what MCP client configs already set.

use std::fmt;

use clap::Parser;
use gitlab_api::DEFAULT_API_URL;
use gitlab_policy::PolicyConfig;

use crate::error::{Error, Result};

/// MCP server for GitLab with operation and project gating
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "gitlab-mcp")]
#[command(about = "MCP server for GitLab with zero-leak access control")]
#[command(version)]
pub struct Args {
    /// GitLab personal access token
    #[arg(long, env = "GITLAB_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitLab REST API base URL
    #[arg(long, env = "GITLAB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Comma-separated tool names to disable
    #[arg(long, env = "DISABLED_HANDLERS", default_value = "")]
    pub disabled_handlers: String,

    /// Comma-separated project ids that read tools may access
    #[arg(long, env = "ALLOWED_READ_PROJECTS", default_value = "")]
    pub allowed_read_projects: String,
}

/// Resolved settings for one server process.
#[derive(Clone)]
pub struct ServerConfig {
    pub token: String,
    pub api_url: String,
    pub policy: PolicyConfig,
}

impl ServerConfig {
    /// Fails when the token is missing or blank.
    pub fn from_args(args: Args) -> Result<Self> {
        let token = args
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::config("GITLAB_PERSONAL_ACCESS_TOKEN environment variable is not set")
            })?;

        let api_url = match args.api_url.trim() {
            "" => DEFAULT_API_URL.to_string(),
            url => url.to_string(),
        };

        Ok(Self {
            token,
            api_url,
            policy: PolicyConfig::from_lists(&args.disabled_handlers, &args.allowed_read_projects),
        })
    }

    /// Log the effective policy, then warn about disabled names that match no
    /// tool.
    pub fn log_summary(&self) {
        let disabled: Vec<&str> = self.policy.disabled_operations().collect();
        let allowed: Vec<&str> = self.policy.allowed_read_projects().collect();
        tracing::info!(
            api_url = %self.api_url,
            "[CONFIG] Disabled handlers: {}",
            join_or_none(&disabled)
        );
        tracing::info!("[CONFIG] Allowed read projects: {}", join_or_none(&allowed));

        for name in self.policy.unknown_disabled_names() {
            tracing::warn!(name, "[CONFIG] Disabled handler does not match any tool");
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("policy", &self.policy)
            .finish()
    }
}

fn join_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
