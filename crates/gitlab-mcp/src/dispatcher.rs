//! Tool call dispatch
//!
//! Every `tools/call` passes through [`Dispatcher::dispatch`], which runs the
//! checks in a fixed order:
//!
//! 1. arguments present
//! 2. policy (disabled operations, then the read allowlist)
//! 3. tool known
//! 4. schema validation
//!
//! Each gate writes to the audit log before anything reaches GitLab, and the
//! backend is called at most once per dispatch.

use std::sync::Arc;

use gitlab_api::{CreateBranchOptions, RepositoryService};
use gitlab_policy::{AuditLogger, Operation, PolicyEngine, PolicyReason};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::tools::{ToolDefinition, list_tools};
use crate::validation::{ArgumentValidator, ToolArguments};

const REASON_MISSING_ARGUMENTS: &str = "Missing arguments";
const REASON_UNKNOWN_TOOL: &str = "Unknown tool";

/// Routes validated tool calls to a [`RepositoryService`].
pub struct Dispatcher {
    policy: PolicyEngine,
    audit: AuditLogger,
    validator: ArgumentValidator,
    service: Arc<dyn RepositoryService>,
}

impl Dispatcher {
    pub fn new(
        policy: PolicyEngine,
        audit: AuditLogger,
        service: Arc<dyn RepositoryService>,
    ) -> Result<Self> {
        Ok(Self {
            policy,
            audit,
            validator: ArgumentValidator::new()?,
            service,
        })
    }

    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    /// Tools visible to clients under the current policy.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        list_tools(&self.policy)
    }

    /// Run one tool call and return the backend result as JSON.
    ///
    /// `arguments` is `None` when the client sent no arguments object.
    pub async fn dispatch(&self, tool_name: &str, arguments: Option<Value>) -> Result<Value> {
        let Some(arguments) = arguments else {
            self.audit
                .record(tool_name, None, false, REASON_MISSING_ARGUMENTS);
            return Err(Error::MissingArguments);
        };

        let project_id = peek_project_id(&arguments);
        let project_id = project_id.as_deref();

        let decision = self.policy.decide(tool_name, project_id);
        if !decision.allowed {
            self.audit.record_decision(tool_name, project_id, decision);
            tracing::warn!(tool = tool_name, reason = %decision.reason, "Tool call denied");
            return Err(Error::policy_denied(tool_name, project_id, decision.reason));
        }

        let Some(operation) = Operation::from_name(tool_name) else {
            self.audit
                .record(tool_name, project_id, false, REASON_UNKNOWN_TOOL);
            return Err(Error::UnknownTool(tool_name.to_string()));
        };

        if decision.reason == PolicyReason::InAllowlist {
            self.audit.record_decision(tool_name, project_id, decision);
        }
        self.audit
            .record(tool_name, project_id, true, PolicyReason::Permitted);

        let args = self.validator.validate(operation, &arguments)?;
        tracing::debug!(tool = tool_name, "Calling GitLab");
        self.execute(args).await
    }

    async fn execute(&self, args: ToolArguments) -> Result<Value> {
        let service = self.service.as_ref();
        match args {
            ToolArguments::ForkRepository(args) => to_json(
                service
                    .fork_project(&args.project_id, args.namespace.as_deref())
                    .await?,
            ),
            ToolArguments::CreateBranch(args) => {
                let git_ref = match args.git_ref {
                    Some(git_ref) => git_ref,
                    None => service.default_branch_ref(&args.project_id).await?,
                };
                let options = CreateBranchOptions {
                    name: args.branch,
                    git_ref,
                };
                to_json(service.create_branch(&args.project_id, &options).await?)
            }
            ToolArguments::SearchRepositories(args) => to_json(
                service
                    .search_projects(&args.search, args.page, args.per_page)
                    .await?,
            ),
            ToolArguments::CreateRepository(options) => {
                to_json(service.create_repository(&options).await?)
            }
            ToolArguments::GetFileContents(args) => to_json(
                service
                    .get_file_contents(&args.project_id, &args.file_path, args.git_ref.as_deref())
                    .await?,
            ),
            ToolArguments::CreateOrUpdateFile(args) => to_json(
                service
                    .create_or_update_file(&args.project_id, &args.options)
                    .await?,
            ),
            ToolArguments::PushFiles(args) => to_json(
                service
                    .create_commit(
                        &args.project_id,
                        &args.commit_message,
                        &args.branch,
                        &args.files,
                    )
                    .await?,
            ),
            ToolArguments::CreateIssue(args) => {
                to_json(service.create_issue(&args.project_id, &args.options).await?)
            }
            ToolArguments::CreateMergeRequest(args) => to_json(
                service
                    .create_merge_request(&args.project_id, &args.options)
                    .await?,
            ),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(Error::from)
}

/// Project id as the policy sees it, read before validation.
///
/// Strings are taken as-is; any other JSON value is rendered as its JSON
/// text, so `42` and `"42"` match the same allowlist entry. An empty string
/// counts as no project id.
pub fn peek_project_id(arguments: &Value) -> Option<String> {
    let id = match arguments.as_object()?.get("project_id")? {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    };
    (!id.is_empty()).then_some(id)
}
