//! [`StubService`]: a `RepositoryService` that records calls instead of
//! talking to GitLab.

use std::sync::Mutex;

use async_trait::async_trait;
use gitlab_api::{
    CreateBranchOptions, CreateIssueOptions, CreateMergeRequestOptions, CreateOrUpdateFileOptions,
    CreateRepositoryOptions, Error, FileOperation, GitLabBranch, GitLabCommit, GitLabContent,
    GitLabCreateUpdateFileResponse, GitLabIssue, GitLabMergeRequest, GitLabRepository,
    GitLabSearchResponse, RepositoryService, Result, StatusCode,
};
use serde_json::{Value, json};

use crate::fixtures;

/// One backend invocation, with its arguments as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub args: Value,
}

/// Records every call and answers with fixtures, or fails every call with a
/// fixed GitLab error when built with [`StubService::failing`].
#[derive(Debug, Default)]
pub struct StubService {
    calls: Mutex<Vec<RecordedCall>>,
    failure: Option<(u16, String)>,
    default_branch: Option<String>,
}

impl StubService {
    pub fn new() -> Self {
        Self {
            default_branch: Some("main".to_string()),
            ..Self::default()
        }
    }

    /// Every call returns `GitLab API error` with `status` and `body`.
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self {
            failure: Some((status, body.into())),
            ..Self::new()
        }
    }

    pub fn with_default_branch(mut self, branch: Option<&str>) -> Self {
        self.default_branch = branch.map(str::to_string);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    fn record(&self, method: &'static str, args: Value) -> Result<()> {
        self.calls.lock().unwrap().push(RecordedCall { method, args });
        match &self.failure {
            Some((status, body)) => {
                let status = status_code(*status);
                Err(Error::api(status, body))
            }
            None => Ok(()),
        }
    }
}

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[async_trait]
impl RepositoryService for StubService {
    async fn fork_project(
        &self,
        project_id: &str,
        namespace: Option<&str>,
    ) -> Result<GitLabRepository> {
        self.record(
            "fork_project",
            json!({"project_id": project_id, "namespace": namespace}),
        )?;
        let mut fork = fixtures::repository(99, "fork/demo");
        fork.forked_from_project = Some(Box::new(fixtures::repository(42, "group/demo")));
        Ok(fork)
    }

    async fn create_branch(
        &self,
        project_id: &str,
        options: &CreateBranchOptions,
    ) -> Result<GitLabBranch> {
        self.record(
            "create_branch",
            json!({"project_id": project_id, "branch": options.name, "ref": options.git_ref}),
        )?;
        Ok(fixtures::branch(&options.name))
    }

    async fn default_branch_ref(&self, project_id: &str) -> Result<String> {
        self.record("default_branch_ref", json!({"project_id": project_id}))?;
        self.default_branch
            .clone()
            .ok_or_else(|| Error::NoDefaultBranch {
                project_id: project_id.to_string(),
            })
    }

    async fn get_file_contents(
        &self,
        project_id: &str,
        file_path: &str,
        git_ref: Option<&str>,
    ) -> Result<GitLabContent> {
        self.record(
            "get_file_contents",
            json!({"project_id": project_id, "file_path": file_path, "ref": git_ref}),
        )?;
        Ok(fixtures::file_content(
            file_path,
            git_ref.unwrap_or("main"),
            "hello",
        ))
    }

    async fn create_or_update_file(
        &self,
        project_id: &str,
        options: &CreateOrUpdateFileOptions,
    ) -> Result<GitLabCreateUpdateFileResponse> {
        let mut args = serde_json::to_value(options).unwrap_or(Value::Null);
        args["project_id"] = json!(project_id);
        self.record("create_or_update_file", args)?;
        Ok(fixtures::file_write(&options.file_path, &options.branch))
    }

    async fn create_commit(
        &self,
        project_id: &str,
        message: &str,
        branch: &str,
        files: &[FileOperation],
    ) -> Result<GitLabCommit> {
        self.record(
            "create_commit",
            json!({
                "project_id": project_id,
                "message": message,
                "branch": branch,
                "files": files,
            }),
        )?;
        Ok(fixtures::commit(message))
    }

    async fn create_issue(
        &self,
        project_id: &str,
        options: &CreateIssueOptions,
    ) -> Result<GitLabIssue> {
        let mut args = serde_json::to_value(options).unwrap_or(Value::Null);
        args["project_id"] = json!(project_id);
        self.record("create_issue", args)?;
        Ok(fixtures::issue(42, &options.title))
    }

    async fn create_merge_request(
        &self,
        project_id: &str,
        options: &CreateMergeRequestOptions,
    ) -> Result<GitLabMergeRequest> {
        let mut args = serde_json::to_value(options).unwrap_or(Value::Null);
        args["project_id"] = json!(project_id);
        self.record("create_merge_request", args)?;
        Ok(fixtures::merge_request(
            42,
            &options.title,
            &options.source_branch,
            &options.target_branch,
        ))
    }

    async fn search_projects(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<GitLabSearchResponse> {
        self.record(
            "search_projects",
            json!({"query": query, "page": page, "per_page": per_page}),
        )?;
        Ok(GitLabSearchResponse {
            count: 1,
            items: vec![fixtures::repository(42, "group/demo")],
        })
    }

    async fn create_repository(
        &self,
        options: &CreateRepositoryOptions,
    ) -> Result<GitLabRepository> {
        self.record(
            "create_repository",
            serde_json::to_value(options).unwrap_or(Value::Null),
        )?;
        Ok(fixtures::repository(100, &format!("me/{}", options.name)))
    }
}
