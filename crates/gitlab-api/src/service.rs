//! Remote repository service trait

use async_trait::async_trait;

use crate::Result;
use crate::models::{
    CreateBranchOptions, CreateIssueOptions, CreateMergeRequestOptions, CreateOrUpdateFileOptions,
    CreateRepositoryOptions, FileOperation, GitLabBranch, GitLabCommit, GitLabContent,
    GitLabCreateUpdateFileResponse, GitLabIssue, GitLabMergeRequest, GitLabRepository,
    GitLabSearchResponse,
};

/// Typed operations against a GitLab instance.
///
/// Each method performs its remote call(s) once. Nothing here retries, times
/// out, or consults policy; callers authorize before calling.
#[async_trait]
pub trait RepositoryService: Send + Sync {
    /// Fork a project, optionally into `namespace`.
    async fn fork_project(
        &self,
        project_id: &str,
        namespace: Option<&str>,
    ) -> Result<GitLabRepository>;

    async fn create_branch(
        &self,
        project_id: &str,
        options: &CreateBranchOptions,
    ) -> Result<GitLabBranch>;

    /// Name of the project's default branch.
    async fn default_branch_ref(&self, project_id: &str) -> Result<String>;

    /// Read a file (content decoded to text) or list a directory.
    async fn get_file_contents(
        &self,
        project_id: &str,
        file_path: &str,
        git_ref: Option<&str>,
    ) -> Result<GitLabContent>;

    /// Create the file, or update it when it already exists on `branch`.
    ///
    /// Existence is a single best-effort lookup: any read failure counts as
    /// "absent", and GitLab rejects a create on a file that is really there.
    async fn create_or_update_file(
        &self,
        project_id: &str,
        options: &CreateOrUpdateFileOptions,
    ) -> Result<GitLabCreateUpdateFileResponse>;

    /// Commit several new files to `branch` in one commit.
    async fn create_commit(
        &self,
        project_id: &str,
        message: &str,
        branch: &str,
        files: &[FileOperation],
    ) -> Result<GitLabCommit>;

    async fn create_issue(
        &self,
        project_id: &str,
        options: &CreateIssueOptions,
    ) -> Result<GitLabIssue>;

    async fn create_merge_request(
        &self,
        project_id: &str,
        options: &CreateMergeRequestOptions,
    ) -> Result<GitLabMergeRequest>;

    async fn search_projects(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<GitLabSearchResponse>;

    async fn create_repository(&self, options: &CreateRepositoryOptions)
    -> Result<GitLabRepository>;
}
