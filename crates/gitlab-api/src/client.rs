//! HTTP implementation of [`RepositoryService`]

use std::fmt;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::models::{
    CreateBranchOptions, CreateIssueOptions, CreateMergeRequestOptions, CreateOrUpdateFileOptions,
    CreateRepositoryOptions, FileOperation, GitLabBranch, GitLabCommit, GitLabContent,
    GitLabCreateUpdateFileResponse, GitLabIssue, GitLabMergeRequest, GitLabRepository,
    GitLabSearchResponse,
};
use crate::service::RepositoryService;
use crate::{Error, Result};

/// Public GitLab API endpoint used when no URL is configured
pub const DEFAULT_API_URL: &str = "https://gitlab.com/api/v4";

/// GitLab REST client authenticated with a personal access token.
#[derive(Clone)]
pub struct GitLabClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl GitLabClient {
    /// Create a client for `base_url` (e.g. `https://gitlab.com/api/v4`).
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| Error::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            });
        }

        let http = Client::builder()
            .user_agent(concat!("gitlab-zero-leak/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: parsed,
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    ///
    /// A project id such as `group/project` stays a single segment
    /// (`group%2Fproject`), as GitLab expects.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn project_endpoint(&self, project_id: &str, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["projects", project_id];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %text, "GitLab request failed");
        Err(Error::api(status, &text))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(self.http.post(url).json(body)).await
    }
}

impl fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Decode base64 file content into text, tolerating GitLab's line breaks.
fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Serialize)]
struct IssueBody<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee_ids: Option<&'a [u64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    milestone_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<String>,
}

#[derive(Serialize)]
struct FileBody<'a> {
    branch: &'a str,
    content: &'a str,
    commit_message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_path: Option<&'a str>,
}

#[derive(Serialize)]
struct CommitAction<'a> {
    action: &'static str,
    file_path: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CommitBody<'a> {
    branch: &'a str,
    commit_message: &'a str,
    actions: Vec<CommitAction<'a>>,
}

#[async_trait]
impl RepositoryService for GitLabClient {
    async fn fork_project(
        &self,
        project_id: &str,
        namespace: Option<&str>,
    ) -> Result<GitLabRepository> {
        let mut url = self.project_endpoint(project_id, &["fork"])?;
        if let Some(namespace) = namespace {
            url.query_pairs_mut().append_pair("namespace", namespace);
        }
        let request = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        self.send_json(request).await
    }

    async fn create_branch(
        &self,
        project_id: &str,
        options: &CreateBranchOptions,
    ) -> Result<GitLabBranch> {
        let url = self.project_endpoint(project_id, &["repository", "branches"])?;
        self.post_json(url, options).await
    }

    async fn default_branch_ref(&self, project_id: &str) -> Result<String> {
        let url = self.project_endpoint(project_id, &[])?;
        let project: GitLabRepository = self.send_json(self.http.get(url)).await?;
        project.default_branch.ok_or_else(|| Error::NoDefaultBranch {
            project_id: project_id.to_string(),
        })
    }

    async fn get_file_contents(
        &self,
        project_id: &str,
        file_path: &str,
        git_ref: Option<&str>,
    ) -> Result<GitLabContent> {
        let mut url = self.project_endpoint(project_id, &["repository", "files", file_path])?;
        if let Some(git_ref) = git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }

        let mut content: GitLabContent = self.send_json(self.http.get(url)).await?;
        if let GitLabContent::File(file) = &mut content
            && !file.content.is_empty()
        {
            file.content = decode_content(&file.content)?;
        }
        Ok(content)
    }

    async fn create_or_update_file(
        &self,
        project_id: &str,
        options: &CreateOrUpdateFileOptions,
    ) -> Result<GitLabCreateUpdateFileResponse> {
        let url = self.project_endpoint(
            project_id,
            &["repository", "files", options.file_path.as_str()],
        )?;
        let body = FileBody {
            branch: &options.branch,
            content: &options.content,
            commit_message: &options.commit_message,
            previous_path: options.previous_path.as_deref(),
        };

        let exists = self
            .get_file_contents(project_id, &options.file_path, Some(&options.branch))
            .await
            .is_ok();
        tracing::debug!(project_id, file_path = %options.file_path, exists, "Looked up file");

        let request = if exists {
            self.http.put(url)
        } else {
            self.http.post(url)
        };
        self.send_json(request.json(&body)).await
    }

    async fn create_commit(
        &self,
        project_id: &str,
        message: &str,
        branch: &str,
        files: &[FileOperation],
    ) -> Result<GitLabCommit> {
        let url = self.project_endpoint(project_id, &["repository", "commits"])?;
        let body = CommitBody {
            branch,
            commit_message: message,
            actions: files
                .iter()
                .map(|file| CommitAction {
                    action: "create",
                    file_path: &file.file_path,
                    content: &file.content,
                })
                .collect(),
        };
        self.post_json(url, &body).await
    }

    async fn create_issue(
        &self,
        project_id: &str,
        options: &CreateIssueOptions,
    ) -> Result<GitLabIssue> {
        let url = self.project_endpoint(project_id, &["issues"])?;
        let body = IssueBody {
            title: &options.title,
            description: options.description.as_deref(),
            assignee_ids: options.assignee_ids.as_deref(),
            milestone_id: options.milestone_id,
            labels: options.labels.as_ref().map(|labels| labels.join(",")),
        };
        self.post_json(url, &body).await
    }

    async fn create_merge_request(
        &self,
        project_id: &str,
        options: &CreateMergeRequestOptions,
    ) -> Result<GitLabMergeRequest> {
        let url = self.project_endpoint(project_id, &["merge_requests"])?;
        self.post_json(url, options).await
    }

    async fn search_projects(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<GitLabSearchResponse> {
        let mut url = self.endpoint(&["projects"])?;
        url.query_pairs_mut()
            .append_pair("search", query)
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());

        let response = self.execute(self.http.get(url)).await?;
        let count = response
            .headers()
            .get("x-total")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        let bytes = response.bytes().await?;
        let items = serde_json::from_slice(&bytes)?;

        Ok(GitLabSearchResponse { count, items })
    }

    async fn create_repository(
        &self,
        options: &CreateRepositoryOptions,
    ) -> Result<GitLabRepository> {
        let url = self.endpoint(&["projects"])?;
        self.post_json(url, options).await
    }
}
