//! GitLab REST API access for the MCP server.
//!
//! The server talks to GitLab only through the [`RepositoryService`] trait.
//! [`GitLabClient`] is the HTTP implementation; tests substitute a stub.
//!
//! ```text
//! [ dispatcher ] --(typed options)--> [ RepositoryService ]
//!                                            |
//!                                            v
//!                                  [ GitLabClient (reqwest) ]
//!                                            |
//!                                            v
//!                                  [ GitLab /api/v4 ]
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod service;

pub use client::{DEFAULT_API_URL, GitLabClient};
pub use error::{Error, Result};
pub use models::{
    CreateBranchOptions, CreateIssueOptions, CreateMergeRequestOptions, CreateOrUpdateFileOptions,
    CreateRepositoryOptions, FileOperation, GitLabBranch, GitLabCommit, GitLabContent,
    GitLabCreateUpdateFileResponse, GitLabFileContent, GitLabIssue, GitLabMergeRequest,
    GitLabMilestone, GitLabNamespace, GitLabRepository, GitLabSearchResponse, GitLabTreeItem,
    GitLabUser, Visibility,
};
pub use reqwest::StatusCode;
pub use service::RepositoryService;
