//! Canned GitLab response values.

use gitlab_api::{
    GitLabBranch, GitLabCommit, GitLabContent, GitLabCreateUpdateFileResponse, GitLabFileContent,
    GitLabIssue, GitLabMergeRequest, GitLabRepository,
};

pub fn repository(id: u64, path_with_namespace: &str) -> GitLabRepository {
    let name = path_with_namespace
        .rsplit('/')
        .next()
        .unwrap_or(path_with_namespace);
    GitLabRepository {
        id,
        name: name.to_string(),
        path_with_namespace: path_with_namespace.to_string(),
        description: None,
        visibility: Some("private".to_string()),
        web_url: format!("https://gitlab.example/{}", path_with_namespace),
        default_branch: Some("main".to_string()),
        http_url_to_repo: None,
        ssh_url_to_repo: None,
        namespace: None,
        forked_from_project: None,
    }
}

pub fn commit(title: &str) -> GitLabCommit {
    GitLabCommit {
        id: "0123456789abcdef0123456789abcdef01234567".to_string(),
        short_id: "01234567".to_string(),
        title: title.to_string(),
        message: Some(title.to_string()),
        author_name: Some("Test User".to_string()),
        author_email: Some("test@example.com".to_string()),
        created_at: Some("2026-01-01T00:00:00Z".to_string()),
        web_url: None,
        parent_ids: vec![],
    }
}

pub fn branch(name: &str) -> GitLabBranch {
    GitLabBranch {
        name: name.to_string(),
        commit: commit("Initial commit"),
        merged: false,
        protected: false,
        default: false,
        web_url: None,
    }
}

pub fn file_content(file_path: &str, git_ref: &str, text: &str) -> GitLabContent {
    GitLabContent::File(GitLabFileContent {
        file_name: file_path.rsplit('/').next().unwrap_or(file_path).to_string(),
        file_path: file_path.to_string(),
        size: text.len() as u64,
        encoding: "base64".to_string(),
        content: text.to_string(),
        content_sha256: None,
        git_ref: git_ref.to_string(),
        blob_id: "blob".to_string(),
        commit_id: "commit".to_string(),
        last_commit_id: "commit".to_string(),
    })
}

pub fn file_write(file_path: &str, branch: &str) -> GitLabCreateUpdateFileResponse {
    GitLabCreateUpdateFileResponse {
        file_path: file_path.to_string(),
        branch: branch.to_string(),
    }
}

pub fn issue(project_id: u64, title: &str) -> GitLabIssue {
    GitLabIssue {
        id: 1000,
        iid: 1,
        project_id,
        title: title.to_string(),
        description: None,
        state: "opened".to_string(),
        web_url: "https://gitlab.example/group/demo/-/issues/1".to_string(),
        labels: vec![],
        author: None,
        assignees: vec![],
        milestone: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn merge_request(project_id: u64, title: &str, source: &str, target: &str) -> GitLabMergeRequest {
    GitLabMergeRequest {
        id: 2000,
        iid: 1,
        project_id,
        title: title.to_string(),
        description: None,
        state: "opened".to_string(),
        source_branch: source.to_string(),
        target_branch: target.to_string(),
        draft: false,
        web_url: "https://gitlab.example/group/demo/-/merge_requests/1".to_string(),
        author: None,
        assignees: vec![],
        created_at: None,
        updated_at: None,
    }
}
