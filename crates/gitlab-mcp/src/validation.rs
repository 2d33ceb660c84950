//! Argument validation
//!
//! Each tool's arguments are checked against the schema from
//! [`crate::tools::input_schema`]. Every violation is collected, not just the
//! first, and the validated object is then deserialized into a typed
//! argument struct for the backend call.

use std::collections::HashMap;

use gitlab_api::{
    CreateIssueOptions, CreateMergeRequestOptions, CreateOrUpdateFileOptions,
    CreateRepositoryOptions, FileOperation,
};
use gitlab_policy::Operation;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, ValidationError, Validator};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, FieldIssue, Result};
use crate::tools::input_schema;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 20;

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForkRepositoryArgs {
    pub project_id: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateBranchArgs {
    pub project_id: String,
    pub branch: String,
    /// Source ref; the project's default branch when absent.
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchRepositoriesArgs {
    pub search: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetFileContentsArgs {
    pub project_id: String,
    pub file_path: String,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateOrUpdateFileArgs {
    pub project_id: String,
    #[serde(flatten)]
    pub options: CreateOrUpdateFileOptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushFilesArgs {
    pub project_id: String,
    pub branch: String,
    pub commit_message: String,
    pub files: Vec<FileOperation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateIssueArgs {
    pub project_id: String,
    #[serde(flatten)]
    pub options: CreateIssueOptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateMergeRequestArgs {
    pub project_id: String,
    #[serde(flatten)]
    pub options: CreateMergeRequestOptions,
}

/// Validated arguments, one variant per tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArguments {
    CreateOrUpdateFile(CreateOrUpdateFileArgs),
    SearchRepositories(SearchRepositoriesArgs),
    CreateRepository(CreateRepositoryOptions),
    GetFileContents(GetFileContentsArgs),
    PushFiles(PushFilesArgs),
    CreateIssue(CreateIssueArgs),
    CreateMergeRequest(CreateMergeRequestArgs),
    ForkRepository(ForkRepositoryArgs),
    CreateBranch(CreateBranchArgs),
}

/// Compiled argument schemas for every tool.
pub struct ArgumentValidator {
    validators: HashMap<Operation, Validator>,
}

impl ArgumentValidator {
    pub fn new() -> Result<Self> {
        let mut validators = HashMap::with_capacity(Operation::ALL.len());
        for operation in Operation::ALL {
            validators.insert(operation, compile_schema(operation)?);
        }
        Ok(Self { validators })
    }

    /// Check `arguments` for `operation` and convert them to typed form.
    ///
    /// Fails with [`Error::InvalidArguments`] listing every violation.
    pub fn validate(&self, operation: Operation, arguments: &Value) -> Result<ToolArguments> {
        let validator = self.validators.get(&operation).ok_or_else(|| Error::Schema {
            tool: operation.name().to_string(),
            message: "schema not compiled".to_string(),
        })?;

        let issues: Vec<FieldIssue> = validator.iter_errors(arguments).map(field_issue).collect();
        if !issues.is_empty() {
            return Err(Error::InvalidArguments { issues });
        }

        let args = match operation {
            Operation::CreateOrUpdateFile => ToolArguments::CreateOrUpdateFile(parse(arguments)?),
            Operation::SearchRepositories => ToolArguments::SearchRepositories(parse(arguments)?),
            Operation::CreateRepository => ToolArguments::CreateRepository(parse(arguments)?),
            Operation::GetFileContents => ToolArguments::GetFileContents(parse(arguments)?),
            Operation::PushFiles => ToolArguments::PushFiles(parse(arguments)?),
            Operation::CreateIssue => ToolArguments::CreateIssue(parse(arguments)?),
            Operation::CreateMergeRequest => ToolArguments::CreateMergeRequest(parse(arguments)?),
            Operation::ForkRepository => ToolArguments::ForkRepository(parse(arguments)?),
            Operation::CreateBranch => ToolArguments::CreateBranch(parse(arguments)?),
        };
        Ok(args)
    }
}

impl std::fmt::Debug for ArgumentValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentValidator")
            .field("tools", &self.validators.len())
            .finish()
    }
}

fn compile_schema(operation: Operation) -> Result<Validator> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&input_schema(operation))
        .map_err(|err| Error::Schema {
            tool: operation.name().to_string(),
            message: err.to_string(),
        })
}

fn parse<T: DeserializeOwned>(arguments: &Value) -> Result<T> {
    serde_json::from_value(arguments.clone()).map_err(|err| Error::InvalidArguments {
        issues: vec![FieldIssue::new("", err.to_string())],
    })
}

/// `/files/0/content` becomes `files.0.content`.
fn dotted_path(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn field_issue(error: ValidationError<'_>) -> FieldIssue {
    let path = dotted_path(&error.instance_path.to_string());
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let property = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            let path = if path.is_empty() {
                property
            } else {
                format!("{path}.{property}")
            };
            FieldIssue::new(path, "Required")
        }
        _ => FieldIssue::new(path, error.to_string()),
    }
}
