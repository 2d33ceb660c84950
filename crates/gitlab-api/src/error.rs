//! Error types for gitlab-api

/// Result type for gitlab-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to GitLab
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Non-success HTTP status from GitLab
    #[error("GitLab API error: {status_text} ({status}) - {body}")]
    Api {
        status_text: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base64 content: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Invalid GitLab API URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Project '{project_id}' has no default branch")]
    NoDefaultBranch { project_id: String },
}

impl Error {
    /// Build an API error from a status and raw response text.
    ///
    /// Structured bodies are re-serialized compactly; anything else is kept
    /// verbatim.
    pub fn api(status: reqwest::StatusCode, text: &str) -> Self {
        let body = match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => value.to_string(),
            Err(_) => text.to_string(),
        };
        Error::Api {
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            status: status.as_u16(),
            body,
        }
    }

    /// HTTP status code, if GitLab answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_api_error_with_json_body() {
        let err = Error::api(
            StatusCode::BAD_REQUEST,
            "{\n  \"message\": \"Branch already exists\"\n}",
        );
        assert_eq!(
            err.to_string(),
            "GitLab API error: Bad Request (400) - {\"message\":\"Branch already exists\"}"
        );
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_api_error_with_text_body() {
        let err = Error::api(StatusCode::BAD_GATEWAY, "upstream timed out");
        assert_eq!(
            err.to_string(),
            "GitLab API error: Bad Gateway (502) - upstream timed out"
        );
    }

    #[test]
    fn test_api_error_with_empty_body() {
        let err = Error::api(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "GitLab API error: Not Found (404) - ");
    }
}
