//! Error types for gitlab-policy

/// Result type for gitlab-policy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gitlab-policy operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Name does not match any operation in the catalogue
    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },
}
