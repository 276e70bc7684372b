use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Project validation failed: {0}")]
    ProjectValidation(String),

    #[error("Git operation failed: {0}")]
    GitOperation(String),

    #[error("HJSON parsing failed at line {line}, column {column}: {message}")]
    HjsonParsing {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Could not find corresponding dependency '{0}' in package.hjson")]
    DependencyNotFound(String),

    #[error("Unknown source branch name: set CIRCLE_BRANCH")]
    MissingBranch,

    #[error("Failed to write credentials: {0}")]
    Credentials(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
