//! Error types for CLI operations

use thiserror::Error;

use crate::search::SearchError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur during CLI command execution
#[derive(Error, Debug)]
pub enum CliError {
    /// Error executing a command or operation
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Required environment variables are not set
    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingEnvironment(Vec<String>),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerdeError(String),

    /// Invalid argument or input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// Conversions from common error types
impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::SerdeError(err.to_string())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::ExecutionError(format!("{:#}", err))
    }
}

impl From<SearchError> for CliError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidRequest { message } => CliError::InvalidInput(message),
            other => CliError::ExecutionError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: CliError = SearchError::invalid_request("missing fields: origin").into();
        assert_eq!(err.to_string(), "Invalid input: missing fields: origin");

        let err: CliError = SearchError::provisioning("quota exceeded").into();
        assert!(matches!(err, CliError::ExecutionError(_)));

        let err = CliError::MissingEnvironment(vec![
            "BROWSERBASE_API_KEY".to_string(),
            "BROWSERBASE_PROJECT_ID".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing environment variables: BROWSERBASE_API_KEY, BROWSERBASE_PROJECT_ID"
        );

        let err: CliError = anyhow::anyhow!("inner").context("outer").into();
        assert_eq!(err.to_string(), "Execution error: outer: inner");
    }
}
