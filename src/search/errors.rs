//! Error types for fare searches

use thiserror::Error;

/// Result type for search operations
pub type SearchResultOf<T> = Result<T, SearchError>;

/// Everything that can go wrong while running a fare search
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Invalid search request: {message}")]
    InvalidRequest { message: String },

    #[error("Browser provisioning failed: {message}")]
    Provisioning { message: String },

    #[error("Step '{step}' failed: {message}")]
    StepExecution { step: String, message: String },

    #[error("Step '{step}' timed out after {seconds}s")]
    Timeout { step: String, seconds: u64 },

    #[error("No offers extracted: {message}")]
    EmptyResult { message: String },

    #[error("Search failed after {attempts} attempts: {last_error}")]
    ExhaustedRetries { attempts: u32, last_error: String },
}

impl SearchError {
    /// Create an invalid request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a provisioning error
    pub fn provisioning<S: Into<String>>(message: S) -> Self {
        Self::Provisioning {
            message: message.into(),
        }
    }

    /// Create a step execution error
    pub fn step<S: Into<String>, M: Into<String>>(step: S, message: M) -> Self {
        Self::StepExecution {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Create an empty result error
    pub fn empty<S: Into<String>>(message: S) -> Self {
        Self::EmptyResult {
            message: message.into(),
        }
    }

    /// Whether a fresh attempt may succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provisioning { .. }
            | Self::StepExecution { .. }
            | Self::Timeout { .. }
            | Self::EmptyResult { .. } => true,
            Self::InvalidRequest { .. } | Self::ExhaustedRetries { .. } => false,
        }
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Provisioning { .. } => "provisioning",
            Self::StepExecution { .. } => "step_execution",
            Self::Timeout { .. } => "timeout",
            Self::EmptyResult { .. } => "empty_result",
            Self::ExhaustedRetries { .. } => "exhausted_retries",
        }
    }
}
