//! Error types for paybench

use thiserror::Error;

/// Result type alias for paybench operations
pub type Result<T> = std::result::Result<T, PaybenchError>;

/// Main error type for paybench
#[derive(Error, Debug)]
pub enum PaybenchError {
    /// A run cannot start because required reference data is missing
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Unknown pipeline type: {0}")]
    UnknownPipelineType(String),
}

impl PaybenchError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }
}
