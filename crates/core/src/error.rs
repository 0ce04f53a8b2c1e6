//! Error types for the Agrinet advisor.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! LLM, search, prompt and conversation sequencing errors.
//!
//! Retrieval failures of individual sub-queries are deliberately absent:
//! they are recorded as values by the retrieval executor and never
//! propagate as `AppError`.

use thiserror::Error;

/// Unified error type for the Agrinet advisor.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Document search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// A turn was appended out of sequence for its session.
    #[error("Invalid turn order for session '{session}': expected position {expected}, got {found}")]
    InvalidTurnOrder {
        session: String,
        expected: u64,
        found: u64,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_turn_order_message() {
        let err = AppError::InvalidTurnOrder {
            session: "s1".to_string(),
            expected: 3,
            found: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("s1"));
        assert!(msg.contains("expected position 3"));
        assert!(msg.contains("got 5"));
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
