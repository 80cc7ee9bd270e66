use thiserror::Error;

use crate::types::EnrichmentResult;

/// Errors raised by the ranking side of the recommender and by artifact loading
#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("Item not found: {title}")]
    ItemNotFound { title: String },

    #[error("Index out of range: {index} (catalog has {size} items)")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO error: {message}")]
    IOError { message: String },
}

impl RecommendError {
    /// Create a user-friendly error message for display in the CLI
    pub fn user_message(&self) -> String {
        match self {
            RecommendError::ItemNotFound { title } => {
                format!("'{}' is not in the catalog. Pick a title from the list.", title)
            }
            RecommendError::IndexOutOfRange { index, size } => {
                format!("Item #{} does not exist; the catalog only has {} items.", index, size)
            }
            RecommendError::ArtifactLoad { path, reason } => {
                format!("The data file '{}' could not be loaded: {}", path, reason)
            }
            RecommendError::InvalidConfig { message } => {
                format!("The configuration is invalid: {}", message)
            }
            RecommendError::IOError { message } => {
                format!("File operation failed: {}", message)
            }
        }
    }

    /// Shorthand for artifact failures
    pub fn artifact(path: impl Into<String>, reason: impl Into<String>) -> Self {
        RecommendError::ArtifactLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for RecommendError {
    fn from(error: std::io::Error) -> Self {
        RecommendError::IOError {
            message: error.to_string(),
        }
    }
}

/// Result type alias for ranking and loading operations
pub type RecommendResult<T> = Result<T, RecommendError>;

/// Transport-level faults raised by the remote lookup client.
///
/// Ordinary "not found" outcomes never show up here; they are `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Network error: {message}")]
    Network { message: String, is_timeout: bool },

    #[error("Request for '{title}' was cancelled")]
    Cancelled { title: String },

    #[error("Lookup for '{title}' timed out after {timeout_ms}ms")]
    Timeout { title: String, timeout_ms: u64 },

    /// One of a title's lookups faulted; `result` holds what the other one found
    #[error("Lookup for '{}' was incomplete: {cause}", .result.title)]
    Incomplete {
        result: Box<EnrichmentResult>,
        cause: Box<LookupError>,
    },
}

impl LookupError {
    pub fn incomplete(result: EnrichmentResult, cause: LookupError) -> Self {
        LookupError::Incomplete {
            result: Box::new(result),
            cause: Box::new(cause),
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(error: reqwest::Error) -> Self {
        LookupError::Network {
            message: error.to_string(),
            is_timeout: error.is_timeout(),
        }
    }
}

pub type LookupResult<T> = Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_error_user_messages() {
        let errors = vec![
            RecommendError::ItemNotFound { title: "Avatar".to_string() },
            RecommendError::IndexOutOfRange { index: 12, size: 3 },
            RecommendError::artifact("/data/similarity.json", "row 3 has 4 columns, expected 5"),
            RecommendError::InvalidConfig { message: "worker_count must be > 0".to_string() },
            RecommendError::IOError { message: "disk full".to_string() },
        ];

        for error in errors {
            let user_msg = error.user_message();
            assert!(!user_msg.is_empty());
            assert!(user_msg.len() > 10);
        }
    }

    #[test]
    fn test_user_message_names_the_title() {
        let error = RecommendError::ItemNotFound { title: "Avatar".to_string() };
        assert!(error.user_message().contains("'Avatar' is not in the catalog"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RecommendError = io_error.into();
        assert!(matches!(err, RecommendError::IOError { .. }));
    }

    #[test]
    fn test_lookup_error_display() {
        let network = LookupError::Network {
            message: "Connection refused".to_string(),
            is_timeout: false,
        };
        assert!(network.to_string().contains("Network error"));

        let timeout = LookupError::Timeout { title: "Heat".to_string(), timeout_ms: 250 };
        assert!(timeout.to_string().contains("250ms"));

        let incomplete = LookupError::incomplete(EnrichmentResult::absent("Heat"), timeout);
        assert!(incomplete.to_string().contains("'Heat' was incomplete"));
    }
}
