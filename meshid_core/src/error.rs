//! Error types shared by every meshid component

use crate::identifier::IdWidth;
use thiserror::Error;

/// Errors produced by the identifier and naming engine
#[derive(Debug, Error)]
pub enum MeshIdError {
    /// Malformed or over-length user input. Never retried, never corrected.
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// Every identifier of the requested width is reserved or occupied
    #[error("No available {width} identifiers left")]
    Exhaustion { width: IdWidth },

    /// A node source failed to deliver records
    #[error("Node source '{source_name}' unavailable: {message}")]
    SourceUnavailable {
        source_name: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MeshIdError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn source_unavailable(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Field name for validation failures, `None` otherwise
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::Exhaustion { .. })
    }
}

/// Result type for meshid operations
pub type MeshIdResult<T> = Result<T, MeshIdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = MeshIdError::validation("landmark", "must be up to 11 characters long");
        assert_eq!(err.to_string(), "landmark: must be up to 11 characters long");
        assert_eq!(err.field(), Some("landmark"));
        assert!(err.is_validation());
        assert!(!err.is_exhaustion());
    }

    #[test]
    fn test_exhaustion_is_distinct_from_validation() {
        let err = MeshIdError::Exhaustion {
            width: IdWidth::Short,
        };
        assert!(err.is_exhaustion());
        assert_eq!(err.field(), None);
        assert_eq!(err.to_string(), "No available short identifiers left");
    }
}
