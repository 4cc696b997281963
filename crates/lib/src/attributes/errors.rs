//! Error types for attribute store operations.

use thiserror::Error;

/// Structured error types for attribute store operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AttributeError {
    /// The key is not part of the store's alias whitelist
    #[error("Attribute not allowed: {key}")]
    NotAllowed { key: String },

    /// No attribute exists under the key
    #[error("Attribute not found: {key}")]
    KeyNotFound { key: String },
}

impl AttributeError {
    /// Check if this error is a whitelist violation
    pub fn is_not_allowed(&self) -> bool {
        matches!(self, AttributeError::NotAllowed { .. })
    }

    /// Check if this error is a missing attribute
    pub fn is_not_found(&self) -> bool {
        matches!(self, AttributeError::KeyNotFound { .. })
    }

    /// Get the key the error refers to
    pub fn key(&self) -> &str {
        match self {
            AttributeError::NotAllowed { key } | AttributeError::KeyNotFound { key } => key,
        }
    }
}

// Conversion from AttributeError to the main Error type
impl From<AttributeError> for crate::Error {
    fn from(err: AttributeError) -> Self {
        crate::Error::Attribute(err)
    }
}
