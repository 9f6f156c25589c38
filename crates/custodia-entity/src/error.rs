//! Error types for entity lifecycle operations.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias using [`EntityError`].
pub type Result<T> = std::result::Result<T, EntityError>;

/// Failures reported by the persistence collaborator.
///
/// The lifecycle manager rolls back and hands these back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The backend could not be reached or failed internally.
    #[error("storage backend error: {message}")]
    Backend {
        /// Backend-supplied description.
        message: String,
    },

    /// A write violated a storage constraint.
    #[error("storage constraint violated: {message}")]
    Constraint {
        /// Which constraint, in the backend's words.
        message: String,
    },
}

impl StorageError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a constraint error.
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }
}

/// Field-keyed validation messages.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// No errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.0.entry(field.into()).or_default().push(message.into());
        self
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// `Ok(())` if empty, otherwise these errors.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Errors raised by the lifecycle manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EntityError {
    /// The entity failed validation; nothing was written.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The store failed; the transaction was rolled back.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No entity exists under the key.
    #[error("{entity} not found (PK: {key})")]
    NotFound {
        /// Entity type name.
        entity: &'static str,
        /// The key looked up.
        key: u64,
    },
}

impl EntityError {
    /// Creates a validation error for a single field.
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }

    /// Returns `true` if the caller's input is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EntityError::Validation(_) | EntityError::NotFound { .. }
        )
    }

    /// The core never retries; storage retry policy belongs to the store.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

impl From<ValidationErrors> for EntityError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
