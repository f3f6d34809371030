//! Domain-level error types.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Key under which messages not tied to a single field are reported.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field name -> messages, collected while validating one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single error attached to `field`.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Single error attached to the input as a whole.
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::field(NON_FIELD_ERRORS, message)
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(())` when nothing was collected, the validation error otherwise.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
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

/// Domain errors - request-scoped business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: i32 },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The request body could not be decoded at all.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Authentication credentials were not provided")]
    Unauthenticated,

    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: i32) -> Self {
        Self::NotFound { entity_type, id }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// A unique key is already taken.
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Foreign key or check constraint violation.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(msg) | RepoError::Constraint(msg) => {
                DomainError::Validation(ValidationErrors::non_field(msg))
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}
