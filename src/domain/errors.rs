//! Domain errors for the dealflow automation engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the automation engine.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Automation not found: {0}")]
    AutomationNotFound(Uuid),

    #[error("{entity_type} {id} not found")]
    EntityNotFound { entity_type: String, id: Uuid },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Field '{field}' is not writable on {table}")]
    FieldNotWritable { table: String, field: String },

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Webhook egress blocked: {0}")]
    EgressBlocked(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
