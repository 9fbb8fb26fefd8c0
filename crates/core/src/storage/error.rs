use thiserror::Error;

use crate::catalog::EntityKind;

/// Failure reported by the key-value store for a single call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
    #[error("Throughput exceeded, please retry")]
    Throttled,
    #[error("DynamoDB internal server error")]
    InternalServer,
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Gave up waiting for table to become {state} after {attempts} attempts")]
    WaitTimeout { state: &'static str, attempts: u32 },
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::ResourceNotFound(_))
    }
}

/// A stored row that does not match its entity shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Missing field: {0}")]
    Missing(&'static str),
    #[error("Field {field} is not a {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },
    #[error("Invalid number in field {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Errors returned by the store gateway and the table lifecycle manager.
///
/// Every variant names the table, so a failure can be traced without the
/// caller's context.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Could not write {kind} {id} to table '{table}': {source}")]
    Write {
        kind: EntityKind,
        id: String,
        table: String,
        source: BackendError,
    },
    #[error("Query {operation} on table '{table}' failed: {source}")]
    Query {
        operation: &'static str,
        table: String,
        source: BackendError,
    },
    #[error("Could not decode {kind} read from table '{table}': {source}")]
    Decode {
        kind: EntityKind,
        table: String,
        source: FieldError,
    },
    #[error("Could not create table '{table}': {source}")]
    Create { table: String, source: BackendError },
    #[error("Could not delete table '{table}': {source}")]
    Delete { table: String, source: BackendError },
    #[error("Could not scan table '{table}': {source}")]
    Scan { table: String, source: BackendError },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
