//! Error types for the rowenum row store.

use thiserror::Error;

/// Result type alias for row store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during row store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("no such table: {0}")]
    NoSuchTable(String),

    #[error("unknown column {column:?} on table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("constraint violated on table {table}: {message}")]
    Constraint { table: String, message: String },

    #[error("duplicate primary key {id} on table {table}")]
    DuplicateKey { table: String, id: String },

    #[error("not found: {0}")]
    NotFound(String),
}
