//! Error types for enum declaration and lookup.

use rowenum_store::{Ordinal, StoreError};
use thiserror::Error;

/// Result type alias for enum operations.
pub type EnumResult<T> = Result<T, EnumError>;

/// Errors raised while declaring, refreshing or reading persisted enums.
///
/// None of these are retried internally. Failures during declaration are
/// meant to abort application startup.
#[derive(Debug, Error)]
pub enum EnumError {
    /// A member row could not be created because required columns have no
    /// value and no default.
    #[error("cannot create {type_name} member {name:?}: missing required attribute(s) {}", .attributes.join(", "))]
    MissingAttributes {
        type_name: String,
        name: String,
        attributes: Vec<String>,
    },

    #[error("uninitialized constant {type_name}::{name}")]
    UnknownMember { type_name: String, name: String },

    /// A registered type name no longer resolves to a type handle.
    #[error("uninitialized enum type {0}")]
    UnresolvedType(String),

    #[error("{type_name} is a persisted enum; cannot {operation} its rows")]
    ReadOnlyRecord {
        type_name: String,
        operation: &'static str,
    },

    #[error("unsafe class initialization: {type_name} declared inside an open transaction")]
    UnsafeInitialization { type_name: String },

    #[error("{0} has not been initialized as a persisted enum")]
    NotInitialized(String),

    #[error("{type_name} row {ordinal} has no string in name column {name_attr:?}")]
    MissingName {
        type_name: String,
        ordinal: Ordinal,
        name_attr: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
