//! Enum members: one row, frozen.

use std::fmt;

use rowenum_store::{Attributes, Ordinal, Row};
use serde_json::Value;

/// One value of a persisted enum.
///
/// Members have no mutators; once built they are shared as `Arc<Member>`
/// inside a frozen [`EnumState`](crate::EnumState). A member belongs to one
/// enum type and is identified by (type, ordinal). Equality compares the
/// persisted content (type, ordinal, name, every column value), which is
/// what reinitialization uses to decide whether an old member can be reused.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    type_name: String,
    ordinal: Ordinal,
    name: String,
    attributes: Attributes,
    persisted: bool,
}

impl Member {
    /// Build a member from a stored row, reading its name from `name_attr`.
    ///
    /// Hands the row back when the name column is not a string.
    pub(crate) fn from_row(type_name: &str, row: Row, name_attr: &str) -> Result<Self, Row> {
        let name = match row.values.get(name_attr) {
            Some(Value::String(name)) => name.clone(),
            _ => return Err(row),
        };
        Ok(Self {
            type_name: type_name.to_string(),
            name,
            ordinal: row.id,
            attributes: row.values,
            persisted: true,
        })
    }

    /// A member that only lives in memory (its table does not exist).
    pub(crate) fn transient(
        type_name: &str,
        ordinal: Ordinal,
        name: String,
        attributes: Attributes,
    ) -> Self {
        Self {
            type_name: type_name.to_string(),
            ordinal,
            name,
            attributes,
            persisted: false,
        }
    }

    /// Enum type this member belongs to.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Primary key of the backing row.
    pub fn ordinal(&self) -> &Ordinal {
        &self.ordinal
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every column value of the row, including the name column.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.attributes.get(column)
    }

    /// Whether the member is backed by a stored row.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Whether both members stand for the same row of the same type,
    /// whatever their content.
    pub fn same_row(&self, other: &Member) -> bool {
        self.type_name == other.type_name && self.ordinal == other.ordinal
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
