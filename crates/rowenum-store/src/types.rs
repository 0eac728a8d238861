//! Domain types for the rowenum row store.
//!
//! Rows carry an [`Ordinal`] primary key and a JSON attribute map. Table
//! schemas describe the non-key columns so callers can introspect
//! nullability and defaults before inserting.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column values of a row, excluding the primary key.
pub type Attributes = serde_json::Map<String, Value>;

/// Primary key of a row.
///
/// Integer keys are the common case. Tables whose key column is a
/// database-level enumerated type use the enum label instead.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ordinal {
    Int(i64),
    Label(String),
}

impl Ordinal {
    /// Integer value, if this is an integer ordinal.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Ordinal::Int(id) => Some(*id),
            Ordinal::Label(_) => None,
        }
    }

    /// Key used for this ordinal in the backing row table.
    pub fn table_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordinal::Int(id) => write!(f, "{id}"),
            Ordinal::Label(label) => f.write_str(label),
        }
    }
}

impl From<i64> for Ordinal {
    fn from(id: i64) -> Self {
        Ordinal::Int(id)
    }
}

impl From<i32> for Ordinal {
    fn from(id: i32) -> Self {
        Ordinal::Int(i64::from(id))
    }
}

impl From<&Ordinal> for Ordinal {
    fn from(ordinal: &Ordinal) -> Self {
        ordinal.clone()
    }
}

impl From<&str> for Ordinal {
    fn from(label: &str) -> Self {
        Ordinal::Label(label.to_string())
    }
}

impl From<String> for Ordinal {
    fn from(label: String) -> Self {
        Ordinal::Label(label)
    }
}

/// A persisted row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: Ordinal,
    pub values: Attributes,
}

impl Row {
    /// Value of `column`, if set.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }
}

// ── Schema ────────────────────────────────────────────────────────

/// How the primary key of a table is typed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimaryKey {
    /// Integer key, assigned as `max + 1` when not supplied.
    #[default]
    Integer,
    /// Database enum type; every insert must supply the label.
    SqlEnum { type_name: String },
}

/// A non-key column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(default)]
    pub nullable: bool,
    /// Value applied on insert when the column is not supplied.
    #[serde(default)]
    pub default: Option<Value>,
}

impl ColumnDef {
    /// A non-nullable column without a default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            default: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Schema of a table: its key type and non-key columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub primary_key: PrimaryKey,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// A table with an integer key and no columns yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: PrimaryKey::Integer,
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_primary_key(mut self, primary_key: PrimaryKey) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Look up a column by name.
    pub fn column_def(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}
