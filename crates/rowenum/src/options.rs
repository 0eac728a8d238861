//! Declaration-time options of an enum type.

use serde::{Deserialize, Serialize};

fn default_name_attr() -> String {
    "name".to_string()
}

/// Options recognized when declaring an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOptions {
    /// Column holding the member name.
    #[serde(default = "default_name_attr")]
    pub name_attr: String,
    /// Qualified name of the database enum type used as primary key, if any.
    ///
    /// When set, member ordinals are the member names themselves.
    #[serde(default)]
    pub sql_enum_type: Option<String>,
}

impl Default for EnumOptions {
    fn default() -> Self {
        Self {
            name_attr: default_name_attr(),
            sql_enum_type: None,
        }
    }
}

impl EnumOptions {
    pub fn with_name_attr(mut self, name_attr: impl Into<String>) -> Self {
        self.name_attr = name_attr.into();
        self
    }

    pub fn with_sql_enum_type(mut self, type_name: impl Into<String>) -> Self {
        self.sql_enum_type = Some(type_name.into());
        self
    }
}
