//! enums.toml declaration file parser.
//!
//! ```toml
//! [store]
//! path = "enums.redb"
//!
//! [[table]]
//! name = "colors"
//! columns = [{ name = "name" }, { name = "hex", nullable = true }]
//!
//! [[enum]]
//! type = "Color"
//! table = "colors"
//! members = ["Red", { name = "Green", hex = "#0f0" }]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rowenum_store::{Attributes, RowStore, TableSchema};
use serde::{Deserialize, Serialize};

use crate::declare::RequiredSpec;
use crate::model::EnumModel;
use crate::options::EnumOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowenumConfig {
    pub store: StoreConfig,
    /// Tables created when missing.
    #[serde(default, rename = "table")]
    pub tables: Vec<TableSchema>,
    #[serde(default, rename = "enum")]
    pub enums: Vec<EnumDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

/// One enum type and its required members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDecl {
    #[serde(rename = "type")]
    pub type_name: String,
    pub table: String,
    #[serde(flatten)]
    pub options: EnumOptions,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
}

/// A required member: a bare name, or a name with column values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberDecl {
    Name(String),
    Attributed {
        name: String,
        #[serde(flatten)]
        attributes: Attributes,
    },
}

impl EnumDecl {
    pub fn required_spec(&self) -> RequiredSpec {
        RequiredSpec::from_pairs(self.members.iter().map(|member| match member {
            MemberDecl::Name(name) => (name.clone(), Attributes::new()),
            MemberDecl::Attributed { name, attributes } => (name.clone(), attributes.clone()),
        }))
    }

    /// Model for this declaration over `store`, not yet initialized.
    pub fn model(&self, store: Arc<dyn RowStore>) -> EnumModel {
        EnumModel::new(&self.type_name, &self.table, store).with_options(self.options.clone())
    }
}

impl RowenumConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RowenumConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn enum_decl(&self, type_name: &str) -> Option<&EnumDecl> {
        self.enums.iter().find(|decl| decl.type_name == type_name)
    }
}
