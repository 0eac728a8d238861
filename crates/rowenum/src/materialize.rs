//! Constant materializer — makes sure every required member has a row.
//!
//! Existing rows are found by exact name and never touched. Missing ones
//! are created from the declared attributes: attributes that are not
//! columns are skipped with a warning, and columns left without a value
//! (not nullable, no default) fail the declaration.
//!
//! When the table does not exist the members are built in memory instead.
//! A name keeps the ordinal the previous state gave it; new names get
//! sequential ordinals above the highest one the type has used so far.

use std::collections::HashSet;

use rowenum_store::{Attributes, ColumnDef, Ordinal, Row, RowStore};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::declare::RequiredSpec;
use crate::error::{EnumError, EnumResult};
use crate::member::Member;
use crate::options::EnumOptions;
use crate::state::EnumState;

/// Ensures the required members of one enum type exist.
pub struct Materializer<'a> {
    store: &'a dyn RowStore,
    type_name: &'a str,
    table: &'a str,
    options: &'a EnumOptions,
    previous: Option<&'a EnumState>,
}

impl<'a> Materializer<'a> {
    pub fn new(
        store: &'a dyn RowStore,
        type_name: &'a str,
        table: &'a str,
        options: &'a EnumOptions,
    ) -> Self {
        Self {
            store,
            type_name,
            table,
            options,
            previous: None,
        }
    }

    /// State being replaced, consulted for in-memory ordinals.
    pub fn with_previous(mut self, previous: Option<&'a EnumState>) -> Self {
        self.previous = previous;
        self
    }

    /// Return one member per required name, in declaration order,
    /// creating the rows that don't exist yet.
    pub fn materialize(&self, spec: &RequiredSpec) -> EnumResult<Vec<Member>> {
        if !self.store.table_exists(self.table)? {
            return Ok(self.transient(spec));
        }

        let name_attr = self.options.name_attr.as_str();
        let existing: HashSet<String> = self
            .store
            .pluck(self.table, name_attr)?
            .into_iter()
            .filter_map(|value| match value {
                Value::String(name) => Some(name),
                _ => None,
            })
            .collect();

        let mut columns: Option<Vec<ColumnDef>> = None;
        let mut members = Vec::with_capacity(spec.len());
        for (name, attributes) in spec.iter() {
            let found = if existing.contains(name) {
                self.store
                    .find_by(self.table, name_attr, &Value::String(name.to_string()))?
            } else {
                None
            };
            let row = match found {
                Some(row) => row,
                None => {
                    if columns.is_none() {
                        columns = Some(self.store.columns(self.table)?);
                    }
                    self.create(name, attributes, columns.as_deref().unwrap_or(&[]))?
                }
            };
            let member = Member::from_row(self.type_name, row, name_attr).map_err(|row| {
                EnumError::MissingName {
                    type_name: self.type_name.to_string(),
                    ordinal: row.id,
                    name_attr: name_attr.to_string(),
                }
            })?;
            members.push(member);
        }

        debug!(
            type_name = self.type_name,
            table = self.table,
            count = members.len(),
            "required members materialized"
        );
        Ok(members)
    }

    fn create(&self, name: &str, attributes: &Attributes, columns: &[ColumnDef]) -> EnumResult<Row> {
        let name_attr = self.options.name_attr.as_str();
        let is_column = |key: &str| columns.iter().any(|c| c.name == key);

        let mut values = Attributes::new();
        values.insert(name_attr.to_string(), Value::String(name.to_string()));
        for (key, value) in attributes {
            if key == name_attr {
                continue;
            }
            if is_column(key) {
                values.insert(key.clone(), value.clone());
            } else {
                warn!(
                    type_name = self.type_name,
                    table = self.table,
                    member = %name,
                    attribute = %key,
                    "unknown attribute, skipping"
                );
            }
        }

        let missing: Vec<String> = columns
            .iter()
            .filter(|c| !c.nullable && !c.has_default())
            .filter(|c| values.get(&c.name).is_none_or(Value::is_null))
            .map(|c| c.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(EnumError::MissingAttributes {
                type_name: self.type_name.to_string(),
                name: name.to_string(),
                attributes: missing,
            });
        }

        let id = self
            .options
            .sql_enum_type
            .as_ref()
            .map(|_| Ordinal::Label(name.to_string()));
        let row = self.store.insert(self.table, id, values)?;
        info!(
            type_name = self.type_name,
            table = self.table,
            member = %name,
            ordinal = %row.id,
            "enum member created"
        );
        Ok(row)
    }

    /// Members for a type whose table doesn't exist.
    fn transient(&self, spec: &RequiredSpec) -> Vec<Member> {
        warn!(
            type_name = self.type_name,
            table = self.table,
            "table does not exist; enum members will not be persisted"
        );
        let name_attr = self.options.name_attr.as_str();
        let mut high_water = self.previous.map_or(0, |p| p.high_water);
        let mut members = Vec::with_capacity(spec.len());
        for (name, attributes) in spec.iter() {
            let ordinal = match self.options.sql_enum_type {
                Some(_) => Ordinal::Label(name.to_string()),
                None => match self.previous_ordinal(name) {
                    Some(id) => Ordinal::Int(id),
                    None => {
                        high_water += 1;
                        Ordinal::Int(high_water)
                    }
                },
            };
            let mut attributes = attributes.clone();
            attributes.insert(name_attr.to_string(), Value::String(name.to_string()));
            members.push(Member::transient(
                self.type_name,
                ordinal,
                name.to_string(),
                attributes,
            ));
        }
        members
    }

    fn previous_ordinal(&self, name: &str) -> Option<i64> {
        self.previous?
            .by_name
            .get(name)
            .filter(|member| !member.is_persisted())
            .and_then(|member| member.ordinal().as_int())
    }
}
