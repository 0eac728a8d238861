//! redb table definitions for the row store.
//!
//! Schemas use `&str` keys and `&[u8]` values (JSON-serialized
//! [`TableSchema`](crate::types::TableSchema)). Row tables are created on
//! demand, one per declared table, keyed by the rendered ordinal.

use redb::TableDefinition;

/// Table schemas keyed by `{table}`.
pub const SCHEMAS: TableDefinition<&str, &[u8]> = TableDefinition::new("schemas");

/// Name of the redb table that holds the rows of `table`.
pub fn rows_table_name(table: &str) -> String {
    format!("rows:{table}")
}

/// Definition of the redb table that holds the rows of `table`.
///
/// The returned definition borrows `name`, which should come from
/// [`rows_table_name`].
pub fn rows_table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}
