//! Row stores — the persistence surface rowenum reads and writes through.
//!
//! [`RowStore`] is the query surface the enum initializer consumes.
//! [`RedbRowStore`] implements it over redb, JSON-serializing each row into
//! a per-table `&[u8]` value column. The store supports both on-disk and
//! in-memory backends (the latter for testing).

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use redb::{Database, ReadableDatabase, ReadableTable, TableError};
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Query surface over typed rows with an ordinal primary key.
pub trait RowStore: Send + Sync {
    /// Create a table. Creating an existing table replaces its schema and
    /// keeps its rows.
    fn create_table(&self, schema: &TableSchema) -> StoreResult<()>;

    fn table_exists(&self, table: &str) -> StoreResult<bool>;

    /// Non-key columns of `table`.
    fn columns(&self, table: &str) -> StoreResult<Vec<ColumnDef>>;

    /// Insert a row. Integer keys are assigned when `id` is `None`; column
    /// defaults and nulls are filled in from the schema.
    fn insert(&self, table: &str, id: Option<Ordinal>, values: Attributes) -> StoreResult<Row>;

    /// Replace the values of an existing row.
    fn update(&self, table: &str, row: &Row) -> StoreResult<()>;

    /// Delete a row by key. Returns true if it existed.
    fn delete(&self, table: &str, id: &Ordinal) -> StoreResult<bool>;

    /// First row (in key order) whose `column` equals `value`.
    fn find_by(&self, table: &str, column: &str, value: &Value) -> StoreResult<Option<Row>>;

    /// Every row whose key is not in `ids`, in key order.
    fn find_excluding(&self, table: &str, ids: &BTreeSet<Ordinal>) -> StoreResult<Vec<Row>>;

    /// Values of `column` for every row, in key order. `"id"` plucks the keys.
    fn pluck(&self, table: &str, column: &str) -> StoreResult<Vec<Value>>;

    /// Whether an application-level transaction is currently open.
    fn in_transaction(&self) -> bool {
        false
    }
}

/// Marks an open application-level transaction on a [`RedbRowStore`].
///
/// The mark is cleared when the guard is dropped.
#[derive(Debug)]
pub struct TransactionGuard {
    open: Arc<AtomicUsize>,
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Thread-safe row store backed by redb.
#[derive(Clone)]
pub struct RedbRowStore {
    db: Arc<Database>,
    open_transactions: Arc<AtomicUsize>,
}

impl RedbRowStore {
    /// Open (or create) a persistent row store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self::with_database(db);
        store.ensure_tables()?;
        debug!(?path, "row store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory row store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self::with_database(db);
        store.ensure_tables()?;
        debug!("in-memory row store opened");
        Ok(store)
    }

    fn with_database(db: Database) -> Self {
        Self {
            db: Arc::new(db),
            open_transactions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mark an application-level transaction as open until the guard drops.
    pub fn begin_transaction(&self) -> TransactionGuard {
        self.open_transactions.fetch_add(1, Ordering::SeqCst);
        TransactionGuard {
            open: Arc::clone(&self.open_transactions),
        }
    }

    /// Create the schema table if it doesn't exist yet.
    fn ensure_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(SCHEMAS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn load_schema(&self, table: &str) -> StoreResult<Option<TableSchema>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let schemas = txn.open_table(SCHEMAS).map_err(map_err!(Table))?;
        match schemas.get(table).map_err(map_err!(Read))? {
            Some(guard) => {
                let schema: TableSchema =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(schema))
            }
            None => Ok(None),
        }
    }

    fn require_schema(&self, table: &str) -> StoreResult<TableSchema> {
        self.load_schema(table)?
            .ok_or_else(|| StoreError::NoSuchTable(table.to_string()))
    }

    /// Every row of `table`, in key order.
    fn load_rows(&self, table: &str) -> StoreResult<Vec<Row>> {
        let name = rows_table_name(table);
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let rows = match txn.open_table(rows_table(&name)) {
            Ok(rows) => rows,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Table(e.to_string())),
        };
        let mut results = Vec::new();
        for entry in rows.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let row: Row = serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(row);
        }
        results.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(results)
    }
}

/// Validate `values` against `schema`, filling defaults and nulls.
fn apply_schema(schema: &TableSchema, mut values: Attributes) -> StoreResult<Attributes> {
    if let Some(column) = values.keys().find(|k| schema.column_def(k).is_none()) {
        return Err(StoreError::UnknownColumn {
            table: schema.name.clone(),
            column: column.clone(),
        });
    }

    let mut missing = Vec::new();
    for column in &schema.columns {
        match values.get(&column.name) {
            Some(Value::Null) => {}
            Some(_) => continue,
            None => {
                if let Some(default) = &column.default {
                    values.insert(column.name.clone(), default.clone());
                    continue;
                }
            }
        }
        if column.nullable {
            values.entry(column.name.clone()).or_insert(Value::Null);
        } else {
            missing.push(column.name.as_str());
        }
    }

    if missing.is_empty() {
        Ok(values)
    } else {
        Err(StoreError::Constraint {
            table: schema.name.clone(),
            message: format!("null value in non-nullable column(s): {}", missing.join(", ")),
        })
    }
}

/// Reject keys whose kind doesn't match the table's primary key.
fn check_key_kind(schema: &TableSchema, id: &Ordinal) -> StoreResult<()> {
    let matches = matches!(
        (&schema.primary_key, id),
        (PrimaryKey::Integer, Ordinal::Int(_)) | (PrimaryKey::SqlEnum { .. }, Ordinal::Label(_))
    );
    if matches {
        Ok(())
    } else {
        Err(StoreError::Constraint {
            table: schema.name.clone(),
            message: format!("primary key {id} does not match key type {:?}", schema.primary_key),
        })
    }
}

impl RowStore for RedbRowStore {
    fn create_table(&self, schema: &TableSchema) -> StoreResult<()> {
        let value = serde_json::to_vec(schema).map_err(map_err!(Serialize))?;
        let name = rows_table_name(&schema.name);
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut schemas = txn.open_table(SCHEMAS).map_err(map_err!(Table))?;
            schemas
                .insert(schema.name.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
            txn.open_table(rows_table(&name)).map_err(map_err!(Table))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(table = %schema.name, columns = schema.columns.len(), "table created");
        Ok(())
    }

    fn table_exists(&self, table: &str) -> StoreResult<bool> {
        Ok(self.load_schema(table)?.is_some())
    }

    fn columns(&self, table: &str) -> StoreResult<Vec<ColumnDef>> {
        Ok(self.require_schema(table)?.columns)
    }

    fn insert(&self, table: &str, id: Option<Ordinal>, values: Attributes) -> StoreResult<Row> {
        let schema = self.require_schema(table)?;
        let values = apply_schema(&schema, values)?;
        let name = rows_table_name(table);
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let row;
        {
            let mut rows = txn.open_table(rows_table(&name)).map_err(map_err!(Table))?;
            let id = match (id, &schema.primary_key) {
                (Some(id), _) => id,
                (None, PrimaryKey::Integer) => {
                    let mut max = 0;
                    for entry in rows.iter().map_err(map_err!(Read))? {
                        let (key, _) = entry.map_err(map_err!(Read))?;
                        if let Ok(id) = key.value().parse::<i64>() {
                            max = max.max(id);
                        }
                    }
                    Ordinal::Int(max + 1)
                }
                (None, PrimaryKey::SqlEnum { type_name }) => {
                    return Err(StoreError::Constraint {
                        table: table.to_string(),
                        message: format!("primary key of enum type {type_name} must be supplied"),
                    });
                }
            };
            check_key_kind(&schema, &id)?;

            let key = id.table_key();
            if rows.get(key.as_str()).map_err(map_err!(Read))?.is_some() {
                return Err(StoreError::DuplicateKey {
                    table: table.to_string(),
                    id: key,
                });
            }
            row = Row { id, values };
            let value = serde_json::to_vec(&row).map_err(map_err!(Serialize))?;
            rows.insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%table, id = %row.id, "row inserted");
        Ok(row)
    }

    fn update(&self, table: &str, row: &Row) -> StoreResult<()> {
        let schema = self.require_schema(table)?;
        let values = apply_schema(&schema, row.values.clone())?;
        let row = Row {
            id: row.id.clone(),
            values,
        };
        let key = row.id.table_key();
        let value = serde_json::to_vec(&row).map_err(map_err!(Serialize))?;
        let name = rows_table_name(table);
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut rows = txn.open_table(rows_table(&name)).map_err(map_err!(Table))?;
            if rows.get(key.as_str()).map_err(map_err!(Read))?.is_none() {
                return Err(StoreError::NotFound(format!("{table}/{key}")));
            }
            rows.insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%table, %key, "row updated");
        Ok(())
    }

    fn delete(&self, table: &str, id: &Ordinal) -> StoreResult<bool> {
        self.require_schema(table)?;
        let key = id.table_key();
        let name = rows_table_name(table);
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut rows = txn.open_table(rows_table(&name)).map_err(map_err!(Table))?;
            existed = rows.remove(key.as_str()).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%table, %key, existed, "row deleted");
        Ok(existed)
    }

    fn find_by(&self, table: &str, column: &str, value: &Value) -> StoreResult<Option<Row>> {
        let schema = self.require_schema(table)?;
        if schema.column_def(column).is_none() {
            return Err(StoreError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        Ok(self
            .load_rows(table)?
            .into_iter()
            .find(|row| row.get(column) == Some(value)))
    }

    fn find_excluding(&self, table: &str, ids: &BTreeSet<Ordinal>) -> StoreResult<Vec<Row>> {
        self.require_schema(table)?;
        Ok(self
            .load_rows(table)?
            .into_iter()
            .filter(|row| !ids.contains(&row.id))
            .collect())
    }

    fn pluck(&self, table: &str, column: &str) -> StoreResult<Vec<Value>> {
        let schema = self.require_schema(table)?;
        let rows = self.load_rows(table)?;
        if column == "id" {
            return rows
                .into_iter()
                .map(|row| serde_json::to_value(row.id).map_err(map_err!(Serialize)))
                .collect();
        }
        if schema.column_def(column).is_none() {
            return Err(StoreError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        Ok(rows
            .into_iter()
            .map(|row| row.get(column).cloned().unwrap_or(Value::Null))
            .collect())
    }

    fn in_transaction(&self) -> bool {
        self.open_transactions.load(Ordering::SeqCst) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn colors_schema() -> TableSchema {
        TableSchema::new("colors")
            .column(ColumnDef::new("name"))
            .column(ColumnDef::new("hex").nullable())
            .column(ColumnDef::new("weight").with_default(1))
    }

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn store_with_colors() -> RedbRowStore {
        let store = RedbRowStore::open_in_memory().unwrap();
        store.create_table(&colors_schema()).unwrap();
        store
    }

    // ── Tables ─────────────────────────────────────────────────────

    #[test]
    fn table_exists_after_create() {
        let store = RedbRowStore::open_in_memory().unwrap();
        assert!(!store.table_exists("colors").unwrap());

        store.create_table(&colors_schema()).unwrap();
        assert!(store.table_exists("colors").unwrap());
        assert_eq!(store.columns("colors").unwrap().len(), 3);
    }

    #[test]
    fn operations_on_missing_table_fail() {
        let store = RedbRowStore::open_in_memory().unwrap();
        assert!(matches!(
            store.columns("nope"),
            Err(StoreError::NoSuchTable(t)) if t == "nope"
        ));
        assert!(matches!(
            store.insert("nope", None, Attributes::new()),
            Err(StoreError::NoSuchTable(_))
        ));
    }

    // ── Insert ─────────────────────────────────────────────────────

    #[test]
    fn insert_assigns_sequential_ids() {
        let store = store_with_colors();
        let red = store.insert("colors", None, attrs(json!({"name": "Red"}))).unwrap();
        let green = store.insert("colors", None, attrs(json!({"name": "Green"}))).unwrap();

        assert_eq!(red.id, Ordinal::Int(1));
        assert_eq!(green.id, Ordinal::Int(2));
    }

    #[test]
    fn insert_continues_above_explicit_ids() {
        let store = store_with_colors();
        store
            .insert("colors", Some(Ordinal::Int(9999)), attrs(json!({"name": "Hello"})))
            .unwrap();
        let next = store.insert("colors", None, attrs(json!({"name": "One"}))).unwrap();
        assert_eq!(next.id, Ordinal::Int(10000));
    }

    #[test]
    fn insert_fills_defaults_and_nulls() {
        let store = store_with_colors();
        let row = store.insert("colors", None, attrs(json!({"name": "Red"}))).unwrap();

        assert_eq!(row.get("weight"), Some(&json!(1)));
        assert_eq!(row.get("hex"), Some(&Value::Null));
    }

    #[test]
    fn insert_rejects_missing_required_column() {
        let store = store_with_colors();
        let err = store.insert("colors", None, Attributes::new()).unwrap_err();
        match err {
            StoreError::Constraint { message, .. } => assert!(message.contains("name")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn insert_rejects_unknown_column() {
        let store = store_with_colors();
        let err = store
            .insert("colors", None, attrs(json!({"name": "Red", "shade": 3})))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { column, .. } if column == "shade"));
    }

    #[test]
    fn insert_rejects_duplicate_key() {
        let store = store_with_colors();
        store
            .insert("colors", Some(Ordinal::Int(5)), attrs(json!({"name": "Red"})))
            .unwrap();
        let err = store
            .insert("colors", Some(Ordinal::Int(5)), attrs(json!({"name": "Blue"})))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[test]
    fn sql_enum_table_requires_label_keys() {
        let store = RedbRowStore::open_in_memory().unwrap();
        store
            .create_table(
                &TableSchema::new("moods")
                    .with_primary_key(PrimaryKey::SqlEnum {
                        type_name: "public.mood".to_string(),
                    })
                    .column(ColumnDef::new("name")),
            )
            .unwrap();

        assert!(matches!(
            store.insert("moods", None, attrs(json!({"name": "happy"}))),
            Err(StoreError::Constraint { .. })
        ));
        assert!(matches!(
            store.insert("moods", Some(Ordinal::Int(1)), attrs(json!({"name": "happy"}))),
            Err(StoreError::Constraint { .. })
        ));
        let row = store
            .insert("moods", Some(Ordinal::from("happy")), attrs(json!({"name": "happy"})))
            .unwrap();
        assert_eq!(row.id, Ordinal::from("happy"));
    }

    // ── Queries ────────────────────────────────────────────────────

    #[test]
    fn find_by_matches_exact_value() {
        let store = store_with_colors();
        store.insert("colors", None, attrs(json!({"name": "Red"}))).unwrap();

        assert!(store.find_by("colors", "name", &json!("Red")).unwrap().is_some());
        assert!(store.find_by("colors", "name", &json!("red")).unwrap().is_none());
        assert!(matches!(
            store.find_by("colors", "shade", &json!(1)),
            Err(StoreError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn find_excluding_skips_listed_ids() {
        let store = store_with_colors();
        for name in ["Red", "Green", "Blue"] {
            store.insert("colors", None, attrs(json!({ "name": name }))).unwrap();
        }
        let skip: BTreeSet<Ordinal> = [Ordinal::Int(1), Ordinal::Int(3)].into();
        let rest = store.find_excluding("colors", &skip).unwrap();

        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].get("name"), Some(&json!("Green")));
    }

    #[test]
    fn pluck_returns_values_in_key_order() {
        let store = store_with_colors();
        store
            .insert("colors", Some(Ordinal::Int(10)), attrs(json!({"name": "Ten"})))
            .unwrap();
        store
            .insert("colors", Some(Ordinal::Int(2)), attrs(json!({"name": "Two"})))
            .unwrap();

        assert_eq!(
            store.pluck("colors", "name").unwrap(),
            vec![json!("Two"), json!("Ten")]
        );
        assert_eq!(store.pluck("colors", "id").unwrap(), vec![json!(2), json!(10)]);
    }

    // ── Update / delete ────────────────────────────────────────────

    #[test]
    fn update_replaces_values() {
        let store = store_with_colors();
        let mut row = store.insert("colors", None, attrs(json!({"name": "Red"}))).unwrap();
        row.values.insert("hex".to_string(), json!("#f00"));
        store.update("colors", &row).unwrap();

        let found = store.find_by("colors", "name", &json!("Red")).unwrap().unwrap();
        assert_eq!(found.get("hex"), Some(&json!("#f00")));
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let store = store_with_colors();
        let row = Row {
            id: Ordinal::Int(42),
            values: attrs(json!({"name": "Ghost"})),
        };
        assert!(matches!(store.update("colors", &row), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn delete_reports_existence() {
        let store = store_with_colors();
        let row = store.insert("colors", None, attrs(json!({"name": "Red"}))).unwrap();

        assert!(store.delete("colors", &row.id).unwrap());
        assert!(!store.delete("colors", &row.id).unwrap());
        assert!(store.find_by("colors", "name", &json!("Red")).unwrap().is_none());
    }

    // ── Transactions ───────────────────────────────────────────────

    #[test]
    fn transaction_guard_marks_store() {
        let store = RedbRowStore::open_in_memory().unwrap();
        assert!(!store.in_transaction());
        {
            let _outer = store.begin_transaction();
            let _inner = store.begin_transaction();
            assert!(store.in_transaction());
        }
        assert!(!store.in_transaction());
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = RedbRowStore::open(&db_path).unwrap();
            store.create_table(&colors_schema()).unwrap();
            store.insert("colors", None, attrs(json!({"name": "Red"}))).unwrap();
        }

        // Reopen the same database file.
        let store = RedbRowStore::open(&db_path).unwrap();
        assert!(store.table_exists("colors").unwrap());
        let row = store.find_by("colors", "name", &json!("Red")).unwrap();
        assert_eq!(row.map(|r| r.id), Some(Ordinal::Int(1)));
    }
}
