//! Enum models — the handle an application holds for one enum type.
//!
//! An [`EnumModel`] binds a type name to its table, its declaration options
//! and the store, and owns the slot holding the type's current
//! [`EnumState`]. Declaring the model fills the slot; reinitializing swaps
//! in a freshly built state. Once initialized, the model refuses to create,
//! update or destroy rows of its table.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, RwLock};

use rowenum_store::{Attributes, Ordinal, Row, RowStore};
use tracing::{info, warn};

use crate::declare::RequiredSpec;
use crate::error::{EnumError, EnumResult};
use crate::materialize::Materializer;
use crate::member::Member;
use crate::options::EnumOptions;
use crate::registry::EnumRegistry;
use crate::state::EnumState;

/// Handle for one persisted enum type.
pub struct EnumModel {
    type_name: String,
    table: String,
    options: EnumOptions,
    store: Arc<dyn RowStore>,
    state: RwLock<Option<Arc<EnumState>>>,
}

impl fmt::Debug for EnumModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumModel")
            .field("type_name", &self.type_name)
            .field("table", &self.table)
            .field("options", &self.options)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl EnumModel {
    /// A model for `type_name` backed by `table`, with default options.
    pub fn new(
        type_name: impl Into<String>,
        table: impl Into<String>,
        store: Arc<dyn RowStore>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            table: table.into(),
            options: EnumOptions::default(),
            store,
            state: RwLock::new(None),
        }
    }

    pub fn with_options(mut self, options: EnumOptions) -> Self {
        self.options = options;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn options(&self) -> &EnumOptions {
        &self.options
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().expect("enum state lock").is_some()
    }

    /// Current frozen state.
    pub fn snapshot(&self) -> EnumResult<Arc<EnumState>> {
        self.state
            .read()
            .expect("enum state lock")
            .clone()
            .ok_or_else(|| EnumError::NotInitialized(self.type_name.clone()))
    }

    /// Declare the required members of this type and build its state.
    ///
    /// Callable again to change the declaration. The first successful
    /// declaration records the model in `registry`.
    pub fn declare(
        self: &Arc<Self>,
        registry: &EnumRegistry,
        required: impl Into<RequiredSpec>,
    ) -> EnumResult<Arc<EnumState>> {
        let (state, first) = self.initialize(required.into())?;
        if first {
            registry.register(Arc::clone(self));
        }
        Ok(state)
    }

    /// Rebuild the state from the store using the current required members,
    /// picking up rows that changed since the last initialization.
    pub fn reinitialize(&self) -> EnumResult<Arc<EnumState>> {
        let current = self.snapshot()?;
        let (state, _) = self.initialize(current.required_spec().clone())?;
        Ok(state)
    }

    /// Build and install a new state for `required`. Also reports whether
    /// this was the first state installed.
    fn initialize(&self, required: RequiredSpec) -> EnumResult<(Arc<EnumState>, bool)> {
        if self.store.in_transaction() {
            return Err(EnumError::UnsafeInitialization {
                type_name: self.type_name.clone(),
            });
        }

        let store = self.store.as_ref();
        let previous = self.state.read().expect("enum state lock").clone();
        let mut members = Materializer::new(store, &self.type_name, &self.table, &self.options)
            .with_previous(previous.as_deref())
            .materialize(&required)?;
        let materialized = members.len();

        if store.table_exists(&self.table)? {
            let known: BTreeSet<Ordinal> = members.iter().map(|m| m.ordinal().clone()).collect();
            for row in store.find_excluding(&self.table, &known)? {
                match Member::from_row(&self.type_name, row, &self.options.name_attr) {
                    Ok(member) => members.push(member),
                    Err(row) => warn!(
                        type_name = %self.type_name,
                        table = %self.table,
                        ordinal = %row.id,
                        name_attr = %self.options.name_attr,
                        "row has no name, ignoring"
                    ),
                }
            }
        }
        let legacy = members.len() - materialized;

        let state = Arc::new(EnumState::build(
            &self.type_name,
            required,
            self.options.clone(),
            members,
            previous.as_deref(),
        ));
        let first = {
            let mut slot = self.state.write().expect("enum state lock");
            slot.replace(Arc::clone(&state)).is_none()
        };

        info!(
            type_name = %self.type_name,
            table = %self.table,
            required = materialized,
            legacy,
            reinitialized = !first,
            "enum initialized"
        );
        Ok((state, first))
    }

    // ── Row writes ─────────────────────────────────────────────────

    /// Insert a row into this type's table. Refused once initialized.
    pub fn create_row(&self, values: Attributes) -> EnumResult<Row> {
        self.ensure_writable("create")?;
        Ok(self.store.insert(&self.table, None, values)?)
    }

    /// Update a row of this type's table. Refused once initialized.
    pub fn update_row(&self, row: &Row) -> EnumResult<()> {
        self.ensure_writable("update")?;
        Ok(self.store.update(&self.table, row)?)
    }

    /// Delete a row of this type's table. Refused once initialized.
    pub fn destroy_row(&self, ordinal: &Ordinal) -> EnumResult<bool> {
        self.ensure_writable("destroy")?;
        Ok(self.store.delete(&self.table, ordinal)?)
    }

    fn ensure_writable(&self, operation: &'static str) -> EnumResult<()> {
        if self.is_initialized() {
            Err(EnumError::ReadOnlyRecord {
                type_name: self.type_name.clone(),
                operation,
            })
        } else {
            Ok(())
        }
    }
}
