//! rowenum-store — the row store consumed by rowenum.
//!
//! Backed by [redb](https://docs.rs/redb), provides typed rows with an
//! ordinal primary key, column introspection and the handful of queries
//! the enum initializer needs (find by column, find excluding a key set,
//! pluck a column).
//!
//! # Architecture
//!
//! Table schemas live in a single `schemas` table keyed by table name.
//! Each declared table gets its own redb table named `rows:{table}` whose
//! keys are the rendered ordinal and whose values are JSON-serialized
//! [`Row`]s.
//!
//! The `RedbRowStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<Database>`) and can be shared across threads.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use store::{RedbRowStore, RowStore, TransactionGuard};
pub use types::*;
