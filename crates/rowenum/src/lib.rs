//! rowenum — persisted enumerations.
//!
//! Treats selected rows of a table as constants: each enum type declares
//! the member names it requires, rowenum makes sure those rows exist,
//! loads any other rows already in the table as inactive legacy members,
//! and freezes everything into an [`EnumState`] indexed by name and by
//! ordinal (the primary key).
//!
//! ```ignore
//! let store: Arc<dyn RowStore> = Arc::new(RedbRowStore::open_in_memory()?);
//! let registry = EnumRegistry::new();
//! let colors = Arc::new(EnumModel::new("Color", "colors", store));
//! colors.declare(
//!     &registry,
//!     EnumBuilder::new()
//!         .member("Red")
//!         .member_with("Green", [("hex", "#0f0")])
//!         .build(),
//! )?;
//! let green = colors.by_name_required("Green")?;
//! assert!(colors.is_active(&green)?);
//! ```
//!
//! States are replaced, never mutated: reinitializing builds a new state
//! and keeps the previous `Arc<Member>` for every row whose content did
//! not change.

pub mod config;
pub mod constant;
pub mod declare;
pub mod error;
pub mod lookup;
pub mod materialize;
pub mod member;
pub mod model;
pub mod options;
pub mod registry;
pub mod state;

pub use config::{EnumDecl, MemberDecl, RowenumConfig};
pub use constant::constant_identifier;
pub use declare::{EnumBuilder, RequiredSpec};
pub use error::{EnumError, EnumResult};
pub use materialize::Materializer;
pub use member::Member;
pub use model::EnumModel;
pub use options::EnumOptions;
pub use registry::EnumRegistry;
pub use rowenum_store::{Attributes, Ordinal, RedbRowStore, RowStore};
pub use state::EnumState;
