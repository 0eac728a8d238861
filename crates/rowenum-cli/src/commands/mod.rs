pub mod list;
pub mod sync;

use std::path::Path;
use std::sync::Arc;

use rowenum::RowenumConfig;
use rowenum_store::{RedbRowStore, RowStore};

/// Load the config and open its store, creating declared tables that don't
/// exist yet. A relative store path is resolved against the config's
/// directory.
pub fn open(config_path: &str) -> anyhow::Result<(RowenumConfig, Arc<dyn RowStore>)> {
    let config_path = Path::new(config_path);
    let config = RowenumConfig::from_file(config_path)?;
    let store_path = match config_path.parent() {
        Some(dir) if config.store.path.is_relative() => dir.join(&config.store.path),
        _ => config.store.path.clone(),
    };
    let store = RedbRowStore::open(&store_path)?;
    for schema in &config.tables {
        if !store.table_exists(&schema.name)? {
            store.create_table(schema)?;
            tracing::info!(table = %schema.name, "table created");
        }
    }
    Ok((config, Arc::new(store)))
}
