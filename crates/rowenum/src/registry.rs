//! Enum registry — every enum type declared by the application.
//!
//! The registry is an ordinary value created at startup and passed to the
//! code that declares enums or refreshes them. A single mutex guards it and
//! is held for the whole of every operation, so a bulk refresh never
//! interleaves with registration or with another refresh.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::error::{EnumError, EnumResult};
use crate::model::EnumModel;

/// Registered enum types, keyed by type name.
#[derive(Debug, Default)]
pub struct EnumRegistry {
    types: Mutex<BTreeMap<String, Arc<EnumModel>>>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `model` under its type name, replacing any earlier entry.
    pub fn register(&self, model: Arc<EnumModel>) {
        let mut types = self.types.lock().expect("enum registry lock");
        let type_name = model.type_name().to_string();
        let replaced = types.insert(type_name.clone(), model).is_some();
        debug!(%type_name, replaced, "enum type registered");
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<EnumModel>> {
        self.types
            .lock()
            .expect("enum registry lock")
            .get(type_name)
            .cloned()
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.types
            .lock()
            .expect("enum registry lock")
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.types.lock().expect("enum registry lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reinitialize every registered type from the store, e.g. after test
    /// fixtures reloaded the tables. Stops at the first failure.
    pub fn reinitialize_all(&self) -> EnumResult<()> {
        let types = self.types.lock().expect("enum registry lock");
        for model in types.values() {
            model.reinitialize()?;
        }
        info!(count = types.len(), "enum types reinitialized");
        Ok(())
    }

    /// Re-resolve every registered name to a live model, e.g. after the
    /// application reloaded its type definitions.
    ///
    /// The registry is only replaced when every name resolves; otherwise it
    /// is left untouched and [`EnumError::UnresolvedType`] names the first
    /// missing type. `resolve` runs under the registry lock and must not
    /// call back into this registry.
    pub fn re_resolve_all<F>(&self, mut resolve: F) -> EnumResult<()>
    where
        F: FnMut(&str) -> Option<Arc<EnumModel>>,
    {
        let mut types = self.types.lock().expect("enum registry lock");
        let mut resolved = BTreeMap::new();
        for type_name in types.keys() {
            let model = resolve(type_name.as_str())
                .ok_or_else(|| EnumError::UnresolvedType(type_name.clone()))?;
            resolved.insert(type_name.clone(), model);
        }
        *types = resolved;
        info!(count = types.len(), "enum types re-resolved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::RequiredSpec;
    use rowenum_store::{RedbRowStore, RowStore};

    fn model(type_name: &str, store: &Arc<dyn RowStore>) -> Arc<EnumModel> {
        Arc::new(EnumModel::new(type_name, type_name.to_lowercase(), Arc::clone(store)))
    }

    fn store() -> Arc<dyn RowStore> {
        Arc::new(RedbRowStore::open_in_memory().unwrap())
    }

    #[test]
    fn register_is_idempotent() {
        let store = store();
        let registry = EnumRegistry::new();
        let color = model("Color", &store);

        registry.register(Arc::clone(&color));
        registry.register(Arc::clone(&color));

        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get("Color").unwrap(), &color));
        assert!(registry.get("Shape").is_none());
    }

    #[test]
    fn register_overwrites_by_name() {
        let store = store();
        let registry = EnumRegistry::new();
        let old = model("Color", &store);
        let new = model("Color", &store);

        registry.register(old);
        registry.register(Arc::clone(&new));

        assert!(Arc::ptr_eq(&registry.get("Color").unwrap(), &new));
    }

    #[test]
    fn reinitialize_all_fails_on_undeclared_model() {
        let store = store();
        let registry = EnumRegistry::new();
        registry.register(model("Color", &store));

        assert!(matches!(
            registry.reinitialize_all(),
            Err(EnumError::NotInitialized(t)) if t == "Color"
        ));
    }

    #[test]
    fn re_resolve_all_swaps_handles() {
        let store = store();
        let registry = EnumRegistry::new();
        let color = model("Color", &store);
        color.declare(&registry, RequiredSpec::from_names(["Red"])).unwrap();

        let reloaded = model("Color", &store);
        let handle = Arc::clone(&reloaded);
        registry
            .re_resolve_all(|name| (name == "Color").then(|| Arc::clone(&handle)))
            .unwrap();

        assert!(Arc::ptr_eq(&registry.get("Color").unwrap(), &reloaded));
    }

    #[test]
    fn re_resolve_all_keeps_registry_on_failure() {
        let store = store();
        let registry = EnumRegistry::new();
        let color = model("Color", &store);
        let shape = model("Shape", &store);
        registry.register(Arc::clone(&color));
        registry.register(shape);

        let err = registry
            .re_resolve_all(|name| (name == "Color").then(|| model("Color", &store)))
            .unwrap_err();

        assert!(matches!(err, EnumError::UnresolvedType(ref t) if t == "Shape"));
        assert!(Arc::ptr_eq(&registry.get("Color").unwrap(), &color));
        assert_eq!(registry.names(), vec!["Color".to_string(), "Shape".to_string()]);
    }
}
