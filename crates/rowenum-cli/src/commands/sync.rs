use std::sync::Arc;

use rowenum::EnumRegistry;

pub fn sync(config_path: &str) -> anyhow::Result<()> {
    let (config, store) = super::open(config_path)?;
    let registry = EnumRegistry::new();

    for decl in &config.enums {
        let model = Arc::new(decl.model(Arc::clone(&store)));
        let state = model.declare(&registry, decl.required_spec())?;
        println!(
            "✓ {} ({}): {} active, {} total",
            decl.type_name,
            decl.table,
            state.values().len(),
            state.len()
        );
    }

    println!("{} enum type(s) synced", registry.len());
    Ok(())
}
