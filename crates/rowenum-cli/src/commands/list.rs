use std::collections::HashMap;
use std::sync::Arc;

use rowenum::{EnumRegistry, EnumState, Ordinal};
use serde_json::json;

pub fn list(config_path: &str, type_name: &str, all: bool, format: &str) -> anyhow::Result<()> {
    let (config, store) = super::open(config_path)?;
    let decl = config
        .enum_decl(type_name)
        .ok_or_else(|| anyhow::anyhow!("no enum named {type_name} in {config_path}"))?;

    let model = Arc::new(decl.model(store));
    let state = model.declare(&EnumRegistry::new(), decl.required_spec())?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&to_json(&state, all))?),
        _ => print!("{}", format_table(&state, all)),
    }
    Ok(())
}

/// Constant identifier exposed for each member, by ordinal. Legacy members
/// and members that lost a name collision have none.
fn exposed_constants(state: &EnumState) -> HashMap<&Ordinal, &str> {
    state
        .constants()
        .map(|(ident, member)| (member.ordinal(), ident))
        .collect()
}

fn to_json(state: &EnumState, all: bool) -> serde_json::Value {
    let constants = exposed_constants(state);
    let members: Vec<_> = state
        .all_values()
        .filter(|member| all || state.is_active(member))
        .map(|member| {
            json!({
                "ordinal": member.ordinal(),
                "name": member.name(),
                "active": state.is_active(member),
                "constant": constants.get(member.ordinal()),
                "attributes": member.attributes(),
            })
        })
        .collect();
    json!({ "type": state.type_name(), "members": members })
}

fn format_table(state: &EnumState, all: bool) -> String {
    let constants = exposed_constants(state);
    let mut out = String::new();
    for member in state.all_values() {
        let active = state.is_active(member);
        if !all && !active {
            continue;
        }
        let marker = if active { " " } else { "-" };
        out.push_str(&format!(
            "{marker} {:>6}  {:<24} {}\n",
            member.ordinal().to_string(),
            member.name(),
            constants.get(member.ordinal()).copied().unwrap_or_default()
        ));
    }
    out
}
