//! Constant identifiers for enum members.
//!
//! Every required member is also reachable through an upper-case
//! identifier derived from its name, so `"with.punctuation"` can be used
//! as `WITH_PUNCTUATION`. The stored name is never changed.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::warn;

use crate::declare::RequiredSpec;
use crate::member::Member;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("constant separator pattern"));

/// Normalize a member name into a constant identifier.
///
/// Upper-cases the name, collapses every run of non-alphanumeric
/// characters into one underscore and trims underscores at both ends.
pub fn constant_identifier(name: &str) -> String {
    let upper = name.to_uppercase();
    NON_ALNUM
        .replace_all(&upper, "_")
        .trim_matches('_')
        .to_string()
}

/// Constant table for the required members of a state.
///
/// Names that normalize to nothing get no constant. When two names share
/// an identifier the later declaration wins.
pub(crate) fn expose(
    type_name: &str,
    required: &RequiredSpec,
    by_name: &HashMap<String, Arc<Member>>,
) -> BTreeMap<String, Arc<Member>> {
    let mut constants = BTreeMap::new();
    for name in required.names() {
        let Some(member) = by_name.get(name) else {
            continue;
        };
        let ident = constant_identifier(name);
        if ident.is_empty() {
            warn!(type_name, %name, "member name has no constant identifier");
            continue;
        }
        if let Some(previous) = constants.insert(ident.clone(), Arc::clone(member)) {
            warn!(
                type_name,
                constant = %ident,
                previous = %previous.name(),
                %name,
                "constant identifier redefined"
            );
        }
    }
    constants
}
