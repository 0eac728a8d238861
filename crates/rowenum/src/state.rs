//! Enum state — the frozen index of one enum type's members.
//!
//! Built once per (re)initialization and never mutated afterwards:
//!
//! - `by_name` and `by_ordinal` index every member, legacy rows included;
//! - `required_by_ordinal` indexes the required (active) subset;
//! - `constants` maps constant identifiers to required members.
//!
//! States are shared as `Arc<EnumState>`; readers need no locking.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rowenum_store::Ordinal;
use tracing::{debug, warn};

use crate::constant;
use crate::declare::RequiredSpec;
use crate::member::Member;
use crate::options::EnumOptions;

#[derive(Debug)]
pub struct EnumState {
    pub(crate) type_name: String,
    pub(crate) required: RequiredSpec,
    pub(crate) options: EnumOptions,
    pub(crate) by_name: HashMap<String, Arc<Member>>,
    pub(crate) by_ordinal: BTreeMap<Ordinal, Arc<Member>>,
    pub(crate) required_by_ordinal: BTreeMap<Ordinal, Arc<Member>>,
    pub(crate) constants: BTreeMap<String, Arc<Member>>,
    /// Highest integer ordinal any state of this type has held so far.
    pub(crate) high_water: i64,
}

impl EnumState {
    /// Index `members` (required members first, then legacy rows).
    ///
    /// Every member equal to the `previous` state's member of the same name
    /// is replaced by that earlier `Arc`, so references handed out before
    /// the refresh stay identical when nothing changed.
    pub(crate) fn build(
        type_name: &str,
        required: RequiredSpec,
        options: EnumOptions,
        members: Vec<Member>,
        previous: Option<&EnumState>,
    ) -> Self {
        let mut by_name: HashMap<String, Arc<Member>> = HashMap::with_capacity(members.len());
        let mut by_ordinal = BTreeMap::new();
        let mut reused = 0usize;

        for member in members {
            if let Some(existing) = by_name.get(member.name()) {
                warn!(
                    type_name,
                    name = %member.name(),
                    kept = %existing.ordinal(),
                    skipped = %member.ordinal(),
                    "duplicate member name, ignoring row"
                );
                continue;
            }
            let member = match previous.and_then(|p| p.by_name.get(member.name())) {
                Some(old) if **old == member => {
                    reused += 1;
                    Arc::clone(old)
                }
                _ => Arc::new(member),
            };
            by_ordinal.insert(member.ordinal().clone(), Arc::clone(&member));
            by_name.insert(member.name().to_string(), member);
        }

        let required_by_ordinal = required
            .names()
            .filter_map(|name| by_name.get(name))
            .map(|member| (member.ordinal().clone(), Arc::clone(member)))
            .collect();
        let constants = constant::expose(type_name, &required, &by_name);
        let high_water = by_ordinal
            .keys()
            .filter_map(Ordinal::as_int)
            .chain(previous.map(|p| p.high_water))
            .max()
            .unwrap_or(0);

        debug!(
            type_name,
            members = by_name.len(),
            reused,
            "enum state built"
        );

        Self {
            type_name: type_name.to_string(),
            required,
            options,
            by_name,
            by_ordinal,
            required_by_ordinal,
            constants,
            high_water,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Required members this state was built from.
    pub fn required_spec(&self) -> &RequiredSpec {
        &self.required
    }

    pub fn options(&self) -> &EnumOptions {
        &self.options
    }

    pub fn name_attr(&self) -> &str {
        &self.options.name_attr
    }

    /// Number of members, legacy rows included.
    pub fn len(&self) -> usize {
        self.by_ordinal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ordinal.is_empty()
    }
}
