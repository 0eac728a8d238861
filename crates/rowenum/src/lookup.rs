//! Lookup facade over the frozen enum state.
//!
//! Reads on [`EnumState`] borrow from the snapshot. The same operations on
//! [`EnumModel`] take the model's current snapshot and return owned values.
//! Name lookups accept any string-like key.

use std::collections::BTreeSet;
use std::sync::Arc;

use rowenum_store::Ordinal;

use crate::error::{EnumError, EnumResult};
use crate::member::Member;
use crate::model::EnumModel;
use crate::state::EnumState;

impl EnumState {
    pub fn by_ordinal(&self, ordinal: impl Into<Ordinal>) -> Option<&Arc<Member>> {
        self.by_ordinal.get(&ordinal.into())
    }

    pub fn by_name(&self, name: impl AsRef<str>) -> Option<&Arc<Member>> {
        self.by_name.get(name.as_ref())
    }

    /// Like [`by_name`](Self::by_name), failing with
    /// [`EnumError::UnknownMember`] when there is no such member.
    pub fn by_name_required(&self, name: impl AsRef<str>) -> EnumResult<&Arc<Member>> {
        let name = name.as_ref();
        self.by_name(name).ok_or_else(|| EnumError::UnknownMember {
            type_name: self.type_name.clone(),
            name: name.to_string(),
        })
    }

    /// Member exposed under a constant identifier such as `WITH_PUNCTUATION`.
    pub fn constant(&self, ident: &str) -> Option<&Arc<Member>> {
        self.constants.get(ident)
    }

    pub fn constants(&self) -> impl ExactSizeIterator<Item = (&str, &Arc<Member>)> + '_ {
        self.constants.iter().map(|(ident, member)| (ident.as_str(), member))
    }

    /// Ordinals of the required members, in ordinal order.
    pub fn active_ordinals(&self) -> impl ExactSizeIterator<Item = &Ordinal> + '_ {
        self.required_by_ordinal.keys()
    }

    /// The required members, in ordinal order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &Arc<Member>> + '_ {
        self.required_by_ordinal.values()
    }

    /// Ordinals of every member, legacy rows included.
    pub fn all_ordinals(&self) -> impl ExactSizeIterator<Item = &Ordinal> + '_ {
        self.by_ordinal.keys()
    }

    /// Every member, legacy rows included, in ordinal order.
    pub fn all_values(&self) -> impl ExactSizeIterator<Item = &Arc<Member>> + '_ {
        self.by_ordinal.values()
    }

    /// Whether `member` is one of this type's required members. Members of
    /// other types are never active here, whatever their ordinal.
    pub fn is_active(&self, member: &Member) -> bool {
        member.type_name() == self.type_name
            && self.required_by_ordinal.contains_key(member.ordinal())
    }
}

impl EnumModel {
    pub fn by_ordinal(&self, ordinal: impl Into<Ordinal>) -> EnumResult<Option<Arc<Member>>> {
        Ok(self.snapshot()?.by_ordinal(ordinal).cloned())
    }

    pub fn by_name(&self, name: impl AsRef<str>) -> EnumResult<Option<Arc<Member>>> {
        Ok(self.snapshot()?.by_name(name).cloned())
    }

    pub fn by_name_required(&self, name: impl AsRef<str>) -> EnumResult<Arc<Member>> {
        self.snapshot()?.by_name_required(name).cloned()
    }

    pub fn constant(&self, ident: &str) -> EnumResult<Option<Arc<Member>>> {
        Ok(self.snapshot()?.constant(ident).cloned())
    }

    pub fn active_ordinals(&self) -> EnumResult<BTreeSet<Ordinal>> {
        Ok(self.snapshot()?.active_ordinals().cloned().collect())
    }

    pub fn values(&self) -> EnumResult<Vec<Arc<Member>>> {
        Ok(self.snapshot()?.values().cloned().collect())
    }

    pub fn all_ordinals(&self) -> EnumResult<BTreeSet<Ordinal>> {
        Ok(self.snapshot()?.all_ordinals().cloned().collect())
    }

    pub fn all_values(&self) -> EnumResult<Vec<Arc<Member>>> {
        Ok(self.snapshot()?.all_values().cloned().collect())
    }

    pub fn is_active(&self, member: &Member) -> EnumResult<bool> {
        Ok(self.snapshot()?.is_active(member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::RequiredSpec;
    use crate::options::EnumOptions;
    use rowenum_store::{Attributes, Row};
    use serde_json::json;
    use std::borrow::Cow;

    fn state() -> EnumState {
        let members = [(1, "One"), (2, "with.punctuation"), (9999, "Hello")]
            .into_iter()
            .map(|(id, name)| {
                let mut values = Attributes::new();
                values.insert("name".into(), json!(name));
                Member::from_row(
                    "Counter",
                    Row {
                        id: Ordinal::Int(id),
                        values,
                    },
                    "name",
                )
                .unwrap()
            })
            .collect();
        EnumState::build(
            "Counter",
            RequiredSpec::from_names(["One", "with.punctuation"]),
            EnumOptions::default(),
            members,
            None,
        )
    }

    #[test]
    fn name_lookup_accepts_any_string_form() {
        let state = state();
        let by_str = state.by_name("One").unwrap();
        let by_string = state.by_name(String::from("One")).unwrap();
        let by_cow = state.by_name(Cow::Borrowed("One")).unwrap();

        assert!(Arc::ptr_eq(by_str, by_string));
        assert!(Arc::ptr_eq(by_str, by_cow));
        assert!(state.by_name("one").is_none());
    }

    #[test]
    fn ordinal_lookup_matches_name_lookup() {
        let state = state();
        for name in ["One", "with.punctuation", "Hello"] {
            let member = state.by_name(name).unwrap();
            assert!(Arc::ptr_eq(member, state.by_ordinal(member.ordinal()).unwrap()));
        }
        assert!(state.by_ordinal(3).is_none());
    }

    #[test]
    fn required_lookup_reports_type_and_name() {
        let state = state();
        let err = state.by_name_required("Missing").unwrap_err();
        match &err {
            EnumError::UnknownMember { type_name, name } => {
                assert_eq!(type_name, "Counter");
                assert_eq!(name, "Missing");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.to_string(), "uninitialized constant Counter::Missing");
    }

    #[test]
    fn active_and_all_views() {
        let state = state();
        let active: Vec<_> = state.values().map(|m| m.name()).collect();
        let all: Vec<_> = state.all_values().map(|m| m.name()).collect();

        assert_eq!(active, vec!["One", "with.punctuation"]);
        assert_eq!(all, vec!["One", "with.punctuation", "Hello"]);
        assert_eq!(
            state.active_ordinals().cloned().collect::<Vec<_>>(),
            vec![Ordinal::Int(1), Ordinal::Int(2)]
        );
        assert_eq!(state.all_ordinals().len(), 3);

        let hello = state.by_name("Hello").unwrap();
        assert!(!state.is_active(hello));
        assert!(state.is_active(state.by_name("One").unwrap()));
    }

    #[test]
    fn members_of_other_types_are_not_active() {
        let state = state();
        let mut values = Attributes::new();
        values.insert("name".into(), json!("One"));
        let foreign = Member::from_row(
            "Gauge",
            Row {
                id: Ordinal::Int(1),
                values,
            },
            "name",
        )
        .unwrap();

        assert!(state.by_ordinal(1).is_some());
        assert!(!state.is_active(&foreign));
    }

    #[test]
    fn constants_cover_required_members_only() {
        let state = state();
        let punct = state.constant("WITH_PUNCTUATION").unwrap();
        assert_eq!(punct.name(), "with.punctuation");
        assert!(state.constant("HELLO").is_none());
        assert_eq!(state.constants().len(), 2);
    }
}
