//! Declaring the required members of an enum type.
//!
//! A [`RequiredSpec`] is the ordered set of names (each with optional
//! column values) that must exist as rows. It can be built from a plain
//! list of names, from `(name, attributes)` pairs, or fluently with an
//! [`EnumBuilder`].

use rowenum_store::Attributes;
use serde_json::Value;

/// Ordered required members, each with the column values used when its
/// row has to be created.
///
/// Names are unique; declaring a name twice keeps its first position and
/// the last attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequiredSpec {
    members: Vec<(String, Attributes)>,
}

impl RequiredSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required members given by name only.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = Self::new();
        for name in names {
            spec.insert(name.into(), Attributes::new());
        }
        spec
    }

    /// Required members given as `(name, attributes)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Attributes)>,
        S: Into<String>,
    {
        let mut spec = Self::new();
        for (name, attributes) in pairs {
            spec.insert(name.into(), attributes);
        }
        spec
    }

    /// Add a member, replacing the attributes of an earlier declaration of
    /// the same name.
    pub fn insert(&mut self, name: String, attributes: Attributes) {
        match self.members.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = attributes,
            None => self.members.push((name, attributes)),
        }
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.members.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Attributes)> + '_ {
        self.members.iter().map(|(name, attrs)| (name.as_str(), attrs))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|(existing, _)| existing == name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Fluent declaration of required members.
///
/// `member_with("One", [("count", 1)])` declares the member `One` whose
/// row is created with `count = 1` if it does not exist yet.
#[derive(Debug, Clone, Default)]
pub struct EnumBuilder {
    spec: RequiredSpec,
}

impl EnumBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a member by name.
    pub fn member(self, name: impl Into<String>) -> Self {
        self.member_with(name, std::iter::empty::<(String, Value)>())
    }

    /// Declare a member together with the column values for its row.
    pub fn member_with<I, K, V>(mut self, name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let attributes = attributes
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.spec.insert(name.into(), attributes);
        self
    }

    pub fn build(self) -> RequiredSpec {
        self.spec
    }
}

impl From<EnumBuilder> for RequiredSpec {
    fn from(builder: EnumBuilder) -> Self {
        builder.build()
    }
}
