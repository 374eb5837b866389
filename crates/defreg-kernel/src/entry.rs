//! Raw entries: what the registry's owner supplies before normalization.
//!
//! A [`RawEntry`] is one of a literal, a container of further raw entries,
//! a factory callable, an already-built [`Definition`], or a
//! [`DefinitionHelper`]. Casting (see [`crate::cast`]) turns any of them
//! into a [`Definition`].

use crate::definition::Definition;
use crate::error::FactoryError;
use crate::helper::DefinitionHelper;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Key of a nested entry inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKey {
    Index(usize),
    Name(String),
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<usize> for EntryKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for EntryKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for EntryKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Ordered, keyed container of nested raw entries.
pub type ArrayEntries = IndexMap<EntryKey, RawEntry>;

/// What a factory sees when it is invoked.
#[derive(Debug, Clone, Copy)]
pub struct FactoryContext<'a> {
    name: &'a str,
    parameters: &'a IndexMap<String, RawEntry>,
}

impl<'a> FactoryContext<'a> {
    pub fn new(name: &'a str, parameters: &'a IndexMap<String, RawEntry>) -> Self {
        Self { name, parameters }
    }

    /// Entry name the factory is producing a value for.
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn parameter(&self, parameter: &str) -> Option<&'a RawEntry> {
        self.parameters.get(parameter)
    }

    /// Like [`Self::parameter`], but a missing parameter is an error.
    pub fn require(&self, parameter: &str) -> Result<&'a RawEntry, FactoryError> {
        self.parameter(parameter)
            .ok_or_else(|| FactoryError::MissingParameter {
                name: self.name.to_string(),
                parameter: parameter.to_string(),
            })
    }
}

type FactoryCallable = dyn Fn(&FactoryContext<'_>) -> Result<Value, FactoryError> + Send + Sync;

/// Shared factory callable.
///
/// Equality is identity: two handles are equal only when they share the
/// same callable.
#[derive(Clone)]
pub struct FactoryFn(Arc<FactoryCallable>);

impl FactoryFn {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&FactoryContext<'_>) -> Result<Value, FactoryError> + Send + Sync + 'static,
    {
        Self(Arc::new(factory))
    }

    pub fn call(&self, context: &FactoryContext<'_>) -> Result<Value, FactoryError> {
        (self.0)(context)
    }
}

impl PartialEq for FactoryFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FactoryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FactoryFn(..)")
    }
}

/// A value supplied for an entry name, before normalization.
#[derive(Debug, Clone)]
pub enum RawEntry {
    /// A literal. JSON arrays and objects count as containers when cast.
    Value(Value),
    Array(ArrayEntries),
    Factory(FactoryFn),
    Definition(Definition),
    Helper(Arc<dyn DefinitionHelper>),
}

impl RawEntry {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&FactoryContext<'_>) -> Result<Value, FactoryError> + Send + Sync + 'static,
    {
        Self::Factory(FactoryFn::new(factory))
    }

    pub fn helper(helper: impl DefinitionHelper + 'static) -> Self {
        Self::Helper(Arc::new(helper))
    }

    /// Positional container, keyed `0..n` in iteration order.
    pub fn list<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<RawEntry>,
    {
        Self::Array(
            entries
                .into_iter()
                .enumerate()
                .map(|(index, entry)| (EntryKey::Index(index), entry.into()))
                .collect(),
        )
    }

    /// Whether casting treats this entry as a container.
    pub fn is_container(&self) -> bool {
        match self {
            Self::Array(_) => true,
            Self::Value(value) => value.is_array() || value.is_object(),
            _ => false,
        }
    }
}

impl PartialEq for RawEntry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Factory(a), Self::Factory(b)) => a == b,
            (Self::Definition(a), Self::Definition(b)) => a == b,
            (Self::Helper(a), Self::Helper(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Nested entries of a JSON container, in document order.
///
/// Scalars have no nested entries.
pub(crate) fn json_entries(value: &Value) -> ArrayEntries {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| (EntryKey::Index(index), RawEntry::Value(item.clone())))
            .collect(),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, item)| (EntryKey::Name(key.clone()), RawEntry::Value(item.clone())))
            .collect(),
        _ => ArrayEntries::new(),
    }
}

impl From<Value> for RawEntry {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for RawEntry {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for RawEntry {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<bool> for RawEntry {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<i64> for RawEntry {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<f64> for RawEntry {
    fn from(value: f64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<Vec<RawEntry>> for RawEntry {
    fn from(entries: Vec<RawEntry>) -> Self {
        Self::list(entries)
    }
}

impl From<ArrayEntries> for RawEntry {
    fn from(entries: ArrayEntries) -> Self {
        Self::Array(entries)
    }
}

impl From<FactoryFn> for RawEntry {
    fn from(factory: FactoryFn) -> Self {
        Self::Factory(factory)
    }
}

impl From<Definition> for RawEntry {
    fn from(definition: Definition) -> Self {
        Self::Definition(definition)
    }
}

/// Insertion-ordered map from entry name to raw entry.
///
/// Iteration order is declaration order; wildcard keys are tried in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionMap {
    entries: IndexMap<String, RawEntry>,
}

impl DefinitionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, entry: impl Into<RawEntry>) -> Self {
        self.insert(name, entry);
        self
    }

    /// Map keyed by position (`"0"`, `"1"`, ...), the shape a plain list
    /// takes when handed over where a name-keyed map was expected.
    pub fn from_list<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<RawEntry>,
    {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| (index.to_string(), entry.into()))
            .collect()
    }

    /// Insert or replace. An existing name keeps its position.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        entry: impl Into<RawEntry>,
    ) -> Option<RawEntry> {
        self.entries.insert(name.into(), entry.into())
    }

    pub fn get(&self, name: &str) -> Option<&RawEntry> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Whether positional slot `0` is set.
    ///
    /// This also rejects a genuine entry named `"0"`.
    pub fn is_list_like(&self) -> bool {
        self.entries.contains_key("0")
    }

    pub fn into_inner(self) -> IndexMap<String, RawEntry> {
        self.entries
    }
}

impl<K, E> FromIterator<(K, E)> for DefinitionMap
where
    K: Into<String>,
    E: Into<RawEntry>,
{
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, entry)| (name.into(), entry.into()))
                .collect(),
        }
    }
}

impl<K, E> Extend<(K, E)> for DefinitionMap
where
    K: Into<String>,
    E: Into<RawEntry>,
{
    fn extend<I: IntoIterator<Item = (K, E)>>(&mut self, iter: I) {
        for (name, entry) in iter {
            self.insert(name, entry);
        }
    }
}

impl From<IndexMap<String, RawEntry>> for DefinitionMap {
    fn from(entries: IndexMap<String, RawEntry>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for DefinitionMap {
    type Item = (String, RawEntry);
    type IntoIter = indexmap::map::IntoIter<String, RawEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_keys_are_positional() {
        let RawEntry::Array(entries) = RawEntry::list(["a", "b"]) else {
            panic!("expected container");
        };
        let keys: Vec<_> = entries.keys().cloned().collect();
        assert_eq!(keys, vec![EntryKey::Index(0), EntryKey::Index(1)]);
    }

    #[test]
    fn json_containers_are_containers() {
        assert!(RawEntry::from(json!([1, 2])).is_container());
        assert!(RawEntry::from(json!({"a": 1})).is_container());
        assert!(!RawEntry::from(json!("a")).is_container());
        assert!(!RawEntry::factory(|_| Ok(Value::Null)).is_container());
    }

    #[test]
    fn json_entries_keep_document_order() {
        let entries = json_entries(&json!({"z": 1, "a": 2}));
        let keys: Vec<String> = entries.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn insert_keeps_position_of_existing_name() {
        let mut map = DefinitionMap::new().with("a", 1i64).with("b", 2i64);
        map.insert("a", 3i64);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&RawEntry::from(3i64)));
    }

    #[test]
    fn from_list_is_list_like() {
        assert!(DefinitionMap::from_list(["x", "y"]).is_list_like());
        assert!(!DefinitionMap::new().with("a", "y").is_list_like());
    }

    #[test]
    fn factory_context_requires_parameters() {
        let parameters = IndexMap::from([("dsn".to_string(), RawEntry::from("sqlite::memory:"))]);
        let context = FactoryContext::new("db", &parameters);
        assert!(context.require("dsn").is_ok());
        assert!(matches!(
            context.require("user"),
            Err(FactoryError::MissingParameter { .. })
        ));
    }

    #[test]
    fn factory_equality_is_identity() {
        let a = FactoryFn::new(|_| Ok(Value::Null));
        let b = FactoryFn::new(|_| Ok(Value::Null));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
