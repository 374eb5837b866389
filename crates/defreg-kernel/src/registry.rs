//! The definition registry.
//!
//! Lookup is exact-match first, then the wildcard keys in declaration
//! order. The compiled wildcard keys are cached lazily and dropped on every
//! mutation.

use crate::autowire::{Autowiring, NoAutowiring};
use crate::cast::cast_definition;
use crate::definition::Definition;
use crate::entry::{DefinitionMap, RawEntry};
use crate::error::RegistryError;
use crate::wildcard::{WildcardPattern, has_wildcard, substitute_wildcards};
use indexmap::IndexMap;
use std::cell::OnceCell;
use std::fmt;

/// Name → raw entry table with wildcard fallback.
///
/// Lookups take `&self`; the wildcard cache lives in a [`OnceCell`], so the
/// registry is not `Sync`. Callers sharing it across threads must serialize
/// access themselves.
pub struct DefinitionRegistry {
    definitions: DefinitionMap,
    /// One slot per wildcard key, in map order; `None` for a key that does
    /// not compile. Unbuilt until the first wildcard fallback. Built-but-empty
    /// is a distinct state and is not rebuilt.
    wildcard_cache: OnceCell<Vec<Option<WildcardPattern>>>,
    autowiring: Box<dyn Autowiring>,
}

impl DefinitionRegistry {
    /// Build a registry from `definitions`.
    ///
    /// Without a collaborator, autowire entries fail with
    /// [`crate::AutowireError::Disabled`].
    pub fn new(
        definitions: DefinitionMap,
        autowiring: Option<Box<dyn Autowiring>>,
    ) -> Result<Self, RegistryError> {
        ensure_name_keyed(&definitions)?;
        Ok(Self {
            definitions,
            wildcard_cache: OnceCell::new(),
            autowiring: autowiring.unwrap_or_else(|| Box::new(NoAutowiring)),
        })
    }

    pub fn with_autowiring(
        definitions: DefinitionMap,
        autowiring: impl Autowiring + 'static,
    ) -> Result<Self, RegistryError> {
        Self::new(definitions, Some(Box::new(autowiring)))
    }

    pub fn empty() -> Self {
        Self {
            definitions: DefinitionMap::new(),
            wildcard_cache: OnceCell::new(),
            autowiring: Box::new(NoAutowiring),
        }
    }

    /// Layer `definitions` over the current ones.
    ///
    /// Incoming entries win on collision. The merged order is the incoming
    /// keys first, then the surviving previous keys, so newer wildcard keys
    /// are also tried first.
    pub fn merge(&mut self, definitions: DefinitionMap) -> Result<(), RegistryError> {
        ensure_name_keyed(&definitions)?;
        let incoming = definitions.len();
        let mut merged = definitions.into_inner();
        for (name, entry) in std::mem::take(&mut self.definitions) {
            merged.entry(name).or_insert(entry);
        }
        self.definitions = merged.into();
        self.invalidate_wildcards();
        tracing::debug!(incoming, total = self.definitions.len(), "merged definitions");
        Ok(())
    }

    /// Insert or replace the entry named after `definition`.
    pub fn add_definition(&mut self, definition: Definition) {
        let name = definition.name().to_string();
        self.definitions.insert(name, RawEntry::Definition(definition));
        self.invalidate_wildcards();
    }

    /// Resolve `name` to a definition.
    ///
    /// `Ok(None)` when neither an exact key nor a wildcard key matches.
    pub fn get_definition(&self, name: &str) -> Result<Option<Definition>, RegistryError> {
        if let Some(raw) = self.definitions.get(name) {
            tracing::trace!(name, "exact definition hit");
            return Ok(Some(self.cast(raw, name)?));
        }

        let wildcard_entries = self.definitions.iter().filter(|(key, _)| has_wildcard(key));
        for ((key, raw), pattern) in wildcard_entries.zip(self.wildcard_patterns()) {
            let Some(captures) = pattern.as_ref().and_then(|pattern| pattern.captures(name)) else {
                continue;
            };
            tracing::debug!(name, key, ?captures, "wildcard definition hit");
            let mut definition = self.cast(raw, name)?;
            if let Some(object) = definition.as_object_mut() {
                let class_name = substitute_wildcards(object.class_name(), captures.as_slice());
                object.set_class_name(class_name);
            }
            return Ok(Some(definition));
        }

        Ok(None)
    }

    /// Every concrete entry, cast, in declaration order.
    ///
    /// Wildcard keys are skipped; they only answer lookups.
    pub fn definitions(&self) -> Result<IndexMap<String, Definition>, RegistryError> {
        let mut resolved = IndexMap::with_capacity(self.definitions.len());
        for (name, raw) in self.definitions.iter() {
            if has_wildcard(name) {
                continue;
            }
            resolved.insert(name.to_string(), self.cast(raw, name)?);
        }
        Ok(resolved)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Whether `name` is an exact key. Wildcard matches do not count.
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys()
    }

    /// Keys in the wildcard cache, or `None` while it is unbuilt.
    pub fn cached_wildcard_keys(&self) -> Option<Vec<&str>> {
        self.wildcard_cache
            .get()
            .map(|_| self.definitions.keys().filter(|key| has_wildcard(key)).collect())
    }

    pub fn autowiring(&self) -> &dyn Autowiring {
        self.autowiring.as_ref()
    }

    fn cast(&self, raw: &RawEntry, name: &str) -> Result<Definition, RegistryError> {
        Ok(cast_definition(raw, name, self.autowiring.as_ref())?)
    }

    fn wildcard_patterns(&self) -> &[Option<WildcardPattern>] {
        self.wildcard_cache.get_or_init(|| {
            let patterns: Vec<_> = self
                .definitions
                .keys()
                .filter(|key| has_wildcard(key))
                .map(compile_wildcard)
                .collect();
            tracing::debug!(count = patterns.len(), "built wildcard cache");
            patterns
        })
    }

    fn invalidate_wildcards(&mut self) {
        self.wildcard_cache.take();
    }
}

impl Default for DefinitionRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for DefinitionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionRegistry")
            .field("definitions", &self.definitions)
            .field("wildcard_cache", &self.cached_wildcard_keys())
            .finish_non_exhaustive()
    }
}

/// A key that does not compile never matches; the other keys are unaffected.
fn compile_wildcard(key: &str) -> Option<WildcardPattern> {
    match WildcardPattern::compile(key) {
        Ok(pattern) => Some(pattern),
        Err(source) => {
            let err = RegistryError::WildcardPattern {
                key: key.to_string(),
                source,
            };
            tracing::warn!(error = %err, "skipping wildcard key");
            None
        }
    }
}

fn ensure_name_keyed(definitions: &DefinitionMap) -> Result<(), RegistryError> {
    if definitions.is_list_like() {
        tracing::warn!("rejecting definition map with positional key 0");
        return Err(RegistryError::MalformedDefinitions {
            key: "0".to_string(),
        });
    }
    Ok(())
}
