//! Definition sources: the surface the resolution engine consumes.

use crate::definition::Definition;
use crate::error::RegistryError;
use crate::registry::DefinitionRegistry;
use indexmap::IndexMap;

/// Anything that can answer "which definition handles this name?".
pub trait DefinitionSource {
    /// `Ok(None)` for an unknown name.
    fn get_definition(&self, name: &str) -> Result<Option<Definition>, RegistryError>;

    /// Every concrete definition the source knows about.
    fn definitions(&self) -> Result<IndexMap<String, Definition>, RegistryError>;
}

/// A source that also accepts definitions at runtime.
pub trait MutableDefinitionSource: DefinitionSource {
    fn add_definition(&mut self, definition: Definition) -> Result<(), RegistryError>;
}

impl DefinitionSource for DefinitionRegistry {
    fn get_definition(&self, name: &str) -> Result<Option<Definition>, RegistryError> {
        DefinitionRegistry::get_definition(self, name)
    }

    fn definitions(&self) -> Result<IndexMap<String, Definition>, RegistryError> {
        DefinitionRegistry::definitions(self)
    }
}

impl MutableDefinitionSource for DefinitionRegistry {
    fn add_definition(&mut self, definition: Definition) -> Result<(), RegistryError> {
        DefinitionRegistry::add_definition(self, definition);
        Ok(())
    }
}

/// Ordered stack of sources; the first source that knows a name answers.
///
/// The optional mutable source sits in front of every other source and
/// receives all runtime additions.
#[derive(Default)]
pub struct SourceChain {
    mutable: Option<Box<dyn MutableDefinitionSource>>,
    sources: Vec<Box<dyn DefinitionSource>>,
}

impl SourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source behind the ones already present.
    pub fn push(&mut self, source: impl DefinitionSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn with_source(mut self, source: impl DefinitionSource + 'static) -> Self {
        self.push(source);
        self
    }

    pub fn with_mutable_source(mut self, source: impl MutableDefinitionSource + 'static) -> Self {
        self.mutable = Some(Box::new(source));
        self
    }

    /// Number of sources, the mutable one included.
    pub fn len(&self) -> usize {
        self.sources.len() + usize::from(self.mutable.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DefinitionSource for SourceChain {
    fn get_definition(&self, name: &str) -> Result<Option<Definition>, RegistryError> {
        if let Some(source) = &self.mutable {
            if let Some(definition) = source.get_definition(name)? {
                return Ok(Some(definition));
            }
        }
        for source in &self.sources {
            if let Some(definition) = source.get_definition(name)? {
                return Ok(Some(definition));
            }
        }
        Ok(None)
    }

    fn definitions(&self) -> Result<IndexMap<String, Definition>, RegistryError> {
        let mut all = match &self.mutable {
            Some(source) => source.definitions()?,
            None => IndexMap::new(),
        };
        for source in &self.sources {
            for (name, definition) in source.definitions()? {
                all.entry(name).or_insert(definition);
            }
        }
        Ok(all)
    }
}

impl MutableDefinitionSource for SourceChain {
    fn add_definition(&mut self, definition: Definition) -> Result<(), RegistryError> {
        match self.mutable.as_mut() {
            Some(source) => source.add_definition(definition),
            None => Err(RegistryError::ReadOnlySource {
                name: definition.name().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ValueDefinition;
    use crate::entry::DefinitionMap;
    use serde_json::json;

    fn registry(map: DefinitionMap) -> DefinitionRegistry {
        DefinitionRegistry::new(map, None).unwrap()
    }

    fn value(definition: Option<Definition>) -> serde_json::Value {
        definition
            .and_then(|definition| definition.as_value().map(|v| v.value().clone()))
            .unwrap_or_default()
    }

    #[test]
    fn earlier_sources_win() {
        let chain = SourceChain::new()
            .with_source(registry(DefinitionMap::new().with("level", "app")))
            .with_source(registry(
                DefinitionMap::new().with("level", "vendor").with("vendor.only", true),
            ));
        assert_eq!(value(chain.get_definition("level").unwrap()), json!("app"));
        assert_eq!(value(chain.get_definition("vendor.only").unwrap()), json!(true));
        assert!(chain.get_definition("missing").unwrap().is_none());
    }

    #[test]
    fn earlier_wildcard_beats_later_exact_key() {
        let chain = SourceChain::new()
            .with_source(registry(DefinitionMap::new().with("log.*", "wildcard")))
            .with_source(registry(DefinitionMap::new().with("log.level", "exact")));
        assert_eq!(value(chain.get_definition("log.level").unwrap()), json!("wildcard"));
    }

    #[test]
    fn definitions_union_respects_order() {
        let chain = SourceChain::new()
            .with_source(registry(DefinitionMap::new().with("a", 1i64)))
            .with_source(registry(DefinitionMap::new().with("a", 2i64).with("b", 3i64)));
        let all = chain.definitions().unwrap();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            all.get("a").and_then(Definition::as_value).map(ValueDefinition::value),
            Some(&json!(1))
        );
    }

    #[test]
    fn additions_go_to_the_mutable_source_first() {
        let mut chain = SourceChain::new()
            .with_source(registry(DefinitionMap::new().with("port", 80i64)))
            .with_mutable_source(DefinitionRegistry::empty());
        chain
            .add_definition(Definition::Value(ValueDefinition::new("port", json!(8080))))
            .unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(value(chain.get_definition("port").unwrap()), json!(8080));
    }

    #[test]
    fn chain_without_mutable_source_is_read_only() {
        let mut chain = SourceChain::new().with_source(DefinitionRegistry::empty());
        let err = chain
            .add_definition(Definition::Value(ValueDefinition::new("port", json!(1))))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ReadOnlySource { .. }));
    }
}
