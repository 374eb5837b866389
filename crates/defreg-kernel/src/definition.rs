//! Normalized definitions.
//!
//! Every [`Definition`] carries the entry name it was resolved for. The
//! kernel constructs and inspects them by kind only; producing values from
//! them is the consumer's job.
//!
//! ```text
//! Definition
//!   ├─ Value      literal
//!   ├─ Factory    callable + named parameters
//!   ├─ Object     class name + injections
//!   ├─ Array      nested raw entries
//!   └─ Autowire   marker, replaced during casting
//! ```

use crate::entry::{ArrayEntries, FactoryContext, FactoryFn, RawEntry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which variant a definition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Value,
    Factory,
    Object,
    Array,
    Autowire,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Value => "value",
            Self::Factory => "factory",
            Self::Object => "object",
            Self::Array => "array",
            Self::Autowire => "autowire",
        };
        f.write_str(label)
    }
}

/// Serializable projection of a definition: kind, name, and class name for
/// object-like kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionSummary {
    pub kind: DefinitionKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

/// A normalized descriptor for one entry name.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Value(ValueDefinition),
    Factory(FactoryDefinition),
    Object(ObjectDefinition),
    Array(ArrayDefinition),
    Autowire(AutowireDefinition),
}

impl Definition {
    /// Entry name this definition was resolved for.
    pub fn name(&self) -> &str {
        match self {
            Self::Value(definition) => &definition.name,
            Self::Factory(definition) => &definition.name,
            Self::Object(definition) => &definition.name,
            Self::Array(definition) => &definition.name,
            Self::Autowire(definition) => definition.name(),
        }
    }

    pub fn kind(&self) -> DefinitionKind {
        match self {
            Self::Value(_) => DefinitionKind::Value,
            Self::Factory(_) => DefinitionKind::Factory,
            Self::Object(_) => DefinitionKind::Object,
            Self::Array(_) => DefinitionKind::Array,
            Self::Autowire(_) => DefinitionKind::Autowire,
        }
    }

    pub fn summary(&self) -> DefinitionSummary {
        let class_name = match self {
            Self::Object(definition) => Some(definition.class_name.clone()),
            Self::Autowire(definition) => Some(definition.class_name().to_string()),
            _ => None,
        };
        DefinitionSummary {
            kind: self.kind(),
            name: self.name().to_string(),
            class_name,
        }
    }

    pub fn as_value(&self) -> Option<&ValueDefinition> {
        match self {
            Self::Value(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn as_factory(&self) -> Option<&FactoryDefinition> {
        match self {
            Self::Factory(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectDefinition> {
        match self {
            Self::Object(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectDefinition> {
        match self {
            Self::Object(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayDefinition> {
        match self {
            Self::Array(definition) => Some(definition),
            _ => None,
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(definition) => {
                write!(f, "object `{}` ({})", definition.name, definition.class_name)
            }
            Self::Autowire(definition) => {
                write!(f, "autowire `{}` ({})", definition.name(), definition.class_name())
            }
            other => write!(f, "{} `{}`", other.kind(), other.name()),
        }
    }
}

/// Literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDefinition {
    name: String,
    value: Value,
}

impl ValueDefinition {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Callable producing the value, with optional named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FactoryDefinition {
    name: String,
    factory: FactoryFn,
    parameters: IndexMap<String, RawEntry>,
}

impl FactoryDefinition {
    pub fn new(name: impl Into<String>, factory: FactoryFn) -> Self {
        Self {
            name: name.into(),
            factory,
            parameters: IndexMap::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: IndexMap<String, RawEntry>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn factory(&self) -> &FactoryFn {
        &self.factory
    }

    pub fn parameters(&self) -> &IndexMap<String, RawEntry> {
        &self.parameters
    }

    /// Context to hand to the factory when invoking it.
    pub fn context(&self) -> FactoryContext<'_> {
        FactoryContext::new(&self.name, &self.parameters)
    }
}

/// One method call to perform after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInjection {
    pub method: String,
    pub parameters: IndexMap<usize, RawEntry>,
}

/// Constructor, property, and method injection metadata.
///
/// Constructor and method parameters are keyed by position and may be
/// sparse: unset positions are left to autowiring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Injections {
    pub constructor: IndexMap<usize, RawEntry>,
    pub properties: IndexMap<String, RawEntry>,
    pub methods: Vec<MethodInjection>,
}

impl Injections {
    pub fn is_empty(&self) -> bool {
        self.constructor.is_empty() && self.properties.is_empty() && self.methods.is_empty()
    }
}

/// Object construction descriptor.
///
/// `class_name` is the one field the registry rewrites after construction:
/// wildcard captures are substituted into it.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDefinition {
    name: String,
    class_name: String,
    injections: Injections,
    lazy: bool,
}

impl ObjectDefinition {
    /// `class_name` defaults to the entry name.
    pub fn new(name: impl Into<String>, class_name: Option<&str>) -> Self {
        let name = name.into();
        let class_name = class_name.map_or_else(|| name.clone(), ToOwned::to_owned);
        Self {
            name,
            class_name,
            injections: Injections::default(),
            lazy: false,
        }
    }

    pub fn with_injections(mut self, injections: Injections) -> Self {
        self.injections = injections;
        self
    }

    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn set_class_name(&mut self, class_name: impl Into<String>) {
        self.class_name = class_name.into();
    }

    pub fn injections(&self) -> &Injections {
        &self.injections
    }

    pub fn injections_mut(&mut self) -> &mut Injections {
        &mut self.injections
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }
}

/// Container of nested raw entries, each resolved independently by the
/// consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDefinition {
    name: String,
    entries: ArrayEntries,
}

impl ArrayDefinition {
    pub fn new(name: impl Into<String>, entries: ArrayEntries) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &ArrayEntries {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// "Infer the object definition for me."
///
/// Carries the same metadata as an object so explicit injections can be
/// merged with whatever the collaborator infers.
#[derive(Debug, Clone, PartialEq)]
pub struct AutowireDefinition {
    object: ObjectDefinition,
}

impl AutowireDefinition {
    pub fn new(name: impl Into<String>, class_name: Option<&str>) -> Self {
        Self {
            object: ObjectDefinition::new(name, class_name),
        }
    }

    pub fn from_object(object: ObjectDefinition) -> Self {
        Self { object }
    }

    pub fn name(&self) -> &str {
        self.object.name()
    }

    pub fn class_name(&self) -> &str {
        self.object.class_name()
    }

    pub fn object(&self) -> &ObjectDefinition {
        &self.object
    }

    pub fn into_object(self) -> ObjectDefinition {
        self.object
    }
}
