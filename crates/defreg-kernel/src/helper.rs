//! Definition helpers: deferred definitions that only know their shape
//! until they are told the entry name.
//!
//! The free functions [`create`], [`autowire`], [`factory`], and [`value`]
//! are the usual way to write definition maps by hand:
//!
//! ```
//! use defreg_kernel::{DefinitionMap, helper};
//!
//! let definitions = DefinitionMap::new()
//!     .with("db.dsn", "sqlite::memory:")
//!     .with("App\\*Repository", helper::create(Some("App\\Sql*Repository")))
//!     .with("App\\Mailer", helper::autowire(None).property("from", "noreply@example.com"));
//! assert_eq!(definitions.len(), 3);
//! ```

use crate::definition::{
    AutowireDefinition, Definition, FactoryDefinition, Injections, MethodInjection,
    ObjectDefinition, ValueDefinition,
};
use crate::entry::{FactoryContext, FactoryFn, RawEntry};
use crate::error::FactoryError;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// Produces a definition once the entry name is known.
pub trait DefinitionHelper: fmt::Debug + Send + Sync {
    fn definition(&self, name: &str) -> Definition;
}

/// Object definition, class name defaulting to the entry name.
pub fn create(class_name: Option<&str>) -> CreateDefinitionHelper {
    CreateDefinitionHelper {
        template: ObjectTemplate::new(class_name),
    }
}

/// Autowire marker, optionally pinned to a class name.
pub fn autowire(class_name: Option<&str>) -> AutowireDefinitionHelper {
    AutowireDefinitionHelper {
        template: ObjectTemplate::new(class_name),
    }
}

pub fn factory<F>(factory: F) -> FactoryDefinitionHelper
where
    F: Fn(&FactoryContext<'_>) -> Result<Value, FactoryError> + Send + Sync + 'static,
{
    FactoryDefinitionHelper {
        factory: FactoryFn::new(factory),
        parameters: IndexMap::new(),
    }
}

/// Literal value, even when it is a JSON container.
pub fn value(value: impl Into<Value>) -> ValueDefinitionHelper {
    ValueDefinitionHelper {
        value: value.into(),
    }
}

#[derive(Debug, Clone, Default)]
struct ObjectTemplate {
    class_name: Option<String>,
    injections: Injections,
    lazy: bool,
}

impl ObjectTemplate {
    fn new(class_name: Option<&str>) -> Self {
        Self {
            class_name: class_name.map(ToOwned::to_owned),
            ..Self::default()
        }
    }

    fn constructor<I, E>(&mut self, parameters: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<RawEntry>,
    {
        self.injections.constructor = parameters
            .into_iter()
            .enumerate()
            .map(|(index, entry)| (index, entry.into()))
            .collect();
    }

    fn method<I, E>(&mut self, method: &str, parameters: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<RawEntry>,
    {
        self.injections.methods.push(MethodInjection {
            method: method.to_string(),
            parameters: parameters
                .into_iter()
                .enumerate()
                .map(|(index, entry)| (index, entry.into()))
                .collect(),
        });
    }

    fn object(&self, name: &str) -> ObjectDefinition {
        ObjectDefinition::new(name, self.class_name.as_deref())
            .with_injections(self.injections.clone())
            .with_lazy(self.lazy)
    }
}

#[derive(Debug, Clone)]
pub struct CreateDefinitionHelper {
    template: ObjectTemplate,
}

impl CreateDefinitionHelper {
    /// Positional constructor parameters, replacing any set before.
    pub fn constructor<I, E>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<RawEntry>,
    {
        self.template.constructor(parameters);
        self
    }

    pub fn constructor_parameter(mut self, index: usize, entry: impl Into<RawEntry>) -> Self {
        self.template
            .injections
            .constructor
            .insert(index, entry.into());
        self
    }

    pub fn property(mut self, property: &str, entry: impl Into<RawEntry>) -> Self {
        self.template
            .injections
            .properties
            .insert(property.to_string(), entry.into());
        self
    }

    /// Method call after construction. Calling it twice injects twice.
    pub fn method<I, E>(mut self, method: &str, parameters: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<RawEntry>,
    {
        self.template.method(method, parameters);
        self
    }

    pub fn lazy(mut self) -> Self {
        self.template.lazy = true;
        self
    }
}

impl DefinitionHelper for CreateDefinitionHelper {
    fn definition(&self, name: &str) -> Definition {
        Definition::Object(self.template.object(name))
    }
}

#[derive(Debug, Clone)]
pub struct AutowireDefinitionHelper {
    template: ObjectTemplate,
}

impl AutowireDefinitionHelper {
    pub fn constructor<I, E>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<RawEntry>,
    {
        self.template.constructor(parameters);
        self
    }

    /// Pin one constructor parameter and let autowiring fill the rest.
    pub fn constructor_parameter(mut self, index: usize, entry: impl Into<RawEntry>) -> Self {
        self.template
            .injections
            .constructor
            .insert(index, entry.into());
        self
    }

    pub fn property(mut self, property: &str, entry: impl Into<RawEntry>) -> Self {
        self.template
            .injections
            .properties
            .insert(property.to_string(), entry.into());
        self
    }

    pub fn method<I, E>(mut self, method: &str, parameters: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<RawEntry>,
    {
        self.template.method(method, parameters);
        self
    }

    pub fn lazy(mut self) -> Self {
        self.template.lazy = true;
        self
    }
}

impl DefinitionHelper for AutowireDefinitionHelper {
    fn definition(&self, name: &str) -> Definition {
        Definition::Autowire(AutowireDefinition::from_object(self.template.object(name)))
    }
}

#[derive(Debug, Clone)]
pub struct FactoryDefinitionHelper {
    factory: FactoryFn,
    parameters: IndexMap<String, RawEntry>,
}

impl FactoryDefinitionHelper {
    pub fn parameter(mut self, parameter: &str, entry: impl Into<RawEntry>) -> Self {
        self.parameters.insert(parameter.to_string(), entry.into());
        self
    }
}

impl DefinitionHelper for FactoryDefinitionHelper {
    fn definition(&self, name: &str) -> Definition {
        Definition::Factory(
            FactoryDefinition::new(name, self.factory.clone()).with_parameters(self.parameters.clone()),
        )
    }
}

#[derive(Debug, Clone)]
pub struct ValueDefinitionHelper {
    value: Value,
}

impl DefinitionHelper for ValueDefinitionHelper {
    fn definition(&self, name: &str) -> Definition {
        Definition::Value(ValueDefinition::new(name, self.value.clone()))
    }
}

macro_rules! helper_into_raw_entry {
    ($($helper:ty),* $(,)?) => {
        $(
            impl From<$helper> for RawEntry {
                fn from(helper: $helper) -> Self {
                    RawEntry::helper(helper)
                }
            }
        )*
    };
}

helper_into_raw_entry!(
    CreateDefinitionHelper,
    AutowireDefinitionHelper,
    FactoryDefinitionHelper,
    ValueDefinitionHelper,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::DefinitionKind;
    use serde_json::json;

    #[test]
    fn create_uses_requested_name() {
        let helper = create(None).constructor(["a", "b"]).property("debug", true);
        let definition = helper.definition("App\\Service");
        let object = definition.as_object().expect("object definition");
        assert_eq!(object.name(), "App\\Service");
        assert_eq!(object.class_name(), "App\\Service");
        assert_eq!(object.injections().constructor.len(), 2);
        assert_eq!(
            object.injections().properties.get("debug"),
            Some(&RawEntry::from(true))
        );
    }

    #[test]
    fn autowire_keeps_pinned_parameters() {
        let helper = autowire(Some("SmtpMailer"))
            .constructor_parameter(1, "smtp.example.com")
            .method("setLogger", ["logger"])
            .lazy();
        let Definition::Autowire(marker) = helper.definition("Mailer") else {
            panic!("expected autowire marker");
        };
        let object = marker.object();
        assert_eq!(object.class_name(), "SmtpMailer");
        assert!(object.is_lazy());
        assert_eq!(object.injections().constructor.keys().collect::<Vec<_>>(), vec![&1]);
        assert_eq!(object.injections().methods[0].method, "setLogger");
    }

    #[test]
    fn factory_helper_passes_parameters_through_context() {
        let helper = factory(|context| {
            let RawEntry::Value(host) = context.require("host")? else {
                return Err(FactoryError::Failed {
                    name: context.name().to_string(),
                    message: "host must be a literal".to_string(),
                });
            };
            Ok(json!(format!("{}:{}", host.as_str().unwrap_or_default(), 5432)))
        })
        .parameter("host", "db.internal");
        let definition = helper.definition("db.address");
        let factory = definition.as_factory().expect("factory definition");
        let produced = factory.factory().call(&factory.context()).unwrap();
        assert_eq!(produced, json!("db.internal:5432"));
    }

    #[test]
    fn value_helper_keeps_containers_literal() {
        let definition = value(json!([1, 2, 3])).definition("ports");
        assert_eq!(definition.kind(), DefinitionKind::Value);
        assert_eq!(definition.as_value().map(|v| v.value()), Some(&json!([1, 2, 3])));
    }
}
