//! Casting: normalize a raw entry into a definition.
//!
//! Dispatch order is fixed:
//!
//! 1. helper → whatever the helper produces for the name
//! 2. container → array definition
//! 3. factory → factory definition
//! 4. anything else that is not already a definition → value definition
//!
//! After that, an autowire result is always handed to the autowiring
//! collaborator, whichever branch produced it.

use crate::autowire::{AutowireError, Autowiring};
use crate::definition::{ArrayDefinition, Definition, FactoryDefinition, ValueDefinition};
use crate::entry::{RawEntry, json_entries};

/// Cast `raw` for the entry `name`.
///
/// Shape never causes a failure; only the collaborator can fail, and its
/// error is returned unchanged.
pub fn cast_definition(
    raw: &RawEntry,
    name: &str,
    autowiring: &dyn Autowiring,
) -> Result<Definition, AutowireError> {
    match normalize(raw, name) {
        Definition::Autowire(marker) => {
            tracing::debug!(name, class_name = marker.class_name(), "delegating to autowiring");
            autowiring.autowire(name, marker)
        }
        definition => Ok(definition),
    }
}

fn normalize(raw: &RawEntry, name: &str) -> Definition {
    match raw {
        RawEntry::Helper(helper) => helper.definition(name),
        RawEntry::Array(entries) => Definition::Array(ArrayDefinition::new(name, entries.clone())),
        RawEntry::Value(value) if raw.is_container() => {
            Definition::Array(ArrayDefinition::new(name, json_entries(value)))
        }
        RawEntry::Factory(factory) => {
            Definition::Factory(FactoryDefinition::new(name, factory.clone()))
        }
        RawEntry::Definition(definition) => definition.clone(),
        RawEntry::Value(value) => Definition::Value(ValueDefinition::new(name, value.clone())),
    }
}
