//! # Defreg Kernel
//!
//! A definition registry: given an entry name, decide which definition tells
//! the resolver how to produce its value.
//!
//! This crate is **construction-agnostic**: it never builds objects or calls
//! factories. It normalizes what the owner supplied and answers lookups,
//! including lookups that only match a wildcard key.
//!
//! ## Architecture
//!
//! ```text
//! DefinitionMap         ← name → RawEntry, declaration order
//!     │
//! DefinitionRegistry    ← exact match, then wildcard keys in order
//!     │
//! cast_definition       ← helper / container / factory / value, then autowire
//!     │
//! Definition            ← Value, Factory, Object, Array (never Autowire)
//! ```
//!
//! ## Example
//!
//! ```
//! use defreg_kernel::{DefinitionMap, DefinitionRegistry, helper};
//!
//! let definitions = DefinitionMap::new()
//!     .with("App\\*Interface", helper::create(Some("App\\*Impl")));
//! let registry = DefinitionRegistry::new(definitions, None)?;
//!
//! let definition = registry.get_definition("App\\FooInterface")?.expect("wildcard match");
//! assert_eq!(definition.as_object().map(|o| o.class_name()), Some("App\\FooImpl"));
//! # Ok::<(), defreg_kernel::RegistryError>(())
//! ```

pub mod autowire;
pub mod cast;
pub mod definition;
pub mod entry;
pub mod error;
pub mod helper;
pub mod registry;
pub mod source;
pub mod wildcard;

pub use autowire::{AutowireError, Autowiring, NoAutowiring};
pub use cast::cast_definition;
pub use definition::{
    ArrayDefinition, AutowireDefinition, Definition, DefinitionKind, DefinitionSummary,
    FactoryDefinition, Injections, MethodInjection, ObjectDefinition, ValueDefinition,
};
pub use entry::{ArrayEntries, DefinitionMap, EntryKey, FactoryContext, FactoryFn, RawEntry};
pub use error::{FactoryError, RegistryError};
pub use helper::DefinitionHelper;
pub use registry::DefinitionRegistry;
pub use source::{DefinitionSource, MutableDefinitionSource, SourceChain};
pub use wildcard::{WildcardPattern, substitute_wildcards};
