//! # defreg-config
//!
//! Definition documents for the defreg kernel.
//!
//! This crate provides:
//! - JSON and TOML parsing into a [`DefinitionMap`]
//! - `$create` / `$autowire` / `$value` markers mapped onto kernel helpers
//! - file loading with format picked from the extension
//!
//! ## Data flow
//!
//! ```text
//! definitions.toml / definitions.json
//!     ↓  parse (declaration order kept)
//! DefinitionMap
//!     ↓  DefinitionRegistry::new / merge
//! DefinitionRegistry
//! ```

pub mod document;
pub mod error;

pub use document::{
    DEFINITIONS_KEY, definitions_from_value, entry_from_value, load_definitions,
    parse_definitions_json, parse_definitions_toml,
};
pub use error::ConfigError;

use defreg_kernel::{Autowiring, DefinitionMap, DefinitionRegistry};
use std::path::Path;

/// Load `paths` in order into one registry.
///
/// Later files are merged over earlier ones, so their entries win and their
/// wildcard keys are tried first.
pub fn load_registry<P: AsRef<Path>>(
    paths: &[P],
    autowiring: Option<Box<dyn Autowiring>>,
) -> Result<DefinitionRegistry, ConfigError> {
    let mut registry = DefinitionRegistry::new(DefinitionMap::new(), autowiring)?;
    for path in paths {
        registry.merge(load_definitions(path)?)?;
    }
    Ok(registry)
}
