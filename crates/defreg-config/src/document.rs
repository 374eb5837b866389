//! Definition documents.
//!
//! A document is a table of entry name → entry, either at the root or under
//! a `definitions` table. Key order is declaration order, which is the
//! order wildcard keys are tried in.
//!
//! ```toml
//! [definitions]
//! "db.dsn" = "sqlite::memory:"
//! "App\\*Interface" = { "$create" = "App\\*Impl" }
//! "App\\Mailer" = { "$autowire" = true, properties = { from = "noreply@example.com" } }
//! "ports" = [80, 443]
//! "raw.table" = { "$value" = { kept = "literal" } }
//! ```
//!
//! Tables carrying `$create`, `$autowire`, or `$value` become definition
//! helpers. Every other table or array is a container of nested entries,
//! converted the same way; scalars are literals.

use crate::error::ConfigError;
use defreg_kernel::helper::{self, AutowireDefinitionHelper, CreateDefinitionHelper};
use defreg_kernel::{ArrayEntries, DefinitionMap, EntryKey, RawEntry};
use serde_json::{Map, Value};
use std::path::Path;

/// Wrapper table for a document's entries.
///
/// A root key with this name whose value is a table is always read as the
/// wrapper, so an entry literally named `definitions` must be declared
/// inside it. The wrapper must be the only root key.
pub const DEFINITIONS_KEY: &str = "definitions";

const CREATE_MARKER: &str = "$create";
const AUTOWIRE_MARKER: &str = "$autowire";
const VALUE_MARKER: &str = "$value";

const CONSTRUCTOR_KEY: &str = "constructor";
const PROPERTIES_KEY: &str = "properties";
const METHODS_KEY: &str = "methods";
const LAZY_KEY: &str = "lazy";
const OBJECT_OPTION_KEYS: &[&str] = &[CONSTRUCTOR_KEY, PROPERTIES_KEY, METHODS_KEY, LAZY_KEY];

const INLINE_SOURCE: &str = "<inline>";

/// Parse a JSON definition document.
pub fn parse_definitions_json(text: &str) -> Result<DefinitionMap, ConfigError> {
    parse_json(text, INLINE_SOURCE)
}

/// Parse a TOML definition document.
pub fn parse_definitions_toml(text: &str) -> Result<DefinitionMap, ConfigError> {
    parse_toml(text, INLINE_SOURCE)
}

/// Load a definition document, picking the parser from the file extension.
pub fn load_definitions(path: impl AsRef<Path>) -> Result<DefinitionMap, ConfigError> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    let parse: fn(&str, &str) -> Result<DefinitionMap, ConfigError> =
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => parse_json,
            Some("toml") => parse_toml,
            _ => return Err(ConfigError::UnsupportedFormat { path: shown }),
        };
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: shown.clone(),
        source,
    })?;
    let definitions = parse(&text, &shown)?;
    tracing::debug!(path = %shown, entries = definitions.len(), "loaded definition document");
    Ok(definitions)
}

/// Convert an already-parsed document.
///
/// A root array becomes a positional map (`"0"`, `"1"`, ...), which the
/// registry rejects as malformed.
pub fn definitions_from_value(document: Value) -> Result<DefinitionMap, ConfigError> {
    match document {
        Value::Object(mut fields) => {
            let nested = match fields.get_mut(DEFINITIONS_KEY) {
                Some(Value::Object(nested)) => std::mem::take(nested),
                _ => return definitions_from_table(fields),
            };
            if let Some(sibling) = fields.keys().find(|key| key.as_str() != DEFINITIONS_KEY) {
                return Err(invalid(
                    sibling,
                    format!("root key next to the `{DEFINITIONS_KEY}` table"),
                ));
            }
            definitions_from_table(nested)
        }
        Value::Array(items) => {
            let entries = items
                .into_iter()
                .enumerate()
                .map(|(index, item)| entry_from_value(&index.to_string(), item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DefinitionMap::from_list(entries))
        }
        _ => Err(ConfigError::InvalidRoot),
    }
}

fn parse_json(text: &str, path: &str) -> Result<DefinitionMap, ConfigError> {
    let document: Value = serde_json::from_str(text).map_err(|source| ConfigError::ParseJson {
        path: path.to_string(),
        source,
    })?;
    definitions_from_value(document)
}

fn parse_toml(text: &str, path: &str) -> Result<DefinitionMap, ConfigError> {
    let document: Value = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
        path: path.to_string(),
        source,
    })?;
    definitions_from_value(document)
}

fn definitions_from_table(fields: Map<String, Value>) -> Result<DefinitionMap, ConfigError> {
    let mut definitions = DefinitionMap::new();
    for (name, value) in fields {
        let entry = entry_from_value(&name, value)?;
        definitions.insert(name, entry);
    }
    Ok(definitions)
}

/// Convert one document value into a raw entry. `name` is only used for
/// error messages.
pub fn entry_from_value(name: &str, value: Value) -> Result<RawEntry, ConfigError> {
    match value {
        Value::Object(fields) if fields.contains_key(VALUE_MARKER) => value_entry(name, fields),
        Value::Object(fields) if fields.contains_key(CREATE_MARKER) => {
            let class_name = marker_class_name(name, &fields, CREATE_MARKER)?;
            let helper = helper::create(class_name.as_deref());
            object_entry(name, helper, &fields, CREATE_MARKER)
        }
        Value::Object(fields) if fields.contains_key(AUTOWIRE_MARKER) => {
            let class_name = marker_class_name(name, &fields, AUTOWIRE_MARKER)?;
            let helper = helper::autowire(class_name.as_deref());
            object_entry(name, helper, &fields, AUTOWIRE_MARKER)
        }
        Value::Object(fields) => {
            let mut entries = ArrayEntries::with_capacity(fields.len());
            for (key, item) in fields {
                let entry = entry_from_value(&format!("{name}.{key}"), item)?;
                entries.insert(EntryKey::Name(key), entry);
            }
            Ok(RawEntry::Array(entries))
        }
        Value::Array(items) => {
            let mut entries = ArrayEntries::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let entry = entry_from_value(&format!("{name}[{index}]"), item)?;
                entries.insert(EntryKey::Index(index), entry);
            }
            Ok(RawEntry::Array(entries))
        }
        scalar => Ok(RawEntry::Value(scalar)),
    }
}

fn value_entry(name: &str, mut fields: Map<String, Value>) -> Result<RawEntry, ConfigError> {
    if fields.len() != 1 {
        return Err(invalid(name, format!("`{VALUE_MARKER}` must be the only key")));
    }
    let payload = fields.remove(VALUE_MARKER).unwrap_or(Value::Null);
    Ok(helper::value(payload).into())
}

/// `"$create" = "Class"` pins the class; `true` or `null` leaves it to the
/// entry name.
fn marker_class_name(
    name: &str,
    fields: &Map<String, Value>,
    marker: &str,
) -> Result<Option<String>, ConfigError> {
    match fields.get(marker) {
        Some(Value::String(class_name)) => Ok(Some(class_name.clone())),
        Some(Value::Bool(true)) | Some(Value::Null) | None => Ok(None),
        Some(other) => Err(invalid(
            name,
            format!("`{marker}` must be a class name or true, got {other}"),
        )),
    }
}

fn object_entry<H: ObjectHelper>(
    name: &str,
    mut helper: H,
    fields: &Map<String, Value>,
    marker: &str,
) -> Result<RawEntry, ConfigError> {
    for key in fields.keys() {
        if key != marker && !OBJECT_OPTION_KEYS.contains(&key.as_str()) {
            return Err(invalid(name, format!("unknown key `{key}` next to `{marker}`")));
        }
    }

    match fields.get(CONSTRUCTOR_KEY) {
        None => {}
        Some(Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                let entry = entry_from_value(&format!("{name}.constructor[{index}]"), item.clone())?;
                helper = helper.constructor_parameter(index, entry);
            }
        }
        Some(Value::Object(items)) => {
            for (key, item) in items {
                let index = key.parse::<usize>().map_err(|_| {
                    invalid(name, format!("constructor key `{key}` must be a parameter index"))
                })?;
                let entry = entry_from_value(&format!("{name}.constructor[{index}]"), item.clone())?;
                helper = helper.constructor_parameter(index, entry);
            }
        }
        Some(_) => {
            return Err(invalid(name, "`constructor` must be an array or a table".to_string()));
        }
    }

    match fields.get(PROPERTIES_KEY) {
        None => {}
        Some(Value::Object(items)) => {
            for (property, item) in items {
                let entry = entry_from_value(&format!("{name}.{property}"), item.clone())?;
                helper = helper.property(property, entry);
            }
        }
        Some(_) => return Err(invalid(name, "`properties` must be a table".to_string())),
    }

    match fields.get(METHODS_KEY) {
        None => {}
        Some(Value::Array(rows)) => {
            for (idx, row) in rows.iter().enumerate() {
                let (method, parameters) = parse_method_row(name, idx, row)?;
                helper = helper.method(&method, parameters);
            }
        }
        Some(_) => return Err(invalid(name, "`methods` must be an array".to_string())),
    }

    match fields.get(LAZY_KEY) {
        None | Some(Value::Bool(false)) => {}
        Some(Value::Bool(true)) => helper = helper.lazy(),
        Some(_) => return Err(invalid(name, "`lazy` must be a boolean".to_string())),
    }

    Ok(helper.into())
}

fn parse_method_row(
    name: &str,
    idx: usize,
    row: &Value,
) -> Result<(String, Vec<RawEntry>), ConfigError> {
    let Some(obj) = row.as_object() else {
        return Err(invalid(name, format!("methods[{idx}] must be a table")));
    };
    let method = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| invalid(name, format!("methods[{idx}] is missing name")))?
        .to_string();
    let parameters = match obj.get("params") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                entry_from_value(&format!("{name}.{method}[{index}]"), item.clone())
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid(name, format!("methods[{idx}].params must be an array"))),
    };
    Ok((method, parameters))
}

fn invalid(name: &str, message: String) -> ConfigError {
    ConfigError::InvalidEntry {
        name: name.to_string(),
        message,
    }
}

/// Builder surface shared by the create and autowire helpers.
trait ObjectHelper: Sized + Into<RawEntry> {
    fn constructor_parameter(self, index: usize, entry: RawEntry) -> Self;
    fn property(self, property: &str, entry: RawEntry) -> Self;
    fn method(self, method: &str, parameters: Vec<RawEntry>) -> Self;
    fn lazy(self) -> Self;
}

macro_rules! object_helper {
    ($($helper:ty),* $(,)?) => {
        $(
            impl ObjectHelper for $helper {
                fn constructor_parameter(self, index: usize, entry: RawEntry) -> Self {
                    <$helper>::constructor_parameter(self, index, entry)
                }

                fn property(self, property: &str, entry: RawEntry) -> Self {
                    <$helper>::property(self, property, entry)
                }

                fn method(self, method: &str, parameters: Vec<RawEntry>) -> Self {
                    <$helper>::method(self, method, parameters)
                }

                fn lazy(self) -> Self {
                    <$helper>::lazy(self)
                }
            }
        )*
    };
}

object_helper!(CreateDefinitionHelper, AutowireDefinitionHelper);
