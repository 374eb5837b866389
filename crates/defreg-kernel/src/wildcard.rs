//! Wildcard keys.
//!
//! A `*` in a definition key matches one or more characters other than the
//! namespace separator `\`. Captures are substituted, in order, into the
//! class name of an object definition.

use regex::Regex;

pub const WILDCARD: char = '*';
pub const NAMESPACE_SEPARATOR: char = '\\';

const WILDCARD_CAPTURE: &str = r"([^\\]+)";

/// Whether a key is a wildcard key.
pub fn has_wildcard(key: &str) -> bool {
    key.contains(WILDCARD)
}

/// A wildcard key compiled into an anchored pattern.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    key: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compile `key`: literal segments are escaped, every `*` becomes a
    /// capture group, and the pattern must cover the whole name.
    pub fn compile(key: &str) -> Result<Self, regex::Error> {
        let body = key
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(WILDCARD_CAPTURE);
        let regex = Regex::new(&format!("^(?:{body})$"))?;
        Ok(Self {
            key: key.to_string(),
            regex,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Captured segments, one per `*`, left to right. `None` if the name does
    /// not match.
    pub fn captures(&self, name: &str) -> Option<Vec<String>> {
        let captures = self.regex.captures(name)?;
        Some(
            captures
                .iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }
}

/// Replace successive `*` markers in `template` with `replacements`.
///
/// Scanning resumes after each inserted replacement. Surplus replacements
/// are ignored; surplus markers are kept.
pub fn substitute_wildcards<S: AsRef<str>>(template: &str, replacements: &[S]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    for replacement in replacements {
        let Some(index) = rest.find(WILDCARD) else {
            break;
        };
        output.push_str(&rest[..index]);
        output.push_str(replacement.as_ref());
        rest = &rest[index + WILDCARD.len_utf8()..];
    }
    output.push_str(rest);
    output
}
