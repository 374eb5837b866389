//! Error types for defreg kernel operations.

use crate::autowire::AutowireError;

/// Errors raised by registry construction, mutation, and lookup.
///
/// A lookup miss is not an error: it is reported as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The supplied map looks like a positional list rather than a
    /// name-keyed map. Raised before any state is touched.
    #[error("malformed definition map: positional key `{key}` is set; expected entry names as keys")]
    MalformedDefinitions { key: String },

    /// A wildcard key could not be compiled into a pattern.
    #[error("invalid wildcard key `{key}`: {source}")]
    WildcardPattern {
        key: String,
        #[source]
        source: regex::Error,
    },

    /// The source does not accept new definitions.
    #[error("definition source is read-only; cannot add `{name}`")]
    ReadOnlySource { name: String },

    /// Failure reported by the autowiring collaborator, passed through as-is.
    #[error(transparent)]
    Autowire(#[from] AutowireError),
}

/// Errors raised by factory callables.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("factory for `{name}` is missing parameter `{parameter}`")]
    MissingParameter { name: String, parameter: String },

    #[error("factory for `{name}` failed: {message}")]
    Failed { name: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autowire_errors_display_unchanged() {
        let inner = AutowireError::Disabled {
            name: "Logger".to_string(),
        };
        let expected = inner.to_string();
        let wrapped = RegistryError::from(inner);
        assert_eq!(wrapped.to_string(), expected);
    }

    #[test]
    fn malformed_message_names_the_key() {
        let err = RegistryError::MalformedDefinitions {
            key: "0".to_string(),
        };
        assert!(err.to_string().contains("`0`"));
    }
}
