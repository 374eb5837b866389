//! Autowiring collaborator seam.
//!
//! Casting turns an [`AutowireDefinition`] marker into a concrete definition
//! by asking an [`Autowiring`] implementation. The kernel has no type
//! metadata of its own, so the default collaborator declines every request.

use crate::definition::{AutowireDefinition, Definition};

/// Failures reported by an autowiring collaborator.
///
/// The registry forwards these to its caller without translation.
#[derive(Debug, thiserror::Error)]
pub enum AutowireError {
    #[error("cannot autowire entry `{name}`: autowiring is disabled")]
    Disabled { name: String },

    #[error("cannot autowire entry `{name}`: {reason}")]
    Unresolvable { name: String, reason: String },

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Infers an object definition for an entry that asked to be autowired.
pub trait Autowiring {
    /// Replace the autowire marker for `name` with a concrete definition.
    ///
    /// Explicit injections already present on `definition` should survive
    /// into the result.
    fn autowire(
        &self,
        name: &str,
        definition: AutowireDefinition,
    ) -> Result<Definition, AutowireError>;
}

/// Collaborator used when autowiring is turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAutowiring;

impl Autowiring for NoAutowiring {
    fn autowire(
        &self,
        name: &str,
        _definition: AutowireDefinition,
    ) -> Result<Definition, AutowireError> {
        Err(AutowireError::Disabled {
            name: name.to_string(),
        })
    }
}

impl<F> Autowiring for F
where
    F: Fn(&str, AutowireDefinition) -> Result<Definition, AutowireError>,
{
    fn autowire(
        &self,
        name: &str,
        definition: AutowireDefinition,
    ) -> Result<Definition, AutowireError> {
        self(name, definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_autowiring_declines() {
        let marker = AutowireDefinition::new("Mailer", None);
        let err = NoAutowiring.autowire("Mailer", marker).unwrap_err();
        assert!(matches!(err, AutowireError::Disabled { ref name } if name == "Mailer"));
    }

    #[test]
    fn closures_act_as_collaborators() {
        let autowiring = |_: &str, definition: AutowireDefinition| -> Result<Definition, AutowireError> {
            Ok(Definition::Object(definition.into_object()))
        };
        let marker = AutowireDefinition::new("Mailer", Some("SmtpMailer"));
        let definition = autowiring.autowire("Mailer", marker).unwrap();
        assert_eq!(
            definition.as_object().map(|object| object.class_name()),
            Some("SmtpMailer")
        );
    }
}
