//! Errors raised while building and querying the handler registry.

use thiserror::Error;

/// Registration failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A handler is already registered for the triple and duplicates are
    /// rejected.
    #[error("handler already registered for {actuator}/{action}/{target}")]
    Duplicate {
        /// Actuator namespace.
        actuator: String,
        /// Action verb.
        action: String,
        /// Target type.
        target: String,
    },
    /// The pair is served by the consumer itself.
    #[error("'{action} {target}' is reserved by the consumer")]
    Reserved {
        /// Action verb.
        action: String,
        /// Target type.
        target: String,
    },
    /// A name component was empty.
    #[error("{field} must not be empty")]
    EmptyName {
        /// Which component was empty.
        field: &'static str,
    },
}

/// Outcomes of a failed lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// No actuator handles the action-target pair.
    #[error("No matching action-target pair: {action} {target}")]
    NoMatchingPair {
        /// Action verb.
        action: String,
        /// Target type.
        target: String,
    },
    /// The pair exists, but not under the requested actuator.
    #[error("No matching actuator found: {actuator}")]
    NoMatchingActuator {
        /// Requested actuator namespace.
        actuator: String,
    },
}
