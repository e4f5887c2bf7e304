//! Single-key maps used for command targets and actuators.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::errors::MessageError;

/// A map that holds exactly one entry, as used by the `target` and
/// `actuator` fields of a command.
///
/// The key names the variant (a target type or actuator namespace); the value
/// carries variant-specific data of arbitrary shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    name: String,
    value: Value,
}

impl Choice {
    /// Creates a choice from its name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Builds a choice from a decoded map, enforcing the single-key rule.
    ///
    /// `field` names the command field for error messages.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Malformed`] when the map is empty or holds
    /// more than one key.
    pub fn from_map(field: &str, map: Map<String, Value>) -> Result<Self, MessageError> {
        if map.len() != 1 {
            return Err(MessageError::malformed(format!(
                "{field} must contain exactly one key, found {}",
                map.len()
            )));
        }
        map.into_iter()
            .next()
            .map(|(name, value)| Self { name, value })
            .ok_or_else(|| MessageError::malformed(format!("{field} must not be empty")))
    }

    /// Returns the variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the variant data.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the variant data as a map, when it is one.
    #[must_use]
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.value.as_object()
    }
}

impl Serialize for Choice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.value)?;
        map.end()
    }
}
