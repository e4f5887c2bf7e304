//! Response bodies.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::status::StatusCode;

/// The body of an OpenC2 response.
///
/// `status_text` is optional here; serialisation falls back to the canonical
/// sentence for the status code, so encoded responses always carry one.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    status_text: Option<String>,
    results: Option<Map<String, Value>>,
}

impl Response {
    /// Creates a response with the given status and no text or results.
    #[must_use]
    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            status_text: None,
            results: None,
        }
    }

    /// Shorthand for a 200 response.
    #[must_use]
    pub const fn ok() -> Self {
        Self::new(StatusCode::Ok)
    }

    /// Sets an explicit status text.
    #[must_use]
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    /// Replaces the result map.
    #[must_use]
    pub fn with_results(mut self, results: Map<String, Value>) -> Self {
        self.results = Some(results);
        self
    }

    /// Adds a single result entry.
    #[must_use]
    pub fn with_result(mut self, key: impl Into<String>, value: Value) -> Self {
        self.results
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Fills in the canonical status text when none was set.
    #[must_use]
    pub fn with_canonical_text(mut self) -> Self {
        if self.status_text.is_none() {
            self.status_text = Some(self.status.text().to_owned());
        }
        self
    }

    /// The status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The status text, falling back to the canonical sentence.
    #[must_use]
    pub fn status_text(&self) -> &str {
        self.status_text
            .as_deref()
            .unwrap_or_else(|| self.status.text())
    }

    /// Returns `true` when the text was set explicitly.
    #[must_use]
    pub const fn has_explicit_text(&self) -> bool {
        self.status_text.is_some()
    }

    /// The result map, if any.
    #[must_use]
    pub const fn results(&self) -> Option<&Map<String, Value>> {
        self.results.as_ref()
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry("status_text", self.status_text())?;
        if let Some(results) = &self.results {
            map.serialize_entry("results", results)?;
        }
        map.end()
    }
}
