//! Command and response envelopes.
//!
//! Both envelopes share the `{headers, body: {openc2: {...}}}` layout and
//! differ only in whether the innermost key is `request` or `response`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::command::Command;
use super::errors::MessageError;
use super::response::Response;

const ENVELOPE_FIELDS: &[&str] = &["headers", "body"];

/// Recipients named in `headers.to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    /// A single recipient.
    One(String),
    /// Several recipients.
    Many(Vec<String>),
}

impl From<String> for Recipients {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<&str> for Recipients {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

/// Envelope headers.
///
/// Absent fields are omitted when serialised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Headers {
    /// Correlates a response with the command that caused it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Creation time in milliseconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    /// Sender identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Intended recipients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Recipients>,
}

impl Headers {
    fn from_value(value: Value) -> Result<Self, MessageError> {
        serde_json::from_value(value)
            .map_err(|error| MessageError::malformed(format!("invalid headers: {error}")))
    }
}

/// A validated command envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMessage {
    /// Envelope headers.
    pub headers: Headers,
    /// The command carried in `body.openc2.request`.
    pub command: Command,
}

impl CommandMessage {
    /// Wraps a command in an envelope.
    #[must_use]
    pub const fn new(headers: Headers, command: Command) -> Self {
        Self { headers, command }
    }

    /// Validates a decoded envelope.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Malformed`] when `headers` or `body` is missing,
    /// either has the wrong shape, the envelope carries unknown keys, or the
    /// body does not hold exactly `{openc2: {request: ...}}` with a valid
    /// command.
    pub fn from_map(mut map: Map<String, Value>) -> Result<Self, MessageError> {
        if let Some(unknown) = map.keys().find(|key| !ENVELOPE_FIELDS.contains(&key.as_str())) {
            return Err(MessageError::malformed(format!(
                "unexpected field '{unknown}' in message"
            )));
        }
        let headers = map
            .remove("headers")
            .ok_or_else(|| MessageError::malformed("message is missing headers"))?;
        let body = map
            .remove("body")
            .ok_or_else(|| MessageError::malformed("message is missing a body"))?;

        let headers = Headers::from_value(headers)?;
        let request = single_entry(body, "body", "openc2")
            .and_then(|openc2| single_entry(openc2, "openc2", "request"))?;
        let command = Command::from_value(request)?;
        Ok(Self { headers, command })
    }

    /// Reads headers from a decoded map without validating the command.
    ///
    /// Error responses use this so they can still address the requester when
    /// the body is invalid. Returns `None` when the headers are absent or
    /// malformed.
    #[must_use]
    pub fn peek_headers(map: &Map<String, Value>) -> Option<Headers> {
        map.get("headers")
            .cloned()
            .and_then(|value| Headers::from_value(value).ok())
    }
}

impl Serialize for CommandMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_envelope(serializer, &self.headers, "request", &self.command)
    }
}

/// A response envelope ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMessage {
    /// Envelope headers.
    pub headers: Headers,
    /// The response carried in `body.openc2.response`.
    pub response: Response,
}

impl ResponseMessage {
    /// Wraps a response in an envelope.
    #[must_use]
    pub const fn new(headers: Headers, response: Response) -> Self {
        Self { headers, response }
    }

    /// Converts the envelope into a generic map for encoding.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Malformed`] if a result value cannot be
    /// represented as a map entry.
    pub fn to_map(&self) -> Result<Map<String, Value>, MessageError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(MessageError::malformed("response envelope is not a map")),
            Err(error) => Err(MessageError::malformed(error.to_string())),
        }
    }
}

impl Serialize for ResponseMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_envelope(serializer, &self.headers, "response", &self.response)
    }
}

fn single_entry(value: Value, field: &str, key: &str) -> Result<Value, MessageError> {
    let Value::Object(mut map) = value else {
        return Err(MessageError::malformed(format!("{field} must be a map")));
    };
    let inner = map
        .remove(key)
        .ok_or_else(|| MessageError::malformed(format!("{field} must contain '{key}'")))?;
    if let Some(extra) = map.keys().next() {
        return Err(MessageError::malformed(format!(
            "unexpected field '{extra}' in {field}"
        )));
    }
    Ok(inner)
}

fn serialize_envelope<S, T>(
    serializer: S,
    headers: &Headers,
    kind: &'static str,
    inner: &T,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    struct Single<'a, T>(&'static str, &'a T);

    impl<T: Serialize> Serialize for Single<'_, T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(self.0, self.1)?;
            map.end()
        }
    }

    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry("headers", headers)?;
    map.serialize_entry("body", &Single("openc2", &Single(kind, inner)))?;
    map.end()
}
