//! Typed command bodies and their validation rules.
//!
//! Commands arrive as generic decoded maps. [`Command::from_value`] turns such
//! a map into a [`Command`] or reports a [`MessageError`]; it never panics,
//! whatever the input shape.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::choice::Choice;
use super::errors::MessageError;

const START_TIME: &str = "start_time";
const STOP_TIME: &str = "stop_time";
const DURATION: &str = "duration";
const RESPONSE_REQUESTED: &str = "response_requested";

const COMMAND_FIELDS: &[&str] = &["action", "target", "args", "actuator", "command_id"];

/// Response mode a producer asks for in `args.response_requested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseRequested {
    /// No response is wanted.
    None,
    /// Acknowledge receipt only.
    Ack,
    /// Report status once executed.
    Status,
    /// Report the complete result once executed.
    Complete,
}

impl ResponseRequested {
    /// Parses a wire value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "ack" => Some(Self::Ack),
            "status" => Some(Self::Status),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ack => "ack",
            Self::Status => "status",
            Self::Complete => "complete",
        }
    }
}

/// Command arguments.
///
/// Recognised fields are typed; any other key is kept in `extensions` and must
/// carry a map (profile-specific arguments).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    start_time: Option<u64>,
    stop_time: Option<u64>,
    duration: Option<u64>,
    response_requested: Option<ResponseRequested>,
    extensions: Map<String, Value>,
    null_fields: Vec<String>,
}

impl Args {
    /// Creates an argument set that only requests a response mode.
    #[must_use]
    pub fn with_response_requested(mode: ResponseRequested) -> Self {
        Self {
            response_requested: Some(mode),
            ..Self::default()
        }
    }

    /// Builds arguments from a decoded map.
    ///
    /// A `null` value counts as unset, though the key is still reported by
    /// [`Args::present_fields`].
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Malformed`] when a recognised field has the
    /// wrong type, an extension value is not a map, no field is set, or all
    /// three time fields are set together.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, MessageError> {
        let mut args = Self::default();
        for (key, value) in map {
            if value.is_null() && is_recognised(&key) {
                args.null_fields.push(key);
                continue;
            }
            match key.as_str() {
                START_TIME => args.start_time = Some(parse_time(START_TIME, &value)?),
                STOP_TIME => args.stop_time = Some(parse_time(STOP_TIME, &value)?),
                DURATION => args.duration = Some(parse_time(DURATION, &value)?),
                RESPONSE_REQUESTED => {
                    args.response_requested = Some(parse_response_requested(&value)?);
                }
                _ => {
                    if !value.is_object() {
                        return Err(MessageError::malformed(format!(
                            "value of extra argument '{key}' must be a map"
                        )));
                    }
                    args.extensions.insert(key, value);
                }
            }
        }

        if args.set_fields().is_empty() {
            return Err(MessageError::malformed(
                "args must have at least one argument if specified",
            ));
        }
        if args.start_time.is_some() && args.stop_time.is_some() && args.duration.is_some() {
            return Err(MessageError::malformed(
                "args can have at most two of [start_time, stop_time, duration]",
            ));
        }
        Ok(args)
    }

    /// Start of the execution window, in milliseconds since the epoch.
    #[must_use]
    pub const fn start_time(&self) -> Option<u64> {
        self.start_time
    }

    /// End of the execution window, in milliseconds since the epoch.
    #[must_use]
    pub const fn stop_time(&self) -> Option<u64> {
        self.stop_time
    }

    /// Length of the execution window, in milliseconds.
    #[must_use]
    pub const fn duration(&self) -> Option<u64> {
        self.duration
    }

    /// Requested response mode.
    #[must_use]
    pub const fn response_requested(&self) -> Option<ResponseRequested> {
        self.response_requested
    }

    /// Profile-specific argument maps keyed by namespace.
    #[must_use]
    pub const fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }

    /// Returns an extension argument by key.
    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&Map<String, Value>> {
        self.extensions.get(key).and_then(Value::as_object)
    }

    /// Names of every field that is set, recognised fields first.
    #[must_use]
    pub fn set_fields(&self) -> Vec<&str> {
        let recognised = [
            (START_TIME, self.start_time.is_some()),
            (STOP_TIME, self.stop_time.is_some()),
            (DURATION, self.duration.is_some()),
            (RESPONSE_REQUESTED, self.response_requested.is_some()),
        ];
        recognised
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .chain(self.extensions.keys().map(String::as_str))
            .collect()
    }

    /// Names of every field the producer sent, including recognised fields
    /// sent as `null`.
    #[must_use]
    pub fn present_fields(&self) -> Vec<&str> {
        let mut fields = self.set_fields();
        fields.extend(self.null_fields.iter().map(String::as_str));
        fields
    }
}

impl Serialize for Args {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(start_time) = self.start_time {
            map.serialize_entry(START_TIME, &start_time)?;
        }
        if let Some(stop_time) = self.stop_time {
            map.serialize_entry(STOP_TIME, &stop_time)?;
        }
        if let Some(duration) = self.duration {
            map.serialize_entry(DURATION, &duration)?;
        }
        if let Some(mode) = self.response_requested {
            map.serialize_entry(RESPONSE_REQUESTED, mode.as_str())?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn is_recognised(key: &str) -> bool {
    matches!(key, START_TIME | STOP_TIME | DURATION | RESPONSE_REQUESTED)
}

fn parse_time(field: &str, value: &Value) -> Result<u64, MessageError> {
    value.as_u64().ok_or_else(|| {
        MessageError::malformed(format!("{field} must be a non-negative integer"))
    })
}

fn parse_response_requested(value: &Value) -> Result<ResponseRequested, MessageError> {
    value
        .as_str()
        .and_then(ResponseRequested::parse)
        .ok_or_else(|| {
            MessageError::malformed("response_requested must be one of none, ack, status, complete")
        })
}

/// A validated OpenC2 command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    action: String,
    target: Choice,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<Args>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actuator: Option<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command_id: Option<String>,
}

impl Command {
    /// Creates a command with the given action and target.
    #[must_use]
    pub fn new(action: impl Into<String>, target: Choice) -> Self {
        Self {
            action: action.into(),
            target,
            args: None,
            actuator: None,
            command_id: None,
        }
    }

    /// Attaches arguments.
    #[must_use]
    pub fn with_args(mut self, args: Args) -> Self {
        self.args = Some(args);
        self
    }

    /// Addresses the command to an actuator namespace.
    #[must_use]
    pub fn with_actuator(mut self, actuator: Choice) -> Self {
        self.actuator = Some(actuator);
        self
    }

    /// Validates a decoded command body.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Malformed`] when the value is not a map, has
    /// unknown keys, lacks a non-empty `action`, has a `target` or `actuator`
    /// that is not a single-key map, or carries invalid `args`.
    pub fn from_value(value: Value) -> Result<Self, MessageError> {
        let Value::Object(mut map) = value else {
            return Err(MessageError::malformed("command must be a map"));
        };
        if let Some(unknown) = map.keys().find(|key| !COMMAND_FIELDS.contains(&key.as_str())) {
            return Err(MessageError::malformed(format!(
                "unexpected field '{unknown}' in command"
            )));
        }

        let action = match map.remove("action") {
            Some(Value::String(action)) if !action.trim().is_empty() => action,
            Some(Value::String(_)) => {
                return Err(MessageError::malformed("action must not be empty"));
            }
            Some(_) => return Err(MessageError::malformed("action must be a string")),
            None => return Err(MessageError::malformed("command is missing an action")),
        };

        let target = match map.remove("target") {
            Some(Value::Object(target)) => Choice::from_map("target", target)?,
            Some(_) => return Err(MessageError::malformed("target must be a map")),
            None => return Err(MessageError::malformed("command is missing a target")),
        };

        let args = match map.remove("args") {
            None | Some(Value::Null) => None,
            Some(Value::Object(args)) => Some(Args::from_map(args)?),
            Some(_) => return Err(MessageError::malformed("args must be a map")),
        };

        let actuator = match map.remove("actuator") {
            None | Some(Value::Null) => None,
            Some(Value::Object(actuator)) => {
                let actuator = Choice::from_map("actuator", actuator)?;
                if !actuator.value().is_object() {
                    return Err(MessageError::malformed(format!(
                        "actuator '{}' specifiers must be a map",
                        actuator.name()
                    )));
                }
                Some(actuator)
            }
            Some(_) => return Err(MessageError::malformed("actuator must be a map")),
        };

        let command_id = match map.remove("command_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id),
            Some(_) => return Err(MessageError::malformed("command_id must be a string")),
        };

        Ok(Self {
            action,
            target,
            args,
            actuator,
            command_id,
        })
    }

    /// The action verb.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// The target choice.
    #[must_use]
    pub const fn target(&self) -> &Choice {
        &self.target
    }

    /// The target type name.
    #[must_use]
    pub fn target_name(&self) -> &str {
        self.target.name()
    }

    /// The arguments, if any were sent.
    #[must_use]
    pub const fn args(&self) -> Option<&Args> {
        self.args.as_ref()
    }

    /// The actuator choice, if the command names one.
    #[must_use]
    pub const fn actuator(&self) -> Option<&Choice> {
        self.actuator.as_ref()
    }

    /// The actuator namespace, if the command names one.
    #[must_use]
    pub fn actuator_name(&self) -> Option<&str> {
        self.actuator.as_ref().map(Choice::name)
    }

    /// The command identifier, if any.
    #[must_use]
    pub fn command_id(&self) -> Option<&str> {
        self.command_id.as_deref()
    }

    /// The requested response mode, if the producer set one.
    #[must_use]
    pub fn response_requested(&self) -> Option<ResponseRequested> {
        self.args.as_ref().and_then(Args::response_requested)
    }
}
