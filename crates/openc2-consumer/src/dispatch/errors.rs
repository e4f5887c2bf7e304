//! Error taxonomy for command dispatch.
//!
//! Every failure between decoding a payload and encoding the response is a
//! [`DispatchError`]. Each variant knows the [`StatusCode`] it is reported
//! with, so the consumer can always answer with a well-formed response.

use std::time::Duration;

use thiserror::Error;

use crate::message::{MessageError, Response, StatusCode};
use crate::registry::LookupError;
use crate::serialization::SerializationError;

/// Errors surfaced while dispatching a command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The envelope or command violates the message schema.
    #[error("Malformed OpenC2 message: {message}")]
    Malformed {
        /// Description of the violation.
        message: String,
    },

    /// The command is well formed but its contents are refused.
    #[error("{message}")]
    BadRequest {
        /// Reason shown to the producer.
        message: String,
    },

    /// The payload could not be decoded into a map.
    #[error("Deserialization failed: {message}")]
    Deserialization {
        /// Decoder failure.
        message: String,
    },

    /// No codec is registered for the payload's encoding.
    #[error("Invalid serialization protocol")]
    UnsupportedFormat {
        /// Requested format name.
        format: String,
    },

    /// Nothing handles the action-target pair.
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

    /// The handler failed or panicked.
    #[error("Actuator failed: {message}")]
    HandlerFailure {
        /// Failure description.
        message: String,
        /// Status configured for handler failures.
        status: StatusCode,
    },

    /// The handler declined the command.
    #[error("Not implemented: {message}")]
    NotImplemented {
        /// What is unsupported.
        message: String,
    },

    /// The response could not be encoded.
    #[error("Serialization failed: {message}")]
    Encoding {
        /// Encoder failure.
        message: String,
    },

    /// The worker pool refused the job.
    #[error("Consumer is busy: {message}")]
    Saturated {
        /// Pool failure description.
        message: String,
    },

    /// A synchronous handler did not finish in time.
    #[error("Actuator timed out after {} ms", .after.as_millis())]
    Timeout {
        /// Configured bound.
        after: Duration,
    },
}

impl DispatchError {
    /// Returns the response status this error is reported with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Malformed { .. }
            | Self::BadRequest { .. }
            | Self::Deserialization { .. }
            | Self::UnsupportedFormat { .. } => StatusCode::BadRequest,
            Self::NoMatchingPair { .. } | Self::NoMatchingActuator { .. } => StatusCode::NotFound,
            Self::HandlerFailure { status, .. } => *status,
            Self::NotImplemented { .. } => StatusCode::NotImplemented,
            Self::Encoding { .. } | Self::Timeout { .. } => StatusCode::InternalError,
            Self::Saturated { .. } => StatusCode::ServiceUnavailable,
        }
    }

    /// Returns `true` when the error response must be encoded as JSON
    /// regardless of the requested encoding.
    #[must_use]
    pub const fn forces_json(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. } | Self::Encoding { .. })
    }

    /// Converts the error into a response body.
    #[must_use]
    pub fn to_response(&self) -> Response {
        Response::new(self.status()).with_status_text(self.to_string())
    }

    /// Creates a malformed-message error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a bad-request error with a verbatim status text.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a handler failure reported with `status`.
    #[must_use]
    pub fn handler_failure(message: impl Into<String>, status: StatusCode) -> Self {
        Self::HandlerFailure {
            message: message.into(),
            status,
        }
    }
}

impl From<MessageError> for DispatchError {
    fn from(error: MessageError) -> Self {
        match error {
            MessageError::Malformed { message } => Self::Malformed { message },
            other @ MessageError::UnknownStatus { .. } => Self::malformed(other.to_string()),
        }
    }
}

impl From<LookupError> for DispatchError {
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::NoMatchingPair { action, target } => {
                Self::NoMatchingPair { action, target }
            }
            LookupError::NoMatchingActuator { actuator } => Self::NoMatchingActuator { actuator },
        }
    }
}

impl From<SerializationError> for DispatchError {
    fn from(error: SerializationError) -> Self {
        match error {
            SerializationError::UnsupportedFormat { format } => Self::UnsupportedFormat { format },
            SerializationError::Encode { .. } => Self::Encoding {
                message: error.to_string(),
            },
            SerializationError::Decode { .. } | SerializationError::NotAMap { .. } => {
                Self::Deserialization {
                    message: error.to_string(),
                }
            }
        }
    }
}
