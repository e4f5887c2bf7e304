//! Errors raised while unframing transport messages.

use thiserror::Error;

/// A transport message whose framing metadata is not valid for OpenC2.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingError {
    /// The HTTP `Content-Type` is missing or not an OpenC2 command type.
    #[error("invalid OpenC2 HTTP content type: {content_type:?}")]
    HttpContentType {
        /// Header value as received.
        content_type: Option<String>,
    },
    /// The MQTT publish properties do not describe an OpenC2 command.
    #[error("invalid OpenC2 MQTT properties: {reason}")]
    MqttProperties {
        /// What was wrong.
        reason: String,
    },
    /// The pub/sub message fields do not describe an OpenC2 command.
    #[error("invalid OpenC2 message fields: {reason}")]
    MessageFields {
        /// What was wrong.
        reason: String,
    },
}
