//! MQTT v5 binding: publish property checks and reply framing.

use openc2_config::TopicQos;
use tracing::debug;

use super::TRANSPORT_TARGET;
use super::errors::BindingError;
use crate::consumer::{Consumer, Outbound};

/// `Content-Type` property of OpenC2 publishes.
pub const CONTENT_TYPE: &str = "application/openc2";

/// Status text of the `400` sent for invalid publish properties.
pub const MALFORMED_PROPERTIES: &str = "Malformed MQTT Properties";

const MSG_TYPE: &str = "msgType";
const ENCODING: &str = "encoding";
const REQUEST: &str = "req";
const RESPONSE: &str = "rsp";

/// The MQTT v5 publish properties OpenC2 relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MqttProperties {
    /// `Payload Format Indicator`.
    pub payload_format_indicator: Option<u8>,
    /// `Content Type`.
    pub content_type: Option<String>,
    /// `User Property` pairs in wire order.
    pub user_properties: Vec<(String, String)>,
}

impl MqttProperties {
    /// Properties for a command publish in `encoding`.
    #[must_use]
    pub fn command(encoding: &str) -> Self {
        Self::openc2(REQUEST, encoding)
    }

    fn openc2(msg_type: &str, encoding: &str) -> Self {
        Self {
            payload_format_indicator: Some(1),
            content_type: Some(CONTENT_TYPE.to_owned()),
            user_properties: vec![
                (MSG_TYPE.to_owned(), msg_type.to_owned()),
                (ENCODING.to_owned(), encoding.to_owned()),
            ],
        }
    }
}

/// A response ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttReply {
    /// Topics and QoS levels to publish to.
    pub publications: Vec<TopicQos>,
    /// Publish properties.
    pub properties: MqttProperties,
    /// Encoded response.
    pub payload: Vec<u8>,
}

/// Extracts the encoding from command publish properties.
///
/// The payload format indicator must be `1`, the content type
/// `application/openc2`, and the user properties exactly
/// `[(msgType, req), (encoding, <fmt>)]`.
///
/// # Errors
///
/// Returns [`BindingError::MqttProperties`] when any of these fails.
pub fn command_encoding(properties: &MqttProperties) -> Result<String, BindingError> {
    let invalid = |reason: &str| BindingError::MqttProperties {
        reason: reason.to_owned(),
    };
    if properties.payload_format_indicator != Some(1) {
        return Err(invalid("payload format indicator must be 1"));
    }
    if properties.content_type.as_deref() != Some(CONTENT_TYPE) {
        return Err(invalid("content type must be application/openc2"));
    }
    match properties.user_properties.as_slice() {
        [(msg_type, request), (encoding, format)]
            if msg_type == MSG_TYPE && request == REQUEST && encoding == ENCODING && !format.is_empty() =>
        {
            Ok(format.clone())
        }
        _ => Err(invalid("user properties must be [(msgType, req), (encoding, <fmt>)]")),
    }
}

/// Publish properties for a response in `encoding`.
#[must_use]
pub fn response_properties(encoding: &str) -> MqttProperties {
    MqttProperties::openc2(RESPONSE, encoding)
}

/// Handles one command publish.
///
/// Returns `None` when no response is owed. Invalid properties yield a JSON
/// `400 Malformed MQTT Properties` reply.
#[must_use]
pub fn handle(consumer: &Consumer, properties: &MqttProperties, payload: &[u8]) -> Option<MqttReply> {
    let outbound = match command_encoding(properties) {
        Ok(encoding) => consumer.process(payload, &encoding)?,
        Err(error) => {
            debug!(target: TRANSPORT_TARGET, %error, "rejected MQTT publish");
            consumer.malformed_transport(MALFORMED_PROPERTIES)
        }
    };
    Some(reply(consumer, outbound))
}

fn reply(consumer: &Consumer, outbound: Outbound) -> MqttReply {
    MqttReply {
        publications: consumer.config().mqtt.publications.clone(),
        properties: response_properties(&outbound.encoding),
        payload: outbound.payload,
    }
}
