//! Pub/sub event bus binding.
//!
//! Messages carry free-form string fields next to the payload. OpenC2
//! commands set `msgType=req` and `contentType=application/openc2`; the
//! encoding comes from `encoding` and defaults to JSON.
//!
//! Commands arrive either as events, answered with an event on the response
//! topic when a response is owed, or as service requests, which are always
//! answered.

use std::collections::BTreeMap;

use tracing::debug;

use super::TRANSPORT_TARGET;
use super::errors::BindingError;
use crate::consumer::{Consumer, Outbound};
use crate::serialization::JSON;

/// Field map attached to bus messages.
pub type EventFields = BTreeMap<String, String>;

/// `contentType` value of OpenC2 messages.
pub const CONTENT_TYPE: &str = "application/openc2";

/// Status text of the `400` sent for invalid event fields.
pub const MALFORMED_EVENT: &str = "Malformed Event Fields";

/// Status text of the `400` sent for invalid service request fields.
pub const MALFORMED_REQUEST: &str = "Malformed Request Fields";

const MSG_TYPE: &str = "msgType";
const CONTENT_TYPE_FIELD: &str = "contentType";
const ENCODING: &str = "encoding";

/// A message to send on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusReply {
    /// Topic to send an event to; `None` for service responses, which are
    /// routed back to the requester by the bus.
    pub topic: Option<String>,
    /// Message fields.
    pub fields: EventFields,
    /// Encoded response, empty when no response was owed.
    pub payload: Vec<u8>,
}

/// Extracts the encoding from command fields.
///
/// # Errors
///
/// Returns [`BindingError::MessageFields`] unless `msgType` is `req` and
/// `contentType` is `application/openc2`.
pub fn command_encoding(fields: &EventFields) -> Result<String, BindingError> {
    if fields.get(MSG_TYPE).map(String::as_str) != Some("req") {
        return Err(BindingError::MessageFields {
            reason: String::from("msgType must be req"),
        });
    }
    if fields.get(CONTENT_TYPE_FIELD).map(String::as_str) != Some(CONTENT_TYPE) {
        return Err(BindingError::MessageFields {
            reason: String::from("contentType must be application/openc2"),
        });
    }
    Ok(fields
        .get(ENCODING)
        .cloned()
        .unwrap_or_else(|| JSON.to_owned()))
}

/// Fields for a response in `encoding`.
#[must_use]
pub fn response_fields(encoding: &str) -> EventFields {
    EventFields::from([
        (MSG_TYPE.to_owned(), String::from("rsp")),
        (CONTENT_TYPE_FIELD.to_owned(), CONTENT_TYPE.to_owned()),
        (ENCODING.to_owned(), encoding.to_owned()),
    ])
}

/// Handles a command event.
///
/// Returns `None` when no response is owed; otherwise an event for the
/// configured response topic.
#[must_use]
pub fn handle_event(consumer: &Consumer, fields: &EventFields, payload: &[u8]) -> Option<BusReply> {
    let outbound = respond(consumer, fields, payload, MALFORMED_EVENT)?;
    Some(BusReply {
        topic: Some(consumer.config().pubsub.event_response_topic.clone()),
        fields: response_fields(&outbound.encoding),
        payload: outbound.payload,
    })
}

/// Handles a service request. A reply is always produced; its payload is
/// empty when no response is owed.
#[must_use]
pub fn handle_request(consumer: &Consumer, fields: &EventFields, payload: &[u8]) -> BusReply {
    respond(consumer, fields, payload, MALFORMED_REQUEST).map_or_else(
        || BusReply {
            topic: None,
            fields: EventFields::new(),
            payload: Vec::new(),
        },
        |outbound| BusReply {
            topic: None,
            fields: response_fields(&outbound.encoding),
            payload: outbound.payload,
        },
    )
}

fn respond(
    consumer: &Consumer,
    fields: &EventFields,
    payload: &[u8],
    malformed: &str,
) -> Option<Outbound> {
    match command_encoding(fields) {
        Ok(encoding) => consumer.process(payload, &encoding),
        Err(error) => {
            debug!(target: TRANSPORT_TARGET, %error, "rejected bus message");
            Some(consumer.malformed_transport(malformed))
        }
    }
}
