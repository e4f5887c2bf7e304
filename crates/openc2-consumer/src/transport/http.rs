//! HTTP binding: content negotiation and reply framing.
//!
//! Commands are `POST`ed with `Content-Type:
//! application/openc2-cmd+<fmt>;version=1.0`. Replies carry
//! `application/openc2-rsp+<fmt>;version=1.0`, or `204 No Content` when no
//! response is owed.

use tracing::debug;

use super::TRANSPORT_TARGET;
use super::errors::BindingError;
use crate::consumer::{Consumer, Outbound};

const COMMAND_PREFIX: &str = "application/openc2-cmd+";
const RESPONSE_PREFIX: &str = "application/openc2-rsp+";
const VERSION_SUFFIX: &str = ";version=1.0";

/// Status text of the `400` sent for invalid HTTP framing.
pub const MALFORMED_REQUEST: &str = "Malformed HTTP Request";

/// A framed HTTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, absent for `204`.
    pub content_type: Option<String>,
    /// Reply body.
    pub body: Vec<u8>,
}

impl HttpReply {
    fn from_outbound(outbound: Outbound) -> Self {
        Self {
            status: 200,
            content_type: Some(response_content_type(&outbound.encoding)),
            body: outbound.payload,
        }
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            content_type: None,
            body: Vec::new(),
        }
    }
}

/// Extracts the encoding from a command `Content-Type`.
///
/// The whole header must equal `application/openc2-cmd+<fmt>;version=1.0`
/// for a non-empty `<fmt>`.
///
/// # Errors
///
/// Returns [`BindingError::HttpContentType`] for anything else.
pub fn command_encoding(content_type: &str) -> Result<String, BindingError> {
    content_type
        .strip_prefix(COMMAND_PREFIX)
        .and_then(|rest| rest.strip_suffix(VERSION_SUFFIX))
        .filter(|encoding| is_token(encoding))
        .map(str::to_owned)
        .ok_or_else(|| BindingError::HttpContentType {
            content_type: Some(content_type.to_owned()),
        })
}

/// Formats the response `Content-Type` for `encoding`.
#[must_use]
pub fn response_content_type(encoding: &str) -> String {
    format!("{RESPONSE_PREFIX}{encoding}{VERSION_SUFFIX}")
}

/// Handles one `POST`ed command.
///
/// Invalid framing yields a JSON `400 Malformed HTTP Request` reply without
/// consulting the dispatcher.
#[must_use]
pub fn handle(consumer: &Consumer, content_type: Option<&str>, body: &[u8]) -> HttpReply {
    let encoding = content_type
        .ok_or(BindingError::HttpContentType { content_type: None })
        .and_then(command_encoding);
    let encoding = match encoding {
        Ok(encoding) => encoding,
        Err(error) => {
            debug!(target: TRANSPORT_TARGET, %error, "rejected HTTP request");
            return HttpReply::from_outbound(consumer.malformed_transport(MALFORMED_REQUEST));
        }
    };
    consumer
        .process(body, &encoding)
        .map_or_else(HttpReply::no_content, HttpReply::from_outbound)
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '.' | '_'))
}
