//! Response status codes and their canonical descriptions.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use super::errors::MessageError;

/// Status of an OpenC2 response, carried on the wire as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 102: the command was accepted but has not completed.
    Processing,
    /// 200: the command succeeded.
    Ok,
    /// 400: the command is malformed or otherwise the producer's fault.
    BadRequest,
    /// 401: credentials are missing or were refused.
    Unauthorized,
    /// 403: the consumer refuses to authorise the command.
    Forbidden,
    /// 404: nothing matched the command.
    NotFound,
    /// 500: an unexpected condition prevented execution.
    InternalError,
    /// 501: the functionality is not supported.
    NotImplemented,
    /// 503: the consumer is temporarily unable to execute commands.
    ServiceUnavailable,
}

impl StatusCode {
    /// Returns the numeric code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Processing => 102,
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::InternalError => 500,
            Self::NotImplemented => 501,
            Self::ServiceUnavailable => 503,
        }
    }

    /// Returns the canonical status sentence used when a response carries no
    /// explicit status text.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Processing => {
                "Processing - an interim Response used to inform the Producer that the Consumer \
                 has accepted the Command but has not yet completed it."
            }
            Self::Ok => "OK - the Command has succeeded.",
            Self::BadRequest => {
                "Bad Request - the Consumer cannot process the Command due to something that is \
                 perceived to be a Producer error (e.g., malformed Command syntax)."
            }
            Self::Unauthorized => {
                "Unauthorized - the Command Message lacks valid authentication credentials for the \
                 target resource or authorization has been refused for the submitted credentials."
            }
            Self::Forbidden => {
                "Forbidden - the Consumer understood the Command but refuses to authorize it."
            }
            Self::NotFound => "Not Found - the Consumer has not found anything matching the Command.",
            Self::InternalError => {
                "Internal Error - the Consumer encountered an unexpected condition that prevented \
                 it from performing the Command."
            }
            Self::NotImplemented => {
                "Not Implemented - the Consumer does not support the functionality required to \
                 perform the Command."
            }
            Self::ServiceUnavailable => {
                "Service Unavailable - the Consumer is currently unable to perform the Command due \
                 to a temporary overloading or maintenance of the Consumer."
            }
        }
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = MessageError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            102 => Ok(Self::Processing),
            200 => Ok(Self::Ok),
            400 => Ok(Self::BadRequest),
            401 => Ok(Self::Unauthorized),
            403 => Ok(Self::Forbidden),
            404 => Ok(Self::NotFound),
            500 => Ok(Self::InternalError),
            501 => Ok(Self::NotImplemented),
            503 => Ok(Self::ServiceUnavailable),
            other => Err(MessageError::UnknownStatus { code: other }),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.code())
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u16::deserialize(deserializer)?;
        Self::try_from(code).map_err(de::Error::custom)
    }
}
