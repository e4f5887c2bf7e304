//! Errors raised while validating OpenC2 messages.

use thiserror::Error;

/// Schema violations found while turning a decoded map into typed messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageError {
    /// The envelope or command does not have the required shape.
    #[error("{message}")]
    Malformed {
        /// Description of the violation.
        message: String,
    },
    /// A status code outside the OpenC2 table.
    #[error("unknown status code {code}")]
    UnknownStatus {
        /// Offending code.
        code: u16,
    },
}

impl MessageError {
    /// Creates a malformed-message error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}
