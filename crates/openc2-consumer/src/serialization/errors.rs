//! Errors raised by the serialization registry.

use thiserror::Error;

/// Failure reported by a codec implementation.
pub type CodecFailure = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced while encoding or decoding payloads.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// No codec is registered under the requested name.
    #[error("unsupported serialization format '{format}'")]
    UnsupportedFormat {
        /// Requested format name.
        format: String,
    },

    /// The codec could not parse the payload.
    #[error("failed to decode {format} payload: {source}")]
    Decode {
        /// Format that was used.
        format: String,
        /// Codec failure.
        #[source]
        source: CodecFailure,
    },

    /// The payload decoded to something other than a map.
    #[error("{format} payload is not a map")]
    NotAMap {
        /// Format that was used.
        format: String,
    },

    /// The codec could not encode the value.
    #[error("failed to encode {format} payload: {source}")]
    Encode {
        /// Format that was used.
        format: String,
        /// Codec failure.
        #[source]
        source: CodecFailure,
    },
}

impl SerializationError {
    /// Creates an unsupported format error.
    #[must_use]
    pub fn unsupported(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Returns `true` when the requested format is unknown.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. })
    }
}
