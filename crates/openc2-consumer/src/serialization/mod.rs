//! Pluggable payload serialization.
//!
//! The registry maps a format name (`json`, `cbor`, ...) to a [`Codec`].
//! Names are matched case-insensitively. JSON is always available; CBOR is
//! registered when the `cbor` feature is enabled.

mod codec;
mod errors;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

pub use self::codec::Codec;
#[cfg(feature = "cbor")]
pub use self::codec::CborCodec;
pub use self::codec::JsonCodec;
pub use self::errors::{CodecFailure, SerializationError};

use self::codec::FnCodec;

/// Tracing target for serialization operations.
pub(crate) const SERIALIZATION_TARGET: &str = module_path!();

/// Name of the JSON format.
pub const JSON: &str = "json";

/// Name of the CBOR format.
pub const CBOR: &str = "cbor";

/// Maps format names to codecs.
#[derive(Clone)]
pub struct SerializationRegistry {
    codecs: BTreeMap<String, Arc<dyn Codec>>,
}

impl SerializationRegistry {
    /// Creates a registry with no codecs at all, not even JSON.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            codecs: BTreeMap::new(),
        }
    }

    /// Registers a codec, replacing any codec already known by that name.
    pub fn register(&mut self, name: &str, codec: impl Codec + 'static) {
        let name = normalise(name);
        debug!(target: SERIALIZATION_TARGET, format = %name, "registered codec");
        self.codecs.insert(name, Arc::new(codec));
    }

    /// Registers a codec from a decode/encode function pair.
    pub fn register_fn<D, E>(&mut self, name: &str, decode: D, encode: E)
    where
        D: Fn(&[u8]) -> Result<Value, CodecFailure> + Send + Sync + 'static,
        E: Fn(&Map<String, Value>) -> Result<Vec<u8>, CodecFailure> + Send + Sync + 'static,
    {
        self.register(name, FnCodec { decode, encode });
    }

    /// Returns `true` when a codec is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(&normalise(name))
    }

    /// Registered format names in sorted order.
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }

    /// Decodes a payload into a generic map.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::UnsupportedFormat`] for unknown names,
    /// [`SerializationError::Decode`] when the codec rejects the bytes and
    /// [`SerializationError::NotAMap`] when the top-level value is not a map.
    pub fn decode(
        &self,
        name: &str,
        bytes: &[u8],
    ) -> Result<Map<String, Value>, SerializationError> {
        let (format, codec) = self.codec(name)?;
        match codec.decode(bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SerializationError::NotAMap { format }),
            Err(source) => Err(SerializationError::Decode { format, source }),
        }
    }

    /// Encodes a map.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::UnsupportedFormat`] for unknown names and
    /// [`SerializationError::Encode`] when the codec fails.
    pub fn encode(
        &self,
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<Vec<u8>, SerializationError> {
        let (format, codec) = self.codec(name)?;
        codec
            .encode(map)
            .map_err(|source| SerializationError::Encode { format, source })
    }

    fn codec(&self, name: &str) -> Result<(String, &Arc<dyn Codec>), SerializationError> {
        let format = normalise(name);
        match self.codecs.get(&format) {
            Some(codec) => Ok((format, codec)),
            None => Err(SerializationError::unsupported(name)),
        }
    }
}

impl Default for SerializationRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(JSON, JsonCodec);
        #[cfg(feature = "cbor")]
        registry.register(CBOR, CborCodec);
        registry
    }
}

impl fmt::Debug for SerializationRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SerializationRegistry")
            .field("formats", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Lowercases and trims a format name.
pub(crate) fn normalise(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
