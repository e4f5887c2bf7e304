//! Codec trait and the built-in codecs.

use serde_json::{Map, Value};

use super::errors::CodecFailure;

/// Encodes and decodes generic maps for one wire format.
pub trait Codec: Send + Sync {
    /// Parses bytes into a generic value.
    ///
    /// # Errors
    ///
    /// Returns the codec's own failure when the bytes are not valid in this
    /// format.
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecFailure>;

    /// Serialises a map into bytes.
    ///
    /// # Errors
    ///
    /// Returns the codec's own failure when the map cannot be represented.
    fn encode(&self, map: &Map<String, Value>) -> Result<Vec<u8>, CodecFailure>;
}

/// Codec assembled from a pair of functions.
pub(crate) struct FnCodec<D, E> {
    pub(crate) decode: D,
    pub(crate) encode: E,
}

impl<D, E> Codec for FnCodec<D, E>
where
    D: Fn(&[u8]) -> Result<Value, CodecFailure> + Send + Sync,
    E: Fn(&Map<String, Value>) -> Result<Vec<u8>, CodecFailure> + Send + Sync,
{
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecFailure> {
        (self.decode)(bytes)
    }

    fn encode(&self, map: &Map<String, Value>) -> Result<Vec<u8>, CodecFailure> {
        (self.encode)(map)
    }
}

/// JSON codec, always registered as `json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecFailure> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn encode(&self, map: &Map<String, Value>) -> Result<Vec<u8>, CodecFailure> {
        Ok(serde_json::to_vec(map)?)
    }
}

/// CBOR codec, registered as `cbor` when the `cbor` feature is enabled.
#[cfg(feature = "cbor")]
#[derive(Debug, Default, Clone, Copy)]
pub struct CborCodec;

#[cfg(feature = "cbor")]
impl Codec for CborCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecFailure> {
        Ok(serde_cbor::from_slice(bytes)?)
    }

    fn encode(&self, map: &Map<String, Value>) -> Result<Vec<u8>, CodecFailure> {
        Ok(serde_cbor::to_vec(map)?)
    }
}
