//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The gateway encodes request bodies and decodes response bodies through
//! this trait, so the rest of the stack never touches `serde_json` byte
//! handling directly.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` lets one codec instance be shared by every
/// gateway for the lifetime of the session context.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Converts an already-decoded payload into a typed value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the payload doesn't match `T`.
    fn from_value<T: DeserializeOwned>(&self, value: Value) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use realmgate_protocol::{Codec, Envelope, JsonCodec};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::ok(serde_json::json!({ "token": "t-1" }));
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    fn from_value<T: DeserializeOwned>(&self, value: Value) -> Result<T, ProtocolError> {
        serde_json::from_value(value).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TokenPayload {
        token: String,
    }

    #[test]
    fn test_decode_malformed_bytes_returns_decode_error() {
        let result: Result<Value, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_from_value_matching_shape_returns_typed_value() {
        let payload: TokenPayload = JsonCodec
            .from_value(json!({ "token": "abc" }))
            .expect("should decode");
        assert_eq!(payload.token, "abc");
    }

    #[test]
    fn test_from_value_wrong_shape_returns_decode_error() {
        let result: Result<TokenPayload, _> = JsonCodec.from_value(json!({ "tok": 1 }));
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
