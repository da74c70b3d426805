//! Error types for the protocol layer.
//!
//! Each crate in Realmgate defines its own error enum. When you see a
//! `ProtocolError`, the problem is in serialization or in the shape of a
//! wire value, not in networking or session state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes or a JSON value into a
    /// Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// payload that doesn't match the type the caller asked for.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A navigation target that can't be used as a redirect.
    #[error("invalid location: {0}")]
    InvalidLocation(String),
}
