//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding envelopes.
///
/// A `Decode` error on an inbound frame is a protocol error in the lobby's
/// taxonomy: the frame is dropped and logged, the connection stays open.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed — malformed JSON, missing required fields,
    /// or an unrecognized envelope discriminant.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
