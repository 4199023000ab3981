//! Unified error type for the Muster server.

use muster_protocol::ProtocolError;
use muster_transport::TransportError;

/// Top-level error that wraps the layer-specific errors.
///
/// Nothing here is fatal to a running lobby: a single connection's
/// failure stays inside its handler task. These surface when building
/// the server (bind failures) or from a handler's own transport.
#[derive(Debug, thiserror::Error)]
pub enum MusterError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An I/O error from the HTTP companion listener.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let top: MusterError = err.into();
        assert!(matches!(top, MusterError::Transport(_)));
        assert!(top.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        use muster_protocol::{Codec, JsonCodec, ServerMessage};
        let err = JsonCodec
            .decode::<ServerMessage>(b"garbage")
            .unwrap_err();
        let top: MusterError = err.into();
        assert!(matches!(top, MusterError::Protocol(_)));
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "busy",
        );
        let top: MusterError = err.into();
        assert!(matches!(top, MusterError::Io(_)));
    }
}
