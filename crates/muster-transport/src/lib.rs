//! Transport abstraction layer for Muster.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the network protocol carrying lobby envelopes. The lobby core never
//! touches sockets directly — it only sees connections that can send and
//! receive byte frames and report the peer's address (needed for ban
//! checks at accept time).
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

/// WebSocket close code sent when a connection is terminated by policy
/// (kick/ban). Matches RFC 6455 "policy violation".
pub const POLICY_CLOSE_CODE: u16 = 1008;

/// Opaque identifier for a connection.
///
/// Distinct from a player identity: a connection exists from TCP accept
/// onward, while a player only exists once the client registers a hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Gracefully shuts down the transport, stopping new connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// A single connection that can send and receive byte frames.
///
/// Implementations must allow `send` and `recv` to proceed concurrently
/// from different tasks: the lobby drives one reader loop per connection
/// while a separate writer task drains the outbound queue.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection without a stated reason.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Closes the connection with a close code and human-readable reason,
    /// e.g. a policy close for kicked or banned peers.
    async fn close_with(
        &self,
        code: u16,
        reason: &str,
    ) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the remote peer's socket address.
    fn peer_addr(&self) -> SocketAddr;
}
