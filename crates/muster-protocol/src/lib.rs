//! Wire protocol for Muster.
//!
//! This crate defines the language that lobby clients and the server
//! speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], identity newtypes,
//!   summaries) — the envelopes that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those envelopes are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! The protocol layer sits between transport (raw frames) and the lobby
//! (player and room state). It knows nothing about connections, rooms, or
//! moderation — only how envelopes are shaped.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientMessage, Hero, LobbyStats, PlayerBrief, PlayerId, PlayerSummary,
    RoomId, RoomStatus, RoomSummary, ServerMessage,
};
