//! Session and room coordination core for Muster.
//!
//! This crate owns every piece of lobby state with an invariant to
//! protect under concurrent client input:
//!
//! - [`ConnectionRegistry`] — who is connected, with exclusive ownership
//!   of each player's outbound channel
//! - [`GameRoomDirectory`] — room creation, membership, host migration,
//!   teardown
//! - [`BanList`] — addresses denied at accept time
//! - [`BroadcastEngine`] — best-effort global and room-scoped fan-out
//! - [`Lobby`] — the coordinator that composes all of the above behind
//!   operation-level methods
//!
//! # Concurrency note
//!
//! `Lobby` is NOT thread-safe by itself — plain `HashMap`s, no interior
//! locking. This is intentional: the server wraps one `Lobby` in a single
//! `tokio::sync::Mutex` and every inbound envelope runs to completion
//! inside one critical section, which serializes all registry/directory
//! mutation without fine-grained locks. Broadcasts only enqueue onto
//! per-player unbounded channels, so no network I/O ever happens while
//! the lock is held.

mod banlist;
mod broadcast;
mod directory;
mod error;
mod id;
mod lobby;
mod moderation;
mod registry;

pub use banlist::BanList;
pub use broadcast::BroadcastEngine;
pub use directory::{
    GameRoomDirectory, LeaveOutcome, Room, ROOM_CAPACITY,
};
pub use error::LobbyError;
pub use id::{next_player_id, next_room_id};
pub use lobby::Lobby;
pub use registry::{
    CloseReason, ConnectionRegistry, Outbound, Player, PlayerSender,
};
