//! Connection registry: the set of currently connected players.
//!
//! The registry is the only component with connection lifecycle
//! authority. It owns each player's outbound channel — the rest of the
//! lobby reaches a player's transport exclusively through here.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Instant;

use muster_protocol::{Hero, PlayerId, PlayerSummary, RoomId, ServerMessage};
use tokio::sync::mpsc;

/// Why a connection is being force-closed by moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Kicked,
    Banned,
}

impl CloseReason {
    /// The human-readable reason carried in the close frame.
    pub fn text(&self) -> &'static str {
        match self {
            Self::Kicked => "Kicked by admin",
            Self::Banned => "Banned by admin",
        }
    }
}

/// An event queued for a player's writer task.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Deliver an envelope.
    Message(ServerMessage),
    /// Close the connection with a policy close frame, then stop writing.
    Close { reason: CloseReason },
}

/// Sending half of a player's outbound queue.
///
/// Unbounded so fan-out from inside the lobby critical section never
/// blocks; the writer task on the other end drains it into the socket.
pub type PlayerSender = mpsc::UnboundedSender<Outbound>;

/// One connected player.
#[derive(Debug)]
pub struct Player {
    /// The player's lobby identity.
    pub id: PlayerId,
    /// The hero the client registered with.
    pub hero: Hero,
    /// Remote address, recorded for ban enforcement.
    pub addr: IpAddr,
    /// The room this player is currently in, if any. When set, the room's
    /// member list contains `id` — membership is always mutual.
    pub room: Option<RoomId>,
    /// When the player registered.
    pub connected_at: Instant,
    pub(crate) sender: PlayerSender,
}

impl Player {
    /// The roster entry broadcast in `player_list`.
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            id: self.id,
            hero: self.hero.clone(),
            in_game: self.room.is_some(),
        }
    }
}

/// Owns the set of currently connected players.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    players: HashMap<PlayerId, Player>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a player, or refreshes the hero of an existing entry.
    ///
    /// Re-registration keeps the player's room binding so membership
    /// never becomes one-sided.
    pub fn register(
        &mut self,
        id: PlayerId,
        hero: Hero,
        addr: IpAddr,
        sender: PlayerSender,
    ) {
        match self.players.get_mut(&id) {
            Some(existing) => {
                existing.hero = hero;
                existing.addr = addr;
                existing.sender = sender;
            }
            None => {
                self.players.insert(
                    id,
                    Player {
                        id,
                        hero,
                        addr,
                        room: None,
                        connected_at: Instant::now(),
                        sender,
                    },
                );
            }
        }
    }

    /// Removes a player. Idempotent — unknown ids are a no-op.
    pub fn unregister(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    /// Looks up a player.
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Returns `true` if the player is registered.
    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// Roster snapshot in join order (ids allocate in ascending order).
    pub fn snapshot(&self) -> Vec<PlayerSummary> {
        let mut summaries: Vec<PlayerSummary> =
            self.players.values().map(Player::summary).collect();
        summaries.sort_by_key(|s| s.id);
        summaries
    }

    /// Number of connected players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub(crate) fn sender_of(&self, id: PlayerId) -> Option<&PlayerSender> {
        self.players.get(&id).map(|p| &p.sender)
    }

    pub(crate) fn senders(
        &self,
    ) -> impl Iterator<Item = &PlayerSender> + '_ {
        self.players.values().map(|p| &p.sender)
    }
}
