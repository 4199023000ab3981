//! The lobby coordinator: every mutation of player and room state enters
//! through here.
//!
//! Each method corresponds to one inbound envelope (or to the disconnect
//! cascade) and runs to completion — state change first, then the
//! resulting broadcasts — before the caller releases the surrounding
//! lock. Broadcasts enqueue onto per-player channels and never block.

use std::net::IpAddr;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use muster_protocol::{
    Hero, LobbyStats, PlayerBrief, PlayerId, PlayerSummary, RoomId,
    RoomSummary, ServerMessage,
};

use crate::broadcast::BroadcastEngine;
use crate::directory::{GameRoomDirectory, LeaveOutcome};
use crate::registry::{ConnectionRegistry, PlayerSender};
use crate::{BanList, LobbyError};

/// Milliseconds since the unix epoch, for wire timestamps.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// The session/room coordinator.
///
/// Owns the [`ConnectionRegistry`], [`GameRoomDirectory`] and
/// [`BanList`]; nothing outside this struct holds a mutable handle to
/// any of them.
pub struct Lobby {
    registry: ConnectionRegistry,
    directory: GameRoomDirectory,
    bans: BanList,
    started_at: Instant,
}

impl Lobby {
    /// Creates an empty lobby.
    pub fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            directory: GameRoomDirectory::new(),
            bans: BanList::new(),
            started_at: Instant::now(),
        }
    }

    fn fanout(&self) -> BroadcastEngine<'_> {
        BroadcastEngine::new(&self.registry)
    }

    fn broadcast_player_list(&self) {
        self.fanout().global(&ServerMessage::PlayerList {
            players: self.registry.snapshot(),
        });
    }

    // -- Connection lifecycle ----------------------------------------------

    /// Whether connections from this address are rejected at accept time.
    pub fn is_banned(&self, addr: IpAddr) -> bool {
        self.bans.contains(addr)
    }

    /// Enters a player into the roster and announces the updated list.
    ///
    /// Re-registering an existing id refreshes the hero in place.
    pub fn register(
        &mut self,
        id: PlayerId,
        hero: Hero,
        addr: IpAddr,
        sender: PlayerSender,
    ) {
        tracing::info!(%id, hero = %hero.name, "player registered");
        self.registry.register(id, hero, addr, sender);
        self.broadcast_player_list();
    }

    /// Runs the full disconnect cascade for a player: room departure
    /// (with host migration or teardown), registry removal, and a global
    /// roster broadcast. Idempotent — unknown ids are a no-op.
    pub fn disconnect(&mut self, id: PlayerId) {
        if !self.registry.contains(id) {
            return;
        }
        self.depart_room(id);
        if let Some(player) = self.registry.unregister(id) {
            tracing::info!(
                %id,
                hero = %player.hero.name,
                "player disconnected"
            );
        }
        self.broadcast_player_list();
    }

    // -- Chat --------------------------------------------------------------

    /// Relays a chat line: to the sender's room when they are in one,
    /// otherwise to every connected player. Unknown senders are ignored.
    pub fn chat(&self, id: PlayerId, message: String) {
        let Some(player) = self.registry.get(id) else {
            return;
        };
        let envelope = ServerMessage::Chat {
            from: player.hero.name.clone(),
            message,
            timestamp: now_millis(),
        };
        match player.room.and_then(|rid| self.directory.get(rid)) {
            Some(room) => {
                self.fanout().members(&room.members, &envelope)
            }
            None => self.fanout().global(&envelope),
        }
    }

    // -- Rooms -------------------------------------------------------------

    /// Opens a room with the player as host and sole member.
    ///
    /// A player already bound to a room must leave it first; the request
    /// is rejected rather than silently double-booking them.
    pub fn create_game(
        &mut self,
        id: PlayerId,
        name: String,
        password: Option<String>,
    ) -> Result<RoomId, LobbyError> {
        let player = self
            .registry
            .get(id)
            .ok_or(LobbyError::PlayerNotFound(id))?;
        if let Some(existing) = player.room {
            return Err(LobbyError::AlreadyInRoom(existing));
        }

        let room_id = self.directory.create(id, name, password);
        if let Some(player) = self.registry.get_mut(id) {
            player.room = Some(room_id);
        }

        let summary = self
            .directory
            .public_info(room_id)
            .expect("just created this room");
        self.fanout()
            .global(&ServerMessage::GameCreated { game: summary });
        self.fanout().player(
            id,
            &ServerMessage::JoinedGame {
                game_id: room_id,
                is_host: true,
            },
        );
        Ok(room_id)
    }

    /// Adds the player to an existing room.
    ///
    /// On success the requester gets `joined_game` and the room's prior
    /// members get `player_joined`; nobody else observes anything.
    pub fn join_game(
        &mut self,
        id: PlayerId,
        room_id: RoomId,
        password: Option<&str>,
    ) -> Result<(), LobbyError> {
        let player = self
            .registry
            .get(id)
            .ok_or(LobbyError::PlayerNotFound(id))?;
        if let Some(existing) = player.room {
            return Err(LobbyError::AlreadyInRoom(existing));
        }

        self.directory.join(room_id, id, password)?;
        let Some(player) = self.registry.get_mut(id) else {
            return Ok(());
        };
        player.room = Some(room_id);
        let hero = player.hero.clone();

        self.fanout().player(
            id,
            &ServerMessage::JoinedGame {
                game_id: room_id,
                is_host: false,
            },
        );
        if let Some(room) = self.directory.get(room_id) {
            self.fanout().members_except(
                &room.members,
                id,
                &ServerMessage::PlayerJoined {
                    player: PlayerBrief { id, hero },
                },
            );
        }
        Ok(())
    }

    /// Removes the player from their current room, if any.
    pub fn leave_game(&mut self, id: PlayerId) {
        self.depart_room(id);
    }

    /// Shared departure path for `leave_game`, disconnects, and
    /// moderation. Exactly one of teardown, host migration, or a plain
    /// departure notification fires.
    fn depart_room(&mut self, id: PlayerId) {
        let Some(room_id) =
            self.registry.get(id).and_then(|p| p.room)
        else {
            return;
        };
        if let Some(player) = self.registry.get_mut(id) {
            player.room = None;
        }

        // A vanished room here means the cascade already tore it down;
        // nothing left to notify.
        let Some((outcome, remaining)) =
            self.directory.leave(room_id, id)
        else {
            return;
        };

        match outcome {
            LeaveOutcome::Closed => {
                self.fanout().global(&ServerMessage::GameClosed {
                    game_id: room_id,
                });
            }
            LeaveOutcome::HostMigrated { new_host } => {
                self.fanout().members(
                    &remaining,
                    &ServerMessage::NewHost { host_id: new_host },
                );
            }
            LeaveOutcome::Departed => {
                self.fanout().members(
                    &remaining,
                    &ServerMessage::PlayerLeft { player_id: id },
                );
            }
        }
    }

    // -- Queries -----------------------------------------------------------

    /// Sends the current room listing to the requester only.
    pub fn send_games_list(&self, id: PlayerId) {
        self.fanout().player(
            id,
            &ServerMessage::GamesList {
                games: self.directory.list(),
            },
        );
    }

    /// Summaries of all rooms (also backs the HTTP listing).
    pub fn games(&self) -> Vec<RoomSummary> {
        self.directory.list()
    }

    /// Public info for one room, if it exists.
    pub fn public_info(&self, room_id: RoomId) -> Option<RoomSummary> {
        self.directory.public_info(room_id)
    }

    /// Roster snapshot in join order.
    pub fn players(&self) -> Vec<PlayerSummary> {
        self.registry.snapshot()
    }

    /// Number of connected players.
    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of active rooms.
    pub fn game_count(&self) -> usize {
        self.directory.len()
    }

    /// Lobby counters for `admin_stats`.
    pub fn stats(&self) -> LobbyStats {
        LobbyStats {
            players: self.registry.len(),
            games: self.directory.len(),
            banned_ips: self.bans.len(),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }

    pub(crate) fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub(crate) fn bans_mut(&mut self) -> &mut BanList {
        &mut self.bans
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}
