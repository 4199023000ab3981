//! Game room directory: creation, membership, host migration, teardown.
//!
//! The directory holds pure room data; broadcasting the resulting
//! envelopes is the [`Lobby`](crate::Lobby) coordinator's job. Invariants
//! enforced here: a room exists iff its member list is non-empty, the
//! host is always a member, and membership never exceeds
//! [`ROOM_CAPACITY`].

use std::collections::HashMap;
use std::time::Instant;

use muster_protocol::{PlayerId, RoomId, RoomStatus, RoomSummary};

use crate::{id, LobbyError};

/// Fixed member capacity of every room.
pub const ROOM_CAPACITY: usize = 8;

/// A short-lived game room.
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    /// Always an element of `members`.
    pub host: PlayerId,
    /// Member ids in join order. Removal preserves relative order, which
    /// is what makes host succession deterministic.
    pub members: Vec<PlayerId>,
    /// Plaintext compare; never exposed through summaries.
    pub password: Option<String>,
    pub created_at: Instant,
    pub status: RoomStatus,
}

impl Room {
    /// Public info for lobby browsers: member count, capacity, whether a
    /// password is set — never the password itself.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id,
            name: self.name.clone(),
            players: self.members.len(),
            max_players: ROOM_CAPACITY,
            has_password: self.password.is_some(),
            status: self.status,
        }
    }

    /// Returns `true` if the room is at capacity.
    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    /// Returns `true` if the player is a member.
    pub fn contains(&self, player: PlayerId) -> bool {
        self.members.contains(&player)
    }
}

/// What happened when a member left a room. Exactly one outcome fires
/// per departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Membership emptied; the room was deleted.
    Closed,
    /// The host left; the earliest-joined remaining member was promoted.
    HostMigrated { new_host: PlayerId },
    /// A non-host member left; the host is unchanged.
    Departed,
}

/// Owns all active rooms.
#[derive(Debug, Default)]
pub struct GameRoomDirectory {
    rooms: HashMap<RoomId, Room>,
}

impl GameRoomDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a room with `host` as its sole member and returns its id.
    pub fn create(
        &mut self,
        host: PlayerId,
        name: String,
        password: Option<String>,
    ) -> RoomId {
        let room_id = id::next_room_id();
        self.rooms.insert(
            room_id,
            Room {
                id: room_id,
                name,
                host,
                members: vec![host],
                password,
                created_at: Instant::now(),
                status: RoomStatus::Waiting,
            },
        );
        tracing::info!(%room_id, %host, "room created");
        room_id
    }

    /// Adds a player to a room, checking password and capacity.
    ///
    /// The caller is responsible for the player's side of the binding
    /// (setting `Player::room`) and for the resulting broadcasts.
    pub fn join(
        &mut self,
        room_id: RoomId,
        player: PlayerId,
        password: Option<&str>,
    ) -> Result<(), LobbyError> {
        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or(LobbyError::RoomNotFound(room_id))?;

        if let Some(expected) = &room.password {
            if password != Some(expected.as_str()) {
                return Err(LobbyError::WrongPassword);
            }
        }
        if room.is_full() {
            return Err(LobbyError::RoomFull);
        }

        room.members.push(player);
        tracing::info!(
            %room_id,
            %player,
            members = room.members.len(),
            "player joined room"
        );
        Ok(())
    }

    /// Removes a player from a room.
    ///
    /// Returns the outcome plus the remaining member list (for
    /// room-scoped notification), or `None` if the room doesn't exist or
    /// the player wasn't a member. An empty room is deleted atomically
    /// within this call.
    pub fn leave(
        &mut self,
        room_id: RoomId,
        player: PlayerId,
    ) -> Option<(LeaveOutcome, Vec<PlayerId>)> {
        let room = self.rooms.get_mut(&room_id)?;
        if !room.contains(player) {
            return None;
        }

        // retain keeps relative order, so members[0] afterwards is the
        // earliest-joined survivor.
        room.members.retain(|m| *m != player);

        if room.members.is_empty() {
            self.rooms.remove(&room_id);
            tracing::info!(%room_id, "room emptied, closing");
            return Some((LeaveOutcome::Closed, Vec::new()));
        }

        let remaining = room.members.clone();
        if room.host == player {
            let new_host = room.members[0];
            room.host = new_host;
            tracing::info!(%room_id, %new_host, "host migrated");
            Some((LeaveOutcome::HostMigrated { new_host }, remaining))
        } else {
            Some((LeaveOutcome::Departed, remaining))
        }
    }

    /// Looks up a room.
    pub fn get(&self, room_id: RoomId) -> Option<&Room> {
        self.rooms.get(&room_id)
    }

    /// Public info for one room, if it exists.
    pub fn public_info(&self, room_id: RoomId) -> Option<RoomSummary> {
        self.rooms.get(&room_id).map(Room::summary)
    }

    /// Summaries of all rooms, in creation order.
    pub fn list(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> =
            self.rooms.values().map(Room::summary).collect();
        summaries.sort_by_key(|s| s.id);
        summaries
    }

    /// Number of active rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no room exists.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
