//! Core protocol types for Muster's wire format.
//!
//! Every envelope is a JSON object with a `type` discriminant in
//! snake_case and camelCase payload fields, which is what the companion
//! client expects. The serde attributes below are load-bearing: a change
//! to a tag or field name is a wire protocol break.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// `#[serde(transparent)]` serializes the id as a plain number on the
/// wire. Ids are allocated by the lobby (monotonic counter in the high
/// bits, random suffix in the low bits), so numeric order equals
/// allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a game room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Hero
// ---------------------------------------------------------------------------

/// The client-supplied hero descriptor.
///
/// The lobby reads only `name` (for chat attribution and logs); every
/// other field the client sends is carried opaquely in `extra` and echoed
/// back untouched in player lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    /// Display name used as the chat `from` field.
    pub name: String,

    /// Opaque client fields (class, level, portrait, ...) the lobby
    /// passes through without validating.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Hero {
    /// Creates a hero with just a name, no extra fields.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Room status
// ---------------------------------------------------------------------------

/// Lifecycle status of a room.
///
/// `waiting` is the only state the lobby currently produces; the enum is
/// `non_exhaustive` so states like an in-progress marker can be added
/// without a wire break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RoomStatus {
    /// The room is open in the lobby, gathering players.
    Waiting,
}

impl RoomStatus {
    /// Returns `true` if the room accepts new members.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
        }
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// One entry of the global `player_list` broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    /// The player's lobby identity.
    pub id: PlayerId,
    /// The hero the player registered with.
    pub hero: Hero,
    /// Whether the player is currently bound to a room.
    pub in_game: bool,
}

/// The `{id, hero}` pair carried by `player_joined`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBrief {
    pub id: PlayerId,
    pub hero: Hero,
}

/// Public room info: everything a lobby browser may see.
///
/// Carries whether a password is set, never the password itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    /// Current member count.
    pub players: usize,
    pub max_players: usize,
    pub has_password: bool,
    pub status: RoomStatus,
}

/// Counters returned to an authorized `admin_stats` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyStats {
    pub players: usize,
    pub games: usize,
    pub banned_ips: usize,
    pub uptime_secs: u64,
}

// ---------------------------------------------------------------------------
// Inbound envelopes
// ---------------------------------------------------------------------------

/// Every envelope a client may send.
///
/// Unrecognized discriminants fail to decode; the router drops such
/// frames silently and keeps the connection open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Advertise a hero and enter the lobby roster.
    Register { hero: Hero },

    /// Relay a chat line to the sender's room, or globally when the
    /// sender is roomless.
    Chat { message: String },

    /// Open a new room with the sender as host.
    #[serde(rename_all = "camelCase")]
    CreateGame {
        game_name: String,
        #[serde(default)]
        password: Option<String>,
    },

    /// Join an existing room.
    #[serde(rename_all = "camelCase")]
    JoinGame {
        game_id: RoomId,
        #[serde(default)]
        password: Option<String>,
    },

    /// Leave the current room, if any.
    LeaveGame,

    /// Ask for the current room listing.
    GetGames,

    /// Privileged: forcibly disconnect a player.
    #[serde(rename_all = "camelCase")]
    AdminKick {
        admin_key: String,
        target_id: PlayerId,
    },

    /// Privileged: kick a player and deny their address for the rest of
    /// the process lifetime.
    #[serde(rename_all = "camelCase")]
    AdminBan {
        admin_key: String,
        target_id: PlayerId,
    },

    /// Privileged: request lobby counters.
    #[serde(rename_all = "camelCase")]
    AdminStats { admin_key: String },
}

// ---------------------------------------------------------------------------
// Outbound envelopes
// ---------------------------------------------------------------------------

/// Every envelope the server may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame after accept: the assigned identity and server time
    /// (unix milliseconds).
    #[serde(rename_all = "camelCase")]
    Connected {
        player_id: PlayerId,
        server_time: u64,
    },

    /// Full roster snapshot, broadcast globally after every register and
    /// unregister.
    PlayerList { players: Vec<PlayerSummary> },

    /// A relayed chat line. `timestamp` is unix milliseconds.
    Chat {
        from: String,
        message: String,
        timestamp: u64,
    },

    /// A new room opened (global).
    GameCreated { game: RoomSummary },

    /// A room's membership emptied and it was torn down (global).
    #[serde(rename_all = "camelCase")]
    GameClosed { game_id: RoomId },

    /// Confirmation to the requester that they entered a room.
    #[serde(rename_all = "camelCase")]
    JoinedGame { game_id: RoomId, is_host: bool },

    /// Another player entered the recipient's room.
    PlayerJoined { player: PlayerBrief },

    /// A non-host member left the recipient's room.
    #[serde(rename_all = "camelCase")]
    PlayerLeft { player_id: PlayerId },

    /// The recipient's room has a new host after the old one left.
    #[serde(rename_all = "camelCase")]
    NewHost { host_id: PlayerId },

    /// Response to `get_games` (single recipient).
    GamesList { games: Vec<RoomSummary> },

    /// Response to an authorized `admin_stats` (single recipient).
    AdminStats { stats: LobbyStats },

    /// A domain error reported only to the requester.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
