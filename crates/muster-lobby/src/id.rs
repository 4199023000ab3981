//! Identity allocation for players and rooms.
//!
//! Ids are routing keys, not secrets: uniqueness matters, unpredictability
//! does not. Each id packs a monotonic sequence number into the high bits
//! and a random 16-bit suffix into the low bits. The counter guarantees
//! process-lifetime uniqueness; the suffix keeps ids from reading as a
//! bare enumeration across restarts. Because the counter occupies the
//! high bits, numeric order of ids equals allocation order — the registry
//! relies on this to produce join-ordered snapshots.

use std::sync::atomic::{AtomicU64, Ordering};

use muster_protocol::{PlayerId, RoomId};
use rand::Rng;

static NEXT_PLAYER_SEQ: AtomicU64 = AtomicU64::new(1);
static NEXT_ROOM_SEQ: AtomicU64 = AtomicU64::new(1);

const SUFFIX_BITS: u32 = 16;

fn with_suffix(seq: u64) -> u64 {
    let suffix: u16 = rand::rng().random();
    (seq << SUFFIX_BITS) | u64::from(suffix)
}

/// Allocates the next player identity.
pub fn next_player_id() -> PlayerId {
    PlayerId(with_suffix(NEXT_PLAYER_SEQ.fetch_add(1, Ordering::Relaxed)))
}

/// Allocates the next room identity.
pub fn next_room_id() -> RoomId {
    RoomId(with_suffix(NEXT_ROOM_SEQ.fetch_add(1, Ordering::Relaxed)))
}
