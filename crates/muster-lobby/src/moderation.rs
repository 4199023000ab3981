//! Moderation policy: forced disconnects and address bans.
//!
//! Both operations reuse the ordinary disconnect cascade, so a kicked or
//! banned player's room departs, hosts migrate, and the roster broadcast
//! fires exactly as if they had closed the connection themselves. The
//! policy close frame is enqueued before the cascade runs so it reaches
//! the writer task ahead of teardown.

use muster_protocol::PlayerId;

use crate::registry::{CloseReason, Outbound};
use crate::Lobby;

impl Lobby {
    /// Forcibly disconnects a player. Returns `false` (no-op) if the
    /// target is not connected.
    pub fn kick(&mut self, target: PlayerId) -> bool {
        let Some(player) = self.registry().get(target) else {
            tracing::debug!(%target, "kick target not connected");
            return false;
        };
        let _ = player.sender.send(Outbound::Close {
            reason: CloseReason::Kicked,
        });
        tracing::warn!(%target, "player kicked");
        self.disconnect(target);
        true
    }

    /// As [`kick`](Self::kick), plus the target's address joins the ban
    /// list for the rest of the process lifetime. Future connections from
    /// that address are rejected at accept, whatever hero they present.
    pub fn ban(&mut self, target: PlayerId) -> bool {
        let addr = match self.registry().get(target) {
            Some(player) => {
                let _ = player.sender.send(Outbound::Close {
                    reason: CloseReason::Banned,
                });
                player.addr
            }
            None => {
                tracing::debug!(%target, "ban target not connected");
                return false;
            }
        };
        self.bans_mut().insert(addr);
        tracing::warn!(%target, %addr, "player banned");
        self.disconnect(target);
        true
    }
}
