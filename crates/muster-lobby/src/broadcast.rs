//! Best-effort fan-out of outbound envelopes.
//!
//! Delivery is independent per recipient: a player whose writer task is
//! gone (channel closed) is skipped silently and never prevents delivery
//! to the rest. Sends only enqueue onto unbounded channels, so fan-out
//! is non-blocking and safe to run inside the lobby critical section.

use muster_protocol::{PlayerId, ServerMessage};

use crate::registry::{ConnectionRegistry, Outbound};

/// Fans envelopes out to the global player set or a room's member set.
pub struct BroadcastEngine<'a> {
    registry: &'a ConnectionRegistry,
}

impl<'a> BroadcastEngine<'a> {
    /// Creates a fan-out view over the current registry.
    pub fn new(registry: &'a ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Sends to every currently connected player.
    pub fn global(&self, msg: &ServerMessage) {
        for sender in self.registry.senders() {
            let _ = sender.send(Outbound::Message(msg.clone()));
        }
    }

    /// Sends to the given members.
    pub fn members(&self, members: &[PlayerId], msg: &ServerMessage) {
        for member in members {
            self.player(*member, msg);
        }
    }

    /// Sends to the given members, skipping one (typically the actor the
    /// envelope is about).
    pub fn members_except(
        &self,
        members: &[PlayerId],
        skip: PlayerId,
        msg: &ServerMessage,
    ) {
        for member in members {
            if *member != skip {
                self.player(*member, msg);
            }
        }
    }

    /// Sends to a single player. Unknown or dead recipients are skipped.
    pub fn player(&self, id: PlayerId, msg: &ServerMessage) {
        if let Some(sender) = self.registry.sender_of(id) {
            let _ = sender.send(Outbound::Message(msg.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_protocol::Hero;
    use std::net::IpAddr;
    use tokio::sync::mpsc;

    fn addr() -> IpAddr {
        IpAddr::from([127, 0, 0, 1])
    }

    fn chat() -> ServerMessage {
        ServerMessage::Chat {
            from: "Aria".into(),
            message: "hail".into(),
            timestamp: 0,
        }
    }

    #[test]
    fn test_global_reaches_every_player() {
        let mut reg = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        reg.register(PlayerId(1), Hero::named("a"), addr(), tx1);
        reg.register(PlayerId(2), Hero::named("b"), addr(), tx2);

        BroadcastEngine::new(&reg).global(&chat());

        assert!(matches!(rx1.try_recv(), Ok(Outbound::Message(_))));
        assert!(matches!(rx2.try_recv(), Ok(Outbound::Message(_))));
    }

    #[test]
    fn test_dead_recipient_does_not_block_the_rest() {
        let mut reg = ConnectionRegistry::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        reg.register(PlayerId(1), Hero::named("a"), addr(), tx1);
        reg.register(PlayerId(2), Hero::named("b"), addr(), tx2);
        drop(rx1); // player 1's writer task is gone

        BroadcastEngine::new(&reg).global(&chat());

        assert!(matches!(rx2.try_recv(), Ok(Outbound::Message(_))));
    }

    #[test]
    fn test_members_except_skips_the_actor() {
        let mut reg = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        reg.register(PlayerId(1), Hero::named("a"), addr(), tx1);
        reg.register(PlayerId(2), Hero::named("b"), addr(), tx2);

        BroadcastEngine::new(&reg).members_except(
            &[PlayerId(1), PlayerId(2)],
            PlayerId(2),
            &chat(),
        );

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_player_to_unknown_recipient_is_noop() {
        let reg = ConnectionRegistry::new();
        // Nothing to assert beyond "does not panic".
        BroadcastEngine::new(&reg).player(PlayerId(404), &chat());
    }
}
