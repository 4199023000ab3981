//! Address denylist checked at connection-accept time.

use std::collections::HashSet;
use std::net::IpAddr;

/// A set of banned network addresses.
///
/// Append-only for the process lifetime — there is no unban operation.
/// The check runs before any player state is created, so a banned peer
/// never appears in the registry and never triggers a broadcast.
#[derive(Debug, Default)]
pub struct BanList {
    addrs: HashSet<IpAddr>,
}

impl BanList {
    /// Creates an empty ban list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an address. Returns `false` if it was already banned.
    pub fn insert(&mut self, addr: IpAddr) -> bool {
        let added = self.addrs.insert(addr);
        if added {
            tracing::info!(%addr, "address banned");
        }
        added
    }

    /// Returns `true` if the address is banned.
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.addrs.contains(&addr)
    }

    /// Number of banned addresses.
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// Returns `true` if no address is banned.
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}
