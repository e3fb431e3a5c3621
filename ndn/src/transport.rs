//! Peer set configuration and the transport trait the daemon sends
//! through.
//!
//! Two interchangeable modes, selected at configuration time rather than
//! compiled in separately (spec §9: "there is no reason to compile out
//! one path"): a fixed list of peer IPv4 addresses for unicast fan-out
//! ("simulated multicast"), or a single subnet broadcast address.

use no_std_net::Ipv4Addr;

pub use crate::wire::Mode;
use crate::Error;

/// Fixed-capacity, write-once set of static peers (static-peers mode
/// only). `N` bounds how many peers a single node can fan Interests out
/// to.
#[derive(Debug, Clone)]
pub struct PeerSet<const N: usize> {
    peers: heapless::Vec<Ipv4Addr, N>,
    populated: bool,
}

impl<const N: usize> Default for PeerSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PeerSet<N> {
    pub const fn new() -> Self {
        Self {
            peers: heapless::Vec::new(),
            populated: false,
        }
    }

    /// Registers the peer list. May be called exactly once.
    pub fn add_peers(&mut self, addrs: &[Ipv4Addr]) -> Result<(), Error> {
        if self.populated {
            return Err(Error::AlreadyPopulated);
        }

        for &addr in addrs {
            self.peers.push(addr).map_err(|_| Error::RegistryFull)?;
        }

        self.populated = true;

        log::info!("registered {} static peer(s)", self.peers.len());

        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ipv4Addr> {
        self.peers.iter()
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }
}

/// What a host program hands the daemon to actually move bytes.
///
/// `send_interest` encapsulates the fan-out behavior for whichever mode
/// the implementor represents: a `StaticPeersTransport` iterates its
/// `PeerSet` and sends one datagram per peer (continuing past a failed
/// peer, per spec §4.5 "send failure on a peer: continue with remaining
/// peers; not retried"); a `BroadcastTransport` sends one datagram to the
/// subnet broadcast address.
pub trait Transport {
    type Error;

    /// Which wire framing this transport uses.
    fn mode(&self) -> Mode;

    /// Fans an already-encoded Interest datagram out to peers/broadcast.
    fn send_interest(&mut self, encoded: &[u8]) -> Result<(), Self::Error>;

    /// Sends an already-encoded Data datagram unicast to `dest`.
    fn send_data(&mut self, dest: Ipv4Addr, encoded: &[u8]) -> Result<(), Self::Error>;
}
