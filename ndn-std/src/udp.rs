//! Concrete [`ndn::transport::Transport`] implementations over a single
//! `std::net::UdpSocket`.
//!
//! Two modes, matching [`ndn::transport::Mode`]: [`BroadcastTransport`]
//! sends every Interest to the subnet broadcast address and answers Data
//! unicast to whichever peer asked; [`StaticPeersTransport`] fans
//! Interests out to a fixed, write-once [`PeerSet`] instead.

use std::net::UdpSocket;

use no_std_net::Ipv4Addr;

use ndn::transport::{Mode, PeerSet, Transport};

use crate::to_std;

/// Broadcasts Interests to `broadcast_addr:port`; unicasts Data to the
/// requester recovered from the UDP source address of the original
/// Interest.
pub struct BroadcastTransport {
    socket: UdpSocket,
    broadcast_addr: Ipv4Addr,
    port: u16,
}

impl BroadcastTransport {
    /// `socket` must already have `SO_BROADCAST` set (e.g. via
    /// `UdpSocket::set_broadcast(true)`); this type does not configure
    /// the socket itself, matching `edge-net`'s own transports which
    /// take an already-bound socket/stack rather than owning setup.
    pub fn new(socket: UdpSocket, broadcast_addr: Ipv4Addr, port: u16) -> Self {
        Self {
            socket,
            broadcast_addr,
            port,
        }
    }

    pub fn socket(&self) -> &UdpSocket {
        &self.socket
    }
}

impl Transport for BroadcastTransport {
    type Error = std::io::Error;

    fn mode(&self) -> Mode {
        Mode::Broadcast
    }

    fn send_interest(&mut self, encoded: &[u8]) -> Result<(), Self::Error> {
        self.socket
            .send_to(encoded, (to_std(self.broadcast_addr), self.port))?;
        Ok(())
    }

    fn send_data(&mut self, dest: Ipv4Addr, encoded: &[u8]) -> Result<(), Self::Error> {
        self.socket.send_to(encoded, (to_std(dest), self.port))?;
        Ok(())
    }
}

/// Unicasts every Interest to each peer in a fixed [`PeerSet`] in turn; a
/// send failure on one peer is logged and skipped, not retried (spec:
/// "continue with remaining peers"). Data is always unicast to the
/// requester.
pub struct StaticPeersTransport<const N: usize> {
    socket: UdpSocket,
    peers: PeerSet<N>,
    port: u16,
}

impl<const N: usize> StaticPeersTransport<N> {
    pub fn new(socket: UdpSocket, peers: PeerSet<N>, port: u16) -> Self {
        Self {
            socket,
            peers,
            port,
        }
    }

    pub fn socket(&self) -> &UdpSocket {
        &self.socket
    }

    pub fn peers(&self) -> &PeerSet<N> {
        &self.peers
    }
}

impl<const N: usize> Transport for StaticPeersTransport<N> {
    type Error = std::io::Error;

    fn mode(&self) -> Mode {
        Mode::StaticPeers
    }

    fn send_interest(&mut self, encoded: &[u8]) -> Result<(), Self::Error> {
        for &peer in self.peers.iter() {
            if let Err(err) = self.socket.send_to(encoded, (to_std(peer), self.port)) {
                log::warn!("send to peer {peer:?} failed, continuing: {err}");
            }
        }

        Ok(())
    }

    fn send_data(&mut self, dest: Ipv4Addr, encoded: &[u8]) -> Result<(), Self::Error> {
        self.socket.send_to(encoded, (to_std(dest), self.port))?;
        Ok(())
    }
}
