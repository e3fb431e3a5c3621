//! The blocking daemon loop: owns a socket-backed [`Transport`], the
//! `std`-only [`Registry`] and a pure [`Daemon`] core, and drives them
//! with a read-timeout poll loop so idle-branch PIT eviction keeps
//! running even with no traffic.

use std::fmt::{Debug, Display};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use no_std_net::Ipv4Addr;

use ndn::daemon::Daemon;
use ndn::registry::{ProducerFn, Registry};
use ndn::transport::{Mode, Transport};
use ndn::wire::{Data, Interest, Packet};
use ndn::UDP_BUFFER_SIZE;

use crate::{from_std, Error};

/// A transport that also exposes the socket it reads from, so the daemon
/// loop can poll it directly instead of going through `Transport`'s
/// send-only surface.
pub trait Socket {
    fn socket(&self) -> &UdpSocket;
}

impl Socket for crate::udp::BroadcastTransport {
    fn socket(&self) -> &UdpSocket {
        crate::udp::BroadcastTransport::socket(self)
    }
}

impl<const N: usize> Socket for crate::udp::StaticPeersTransport<N> {
    fn socket(&self) -> &UdpSocket {
        crate::udp::StaticPeersTransport::socket(self)
    }
}

/// Ties a [`Transport`] + [`Registry`] + [`Daemon`] together into the
/// runnable unit. `PIT_N` bounds the number of concurrently pending
/// Interests, same as [`Daemon`]'s own parameter.
pub struct Server<T, const PIT_N: usize> {
    transport: T,
    daemon: Daemon<PIT_N>,
    registry: Registry,
    local_addr: Ipv4Addr,
    buf: [u8; UDP_BUFFER_SIZE],
    started: Instant,
}

impl<T, const PIT_N: usize> Server<T, PIT_N>
where
    T: Transport + Socket,
    T::Error: Debug + Display,
{
    pub fn new(transport: T, local_addr: Ipv4Addr, pit_ttl_ms: u64) -> Self {
        log::info!("starting ndn daemon for {local_addr:?}");

        Self {
            transport,
            daemon: Daemon::new(pit_ttl_ms),
            registry: Registry::new(),
            local_addr,
            buf: [0u8; UDP_BUFFER_SIZE],
            started: Instant::now(),
        }
    }

    /// Registers the names this node produces content for. Write-once,
    /// same as [`Registry::publish`].
    pub fn publish<I>(&mut self, items: I) -> Result<(), ndn::Error>
    where
        I: IntoIterator<Item = (std::vec::Vec<u8>, ProducerFn)>,
    {
        log::info!("publishing producer names");
        self.registry.publish(items)
    }

    pub fn daemon(&self) -> &Daemon<PIT_N> {
        &self.daemon
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Blocks forever, alternating between servicing datagrams and
    /// running the idle tick whenever `poll_timeout` elapses with
    /// nothing received — mirrors `edge-dhcp::io::server::Server::run`'s
    /// structure without the `async` executor.
    pub fn run(&mut self, poll_timeout: Duration) -> Result<(), Error<T::Error>> {
        self.transport
            .socket()
            .set_read_timeout(Some(poll_timeout))
            .map_err(Error::Io)?;

        loop {
            self.poll_once()?;
        }
    }

    /// Services exactly one readiness event (a datagram, or a read
    /// timeout that triggers `tick`). Exposed so a host can drive its
    /// own loop instead of blocking in `run`.
    pub fn poll_once(&mut self) -> Result<(), Error<T::Error>> {
        match self.transport.socket().recv_from(&mut self.buf) {
            Ok((len, src)) => {
                // Piggyback eviction on the busy branch too: under sustained
                // traffic `recv_from` never times out, so `tick` must not be
                // confined to the idle branch alone.
                self.daemon.tick(self.now_ms());

                // Copy out of `self.buf` so decoding doesn't hold a
                // borrow of `self` across the dispatch below.
                let mut datagram = [0u8; UDP_BUFFER_SIZE];
                datagram[..len].copy_from_slice(&self.buf[..len]);

                self.on_datagram(&datagram[..len], src)
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                self.daemon.tick(self.now_ms());
                Ok(())
            }
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn on_datagram(&mut self, datagram: &[u8], src: SocketAddr) -> Result<(), Error<T::Error>> {
        let SocketAddr::V4(src) = src else {
            log::warn!("ignoring a non-IPv4 datagram");
            return Ok(());
        };

        let src_ip = from_std(*src.ip());
        let mode = self.transport.mode();

        if mode == Mode::Broadcast && src_ip == self.local_addr {
            log::debug!("dropping our own looped-back broadcast");
            return Ok(());
        }

        let packet = match Packet::decode(mode, datagram) {
            Ok(packet) => packet,
            Err(err) => {
                log::warn!("malformed datagram from {src_ip:?}: {err:?}");
                return Ok(());
            }
        };

        match packet {
            Packet::Interest(interest) => self.on_interest(mode, interest, src_ip),
            Packet::Data(data) => self.on_data(mode, data),
        }
    }

    fn on_interest(
        &mut self,
        mode: Mode,
        interest: Interest<'_>,
        src_ip: Ipv4Addr,
    ) -> Result<(), Error<T::Error>> {
        let requester = match mode {
            Mode::Broadcast => src_ip,
            Mode::StaticPeers => match interest.originator {
                Some(originator) => originator,
                None => {
                    log::warn!("static-peers interest missing originator prefix");
                    return Ok(());
                }
            },
        };

        let now_ms = self.now_ms();
        let mut content_buf = [0u8; UDP_BUFFER_SIZE];

        let outcome = self.daemon.handle_interest(
            &mut self.registry,
            &interest,
            requester,
            now_ms,
            &mut content_buf,
        );

        match outcome {
            ndn::daemon::InterestOutcome::Produced(len) => {
                let data = Data {
                    originator: (mode == Mode::StaticPeers).then_some(self.local_addr),
                    name: interest.name,
                    content: &content_buf[..len],
                };

                let mut wire_buf = [0u8; UDP_BUFFER_SIZE];
                let encoded = data
                    .encode(mode, &mut wire_buf)
                    .map_err(Error::Format)?;

                self.transport
                    .send_data(requester, encoded)
                    .map_err(Error::Io)?;
            }
            ndn::daemon::InterestOutcome::Forwarded => {
                let forwarded = Interest {
                    originator: (mode == Mode::StaticPeers).then_some(requester),
                    nonce: interest.nonce,
                    name: interest.name,
                };

                let mut wire_buf = [0u8; UDP_BUFFER_SIZE];
                let encoded = forwarded
                    .encode(mode, &mut wire_buf)
                    .map_err(Error::Format)?;

                self.transport
                    .send_interest(encoded)
                    .map_err(Error::Io)?;
            }
            ndn::daemon::InterestOutcome::Dropped(_) => {}
        }

        Ok(())
    }

    fn on_data(&mut self, mode: Mode, data: Data<'_>) -> Result<(), Error<T::Error>> {
        let requesters = self.daemon.handle_data(data.name);

        for requester in requesters {
            let out = Data {
                originator: (mode == Mode::StaticPeers).then_some(self.local_addr),
                name: data.name,
                content: data.content,
            };

            let mut wire_buf = [0u8; UDP_BUFFER_SIZE];
            let encoded = out.encode(mode, &mut wire_buf).map_err(Error::Format)?;

            self.transport
                .send_data(requester, encoded)
                .map_err(Error::Io)?;
        }

        Ok(())
    }
}
