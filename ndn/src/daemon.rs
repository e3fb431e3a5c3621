//! The pure packet-processing state machine.
//!
//! [`Daemon`] is unaware of sockets: like `edge_dhcp::server::Server`, it
//! takes already-decoded packet fields and a `now_ms` timestamp and
//! returns what happened, leaving the actual sending to the I/O layer
//! (`ndn-std`). This keeps the hot-path logic testable without a socket
//! and reusable against any transport.

use no_std_net::Ipv4Addr;

use crate::pit::Pit;
use crate::wire::Interest;
use crate::Error;

/// Looks up and invokes the producer registered for a name, writing its
/// content directly into a caller-supplied buffer (no allocation in the
/// core crate; `ndn::registry::Registry` is the `std`-backed, allocating
/// implementation a host program plugs in).
pub trait Producers {
    /// `None` — no producer owns this name (forward instead).
    /// `Some(Ok(len))` — produced `len` bytes into `out`.
    /// `Some(Err(Error::ProducerFailed))` — matched but production failed.
    fn produce(&mut self, name: &[u8], out: &mut [u8]) -> Option<Result<usize, Error>>;
}

/// What handling an Interest did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestOutcome {
    /// Answered locally; `len` bytes of Data content were written into
    /// the caller's output buffer.
    Produced(usize),
    /// Not ours: recorded in the PIT, should be fanned out to peers.
    Forwarded,
    /// Dropped: duplicate, PIT full, or production failed.
    Dropped(Error),
}

/// Running counters a host program can log or export. Purely
/// observational: nothing here changes any drop/forward decision
/// (spec.md §9 allows a counter on the unsolicited-Data path "but must
/// not change the drop behaviour").
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Data packets that matched no pending Interest.
    pub unsolicited_data: u64,
}

/// The packet-processing core: a PIT plus the pure transition functions
/// the daemon loop drives on every datagram and idle tick.
#[derive(Debug, Clone)]
pub struct Daemon<const PIT_N: usize> {
    pit: Pit<PIT_N>,
    stats: Stats,
}

impl<const PIT_N: usize> Default for Daemon<PIT_N> {
    fn default() -> Self {
        Self::new(crate::PIT_TTL_MS)
    }
}

impl<const PIT_N: usize> Daemon<PIT_N> {
    pub const fn new(pit_ttl_ms: u64) -> Self {
        Self {
            pit: Pit::new(pit_ttl_ms),
            stats: Stats {
                unsolicited_data: 0,
            },
        }
    }

    pub fn pit(&self) -> &Pit<PIT_N> {
        &self.pit
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Handles one Interest: produce locally if owned, otherwise try to
    /// record it in the PIT for later forwarding.
    pub fn handle_interest<P: Producers>(
        &mut self,
        producers: &mut P,
        interest: &Interest,
        originator: Ipv4Addr,
        now_ms: u64,
        data_out: &mut [u8],
    ) -> InterestOutcome {
        match producers.produce(interest.name, data_out) {
            Some(Ok(len)) => InterestOutcome::Produced(len),
            Some(Err(err)) => {
                log::warn!("producer failed, dropping interest");
                InterestOutcome::Dropped(err)
            }
            None => match self.pit.insert(interest.name, interest.nonce, originator, now_ms) {
                Ok(()) => InterestOutcome::Forwarded,
                Err(err) => {
                    log::debug!("dropping interest: {err:?}");
                    InterestOutcome::Dropped(err)
                }
            },
        }
    }

    /// Handles one Data packet: drains every live PIT entry whose name
    /// hash matches, returning the requesters to unicast it to, in
    /// ascending slot-index order. Each returned entry has already been
    /// removed from the PIT.
    pub fn handle_data(&mut self, name: &[u8]) -> heapless::Vec<Ipv4Addr, PIT_N> {
        let mut requesters = heapless::Vec::new();

        while let Some(entry) = self.pit.lookup_by_name(name) {
            // `heapless::Vec<_, PIT_N>` can never overflow here: at most
            // `PIT_N` live entries exist at any time.
            let _ = requesters.push(entry.requester);
            self.pit.delete(name);
        }

        if requesters.is_empty() {
            self.stats.unsolicited_data += 1;
            log::debug!("unsolicited data, no matching pending interest");
        }

        requesters
    }

    /// Runs the idle-branch eviction pass.
    pub fn tick(&mut self, now_ms: u64) {
        self.pit.evict_expired(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Interest;

    struct NoProducers;

    impl Producers for NoProducers {
        fn produce(&mut self, _name: &[u8], _out: &mut [u8]) -> Option<Result<usize, Error>> {
            None
        }
    }

    struct SingleProducer {
        name: &'static [u8],
        content: &'static [u8],
    }

    impl Producers for SingleProducer {
        fn produce(&mut self, name: &[u8], out: &mut [u8]) -> Option<Result<usize, Error>> {
            if name != self.name {
                return None;
            }

            if self.content.is_empty() {
                return Some(Err(Error::ProducerFailed));
            }

            out[..self.content.len()].copy_from_slice(self.content);
            Some(Ok(self.content.len()))
        }
    }

    const PEER_A: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
    const PEER_B: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);
    const PEER_C: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 3);

    #[test]
    fn producer_answers_without_touching_pit() {
        let mut daemon: Daemon<10> = Daemon::default();
        let mut producers = SingleProducer {
            name: b"temp",
            content: b"21C",
        };

        let interest = Interest {
            originator: None,
            nonce: 0xDEAD_BEEF,
            name: b"temp",
        };

        let mut out = [0u8; 64];
        let outcome = daemon.handle_interest(&mut producers, &interest, PEER_A, 0, &mut out);

        assert_eq!(outcome, InterestOutcome::Produced(3));
        assert_eq!(&out[..3], b"21C");
        assert_eq!(daemon.pit().len(), 0);
    }

    #[test]
    fn unowned_interest_is_forwarded_and_recorded() {
        let mut daemon: Daemon<10> = Daemon::default();
        let mut producers = NoProducers;

        let interest = Interest {
            originator: None,
            nonce: 1,
            name: b"light",
        };

        let mut out = [0u8; 64];
        let outcome = daemon.handle_interest(&mut producers, &interest, PEER_A, 0, &mut out);

        assert_eq!(outcome, InterestOutcome::Forwarded);
        assert_eq!(daemon.pit().len(), 1);

        let entry = daemon.pit().lookup_by_name(b"light").unwrap();
        assert_eq!(entry.requester, PEER_A);
    }

    #[test]
    fn duplicate_interest_is_dropped() {
        let mut daemon: Daemon<10> = Daemon::default();
        let mut producers = NoProducers;

        let interest = Interest {
            originator: None,
            nonce: 1,
            name: b"light",
        };

        let mut out = [0u8; 64];
        daemon.handle_interest(&mut producers, &interest, PEER_A, 0, &mut out);
        let outcome = daemon.handle_interest(&mut producers, &interest, PEER_A, 1, &mut out);

        assert_eq!(outcome, InterestOutcome::Dropped(Error::DuplicateInterest));
        assert_eq!(daemon.pit().len(), 1);
    }

    #[test]
    fn data_drains_every_requester_in_slot_order() {
        let mut daemon: Daemon<10> = Daemon::default();
        let mut producers = NoProducers;
        let mut out = [0u8; 64];

        daemon.handle_interest(
            &mut producers,
            &Interest {
                originator: None,
                nonce: 7,
                name: b"door",
            },
            PEER_A,
            0,
            &mut out,
        );
        daemon.handle_interest(
            &mut producers,
            &Interest {
                originator: None,
                nonce: 9,
                name: b"door",
            },
            PEER_B,
            0,
            &mut out,
        );

        let requesters = daemon.handle_data(b"door");

        assert_eq!(requesters.as_slice(), &[PEER_A, PEER_B]);
        assert_eq!(daemon.pit().len(), 0);
        assert_eq!(daemon.stats().unsolicited_data, 0);
    }

    #[test]
    fn unsolicited_data_drains_nothing_and_counts() {
        let mut daemon: Daemon<10> = Daemon::default();

        let requesters = daemon.handle_data(b"nobody-asked");
        assert!(requesters.is_empty());
        assert_eq!(daemon.stats().unsolicited_data, 1);

        daemon.handle_data(b"nobody-asked-again");
        assert_eq!(daemon.stats().unsolicited_data, 2);
    }

    #[test]
    fn tick_evicts_expired_entries() {
        let mut daemon: Daemon<10> = Daemon::new(5000);
        let mut producers = NoProducers;
        let mut out = [0u8; 64];

        daemon.handle_interest(
            &mut producers,
            &Interest {
                originator: None,
                nonce: 1,
                name: b"light",
            },
            PEER_A,
            0,
            &mut out,
        );

        daemon.tick(5001);
        assert_eq!(daemon.pit().len(), 0);
    }

    #[test]
    fn two_requesters_different_peers_than_third_sender() {
        // Exercises scenario 5 end-to-end: A and B ask, C answers.
        let mut daemon: Daemon<10> = Daemon::default();
        let mut producers = NoProducers;
        let mut out = [0u8; 64];

        daemon.handle_interest(
            &mut producers,
            &Interest {
                originator: None,
                nonce: 7,
                name: b"door",
            },
            PEER_A,
            0,
            &mut out,
        );
        daemon.handle_interest(
            &mut producers,
            &Interest {
                originator: None,
                nonce: 9,
                name: b"door",
            },
            PEER_B,
            0,
            &mut out,
        );

        let _ = PEER_C; // C is the sender of the Data, not a PIT participant
        let requesters = daemon.handle_data(b"door");
        assert_eq!(requesters.len(), 2);
    }
}
