//! End-to-end scenario tests straight out of the specification's
//! "Testable Properties" section: encode a datagram the way a peer
//! would, decode it, and drive it through [`ndn::daemon::Daemon`].

use ndn::daemon::{Daemon, InterestOutcome, Producers};
use ndn::wire::{Data, Interest, Mode, Packet};
use ndn::Error;
use no_std_net::Ipv4Addr;

struct NoProducers;

impl Producers for NoProducers {
    fn produce(&mut self, _name: &[u8], _out: &mut [u8]) -> Option<Result<usize, Error>> {
        None
    }
}

struct TempSensor;

impl Producers for TempSensor {
    fn produce(&mut self, name: &[u8], out: &mut [u8]) -> Option<Result<usize, Error>> {
        if name != b"temp" {
            return None;
        }

        let content = b"21C";
        out[..content.len()].copy_from_slice(content);
        Some(Ok(content.len()))
    }
}

const PEER_A: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const PEER_B: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

fn decode_interest(bytes: &[u8]) -> Interest<'_> {
    match Packet::decode(Mode::Broadcast, bytes).unwrap() {
        Packet::Interest(interest) => interest,
        Packet::Data(_) => panic!("expected an interest"),
    }
}

#[test]
fn scenario_1_producer_answers() {
    let mut daemon: Daemon<10> = Daemon::default();
    let mut producers = TempSensor;

    let on_wire = Interest {
        originator: None,
        nonce: 0xDEAD_BEEF,
        name: b"temp",
    }
    .encode(Mode::Broadcast, &mut [0u8; 256])
    .unwrap()
    .to_vec();

    let interest = decode_interest(&on_wire);

    let mut data_buf = [0u8; 64];
    let outcome = daemon.handle_interest(&mut producers, &interest, PEER_A, 0, &mut data_buf);

    assert_eq!(outcome, InterestOutcome::Produced(3));
    assert_eq!(&data_buf[..3], b"21C");
    assert_eq!(daemon.pit().len(), 0, "producing locally must not touch the PIT");
}

#[test]
fn scenario_2_forward_interest_records_one_pit_entry() {
    let mut daemon: Daemon<10> = Daemon::default();
    let mut producers = NoProducers;

    let interest = Interest {
        originator: None,
        nonce: 1,
        name: b"light",
    };

    let mut data_buf = [0u8; 64];
    let outcome = daemon.handle_interest(&mut producers, &interest, PEER_A, 0, &mut data_buf);

    assert_eq!(outcome, InterestOutcome::Forwarded);
    assert_eq!(daemon.pit().len(), 1);
    assert_eq!(daemon.pit().lookup_by_name(b"light").unwrap().requester, PEER_A);
}

#[test]
fn scenario_3_duplicate_interest_is_suppressed() {
    let mut daemon: Daemon<10> = Daemon::default();
    let mut producers = NoProducers;
    let mut data_buf = [0u8; 64];

    let interest = Interest {
        originator: None,
        nonce: 1,
        name: b"light",
    };

    daemon.handle_interest(&mut producers, &interest, PEER_A, 0, &mut data_buf);
    let size_before = daemon.pit().size();

    let outcome = daemon.handle_interest(&mut producers, &interest, PEER_A, 10, &mut data_buf);

    assert_eq!(outcome, InterestOutcome::Dropped(Error::DuplicateInterest));
    assert_eq!(daemon.pit().size(), size_before);
    assert_eq!(daemon.pit().len(), 1);
}

#[test]
fn scenario_4_data_returns_and_pit_entry_is_removed() {
    let mut daemon: Daemon<10> = Daemon::default();
    let mut producers = NoProducers;
    let mut data_buf = [0u8; 64];

    daemon.handle_interest(
        &mut producers,
        &Interest {
            originator: None,
            nonce: 1,
            name: b"light",
        },
        PEER_A,
        0,
        &mut data_buf,
    );

    let requesters = daemon.handle_data(b"light");

    assert_eq!(requesters.as_slice(), &[PEER_A]);
    assert_eq!(daemon.pit().len(), 0);
    assert_eq!(daemon.pit().size(), 0);
}

#[test]
fn scenario_5_two_requesters_one_data_served_in_slot_order() {
    let mut daemon: Daemon<10> = Daemon::default();
    let mut producers = NoProducers;
    let mut data_buf = [0u8; 64];

    daemon.handle_interest(
        &mut producers,
        &Interest {
            originator: None,
            nonce: 7,
            name: b"door",
        },
        PEER_A,
        0,
        &mut data_buf,
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
        &mut data_buf,
    );

    let data = Data {
        originator: None,
        name: b"door",
        content: b"OPEN",
    };
    let mut wire_buf = [0u8; 256];
    let encoded = data.encode(Mode::Broadcast, &mut wire_buf).unwrap();
    let decoded = match Packet::decode(Mode::Broadcast, encoded).unwrap() {
        Packet::Data(d) => d,
        Packet::Interest(_) => panic!("expected data"),
    };

    let requesters = daemon.handle_data(decoded.name);

    assert_eq!(requesters.as_slice(), &[PEER_A, PEER_B]);
    assert_eq!(daemon.pit().len(), 0);
}

#[test]
fn scenario_6_ttl_eviction() {
    let mut daemon: Daemon<10> = Daemon::new(5000);
    let mut producers = NoProducers;
    let mut data_buf = [0u8; 64];

    daemon.handle_interest(
        &mut producers,
        &Interest {
            originator: None,
            nonce: 1,
            name: b"light",
        },
        PEER_A,
        0,
        &mut data_buf,
    );

    daemon.tick(5001);

    assert_eq!(daemon.pit().len(), 0);
    assert_eq!(daemon.pit().size(), 0);
}
