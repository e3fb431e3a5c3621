//! `std`-only I/O driver for the [`ndn`] core: a synchronous UDP
//! transport for both wire modes, and the blocking daemon loop that
//! drives them.

use core::fmt::Debug;

pub mod daemon;
pub mod udp;

/// An I/O-layer error: either the inner socket operation failed, or the
/// datagram it returned didn't parse / process.
#[derive(Debug)]
pub enum Error<E> {
    Io(E),
    Format(ndn::Error),
}

impl<E> From<ndn::Error> for Error<E> {
    fn from(value: ndn::Error) -> Self {
        Self::Format(value)
    }
}

impl<E: Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err:?}"),
            Self::Format(err) => write!(f, "{err}"),
        }
    }
}

impl<E: Debug> std::error::Error for Error<E> {}

pub(crate) fn to_std(addr: no_std_net::Ipv4Addr) -> std::net::Ipv4Addr {
    let [a, b, c, d] = addr.octets();
    std::net::Ipv4Addr::new(a, b, c, d)
}

pub(crate) fn from_std(addr: std::net::Ipv4Addr) -> no_std_net::Ipv4Addr {
    let [a, b, c, d] = addr.octets();
    no_std_net::Ipv4Addr::new(a, b, c, d)
}
