#![cfg_attr(not(feature = "std"), no_std)]

//! Facade crate: re-exports the pure `no_std` core ([`ndn`]) and,
//! under the `std` feature, the synchronous UDP transport and daemon
//! loop ([`ndn_std`]) that drives it.

pub use ndn;
#[cfg(feature = "std")]
pub use ndn_std;
