//! Fixed-capacity Pending Interest Table ("routing table" in the
//! original source this crate descends from).
//!
//! A [`Pit`] never allocates: it is a fixed `[Slot; N]` array plus two
//! cursors, `size` (one past the highest-ever-used live slot) and
//! `free_index` (where the next `insert` will land). Only a 16-byte hash
//! of the Interest name is stored per entry, not the raw name, which
//! bounds per-entry memory regardless of name length.

use no_std_net::Ipv4Addr;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{Error, PIT_HASH_SIZE, PIT_TTL_MS};

pub type NameHash = [u8; PIT_HASH_SIZE];

/// Hashes a name the way the PIT stores it: a truncated SHA-256 digest,
/// compared later with a constant-time equality check so that PIT lookups
/// don't leak timing information about stored names.
pub fn hash_name(name: &[u8]) -> NameHash {
    let digest = Sha256::digest(name);

    let mut hash = [0u8; PIT_HASH_SIZE];
    hash.copy_from_slice(&digest[..PIT_HASH_SIZE]);
    hash
}

fn hash_eq(a: &NameHash, b: &NameHash) -> bool {
    a.as_slice().ct_eq(b.as_slice()).into()
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    free: bool,
    nonce: u32,
    name_hash: NameHash,
    requester: Ipv4Addr,
    timestamp: u64,
}

impl Slot {
    const EMPTY: Self = Self {
        free: true,
        nonce: 0,
        name_hash: [0; PIT_HASH_SIZE],
        requester: Ipv4Addr::UNSPECIFIED,
        timestamp: 0,
    };
}

/// A snapshot of one live PIT entry, returned by [`Pit::lookup_by_name`]
/// and [`Pit::dump`] for logging/introspection. Not a handle: mutating the
/// `Pit` afterwards does not affect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitEntrySnapshot {
    pub index: usize,
    pub nonce: u32,
    pub name_hash: NameHash,
    pub requester: Ipv4Addr,
    pub timestamp: u64,
}

/// Fixed-capacity PIT with `N` slots.
#[derive(Debug, Clone)]
pub struct Pit<const N: usize> {
    slots: [Slot; N],
    size: usize,
    free_index: usize,
    ttl_ms: u64,
}

impl<const N: usize> Default for Pit<N> {
    fn default() -> Self {
        Self::new(PIT_TTL_MS)
    }
}

impl<const N: usize> Pit<N> {
    pub const fn new(ttl_ms: u64) -> Self {
        Self {
            slots: [Slot::EMPTY; N],
            size: 0,
            free_index: 0,
            ttl_ms,
        }
    }

    pub fn len(&self) -> usize {
        (0..self.size).filter(|&i| !self.slots[i].free).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the highest-ever-used slot still within the live region.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The slot `insert` will write to next.
    pub fn free_index(&self) -> usize {
        self.free_index
    }

    pub fn is_full(&self) -> bool {
        self.free_index == self.size && self.size == N
    }

    /// True iff a live slot matches both `name`'s hash and `nonce`.
    pub fn contains(&self, name: &[u8], nonce: u32) -> bool {
        let hash = hash_name(name);

        (0..self.size).any(|i| {
            !self.slots[i].free && self.slots[i].nonce == nonce && hash_eq(&self.slots[i].name_hash, &hash)
        })
    }

    /// Inserts a new pending Interest. Fails if the table is full or if an
    /// identical `(name, nonce)` pair is already pending.
    pub fn insert(
        &mut self,
        name: &[u8],
        nonce: u32,
        requester: Ipv4Addr,
        now_ms: u64,
    ) -> Result<(), Error> {
        if self.is_full() {
            return Err(Error::PitFull);
        }

        if self.contains(name, nonce) {
            return Err(Error::DuplicateInterest);
        }

        let idx = self.free_index;

        self.slots[idx] = Slot {
            free: false,
            nonce,
            name_hash: hash_name(name),
            requester,
            timestamp: now_ms,
        };

        // Rescan [0, size) for the lowest free slot, exactly as the
        // original `setRoute` does after writing.
        let mut i = 0;
        while i < self.size && !self.slots[i].free {
            i += 1;
        }

        if i == self.size {
            if self.size < N {
                self.size += 1;
            }
            self.free_index = self.size;
        } else {
            self.free_index = i;
        }

        Ok(())
    }

    /// First live slot whose name hash matches; nonce is not considered
    /// (Data packets carry no nonce).
    pub fn lookup_by_name(&self, name: &[u8]) -> Option<PitEntrySnapshot> {
        let hash = hash_name(name);

        (0..self.size)
            .find(|&i| !self.slots[i].free && hash_eq(&self.slots[i].name_hash, &hash))
            .map(|i| self.snapshot(i))
    }

    /// Marks the first slot matching `name`'s hash as free. No-op if no
    /// such entry exists.
    pub fn delete(&mut self, name: &[u8]) {
        let hash = hash_name(name);

        if let Some(i) = (0..self.size).find(|&i| !self.slots[i].free && hash_eq(&self.slots[i].name_hash, &hash))
        {
            self.slots[i] = Slot::EMPTY;
            self.free_index = i;

            if i == self.size - 1 {
                self.size -= 1;
            }
        }
    }

    /// Evicts every live slot whose age exceeds the configured TTL.
    /// `free_index` lands on the lowest evicted slot; `size` shrinks to
    /// one past the highest slot still live.
    pub fn evict_expired(&mut self, now_ms: u64) {
        let mut lowest_evicted = None;

        for i in (0..self.size).rev() {
            let slot = &self.slots[i];

            if !slot.free && now_ms.wrapping_sub(slot.timestamp) > self.ttl_ms {
                self.slots[i] = Slot::EMPTY;
                lowest_evicted = Some(i);
            }
        }

        if let Some(idx) = lowest_evicted {
            self.free_index = idx;
        }

        self.size = (0..self.size)
            .rev()
            .find(|&i| !self.slots[i].free)
            .map_or(0, |i| i + 1);
    }

    /// Snapshots of every live entry, in slot-index order. Intended for
    /// logging/debugging, not for the hot path.
    pub fn dump(&self) -> impl Iterator<Item = PitEntrySnapshot> + '_ {
        (0..self.size)
            .filter(|&i| !self.slots[i].free)
            .map(move |i| self.snapshot(i))
    }

    fn snapshot(&self, index: usize) -> PitEntrySnapshot {
        let slot = &self.slots[index];

        PitEntrySnapshot {
            index,
            nonce: slot.nonce,
            name_hash: slot.name_hash,
            requester: slot.requester,
            timestamp: slot.timestamp,
        }
    }
}
