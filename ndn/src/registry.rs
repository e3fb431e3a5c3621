//! Producer registry: the mapping from an owned Interest name to the
//! callback that synthesizes its content.
//!
//! Write-once by design, matching the original's `publishInterests`,
//! which returns "unsuccessful" on a second call rather than appending or
//! overwriting. Gated behind `std` because a producer callback that hands
//! back a freshly allocated buffer has no natural `no_std` shape.

use std::boxed::Box;
use std::vec::Vec;

use heapless::Vec as HVec;

use crate::daemon::Producers;
use crate::Error;

/// Upper bound on the number of distinct names a single node can produce
/// content for.
pub const MAX_PRODUCERS: usize = 8;

/// A producer callback: returns the content to answer with, or `None` on
/// failure (spec: "signalled by returning zero length or a null content
/// pointer").
pub type ProducerFn = Box<dyn FnMut() -> Option<Vec<u8>> + Send>;

struct Entry {
    name: Vec<u8>,
    producer: ProducerFn,
}

/// Fixed-capacity, write-once producer registry.
#[derive(Default)]
pub struct Registry {
    entries: HVec<Entry, MAX_PRODUCERS>,
    populated: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every `(name, producer)` pair. Fails with
    /// [`Error::AlreadyPopulated`] if called a second time, or
    /// [`Error::DuplicateName`] if two entries in this call share a name.
    pub fn publish<I>(&mut self, items: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (Vec<u8>, ProducerFn)>,
    {
        if self.populated {
            return Err(Error::AlreadyPopulated);
        }

        let mut staged: HVec<Entry, MAX_PRODUCERS> = HVec::new();

        for (name, producer) in items {
            if staged.iter().any(|e| e.name == name) {
                return Err(Error::DuplicateName);
            }

            staged
                .push(Entry { name, producer })
                .map_err(|_| Error::RegistryFull)?;
        }

        self.entries = staged;
        self.populated = true;

        Ok(())
    }

    /// Exact length-and-byte-equality lookup. First (and only, since
    /// `publish` rejects duplicate names) match wins.
    pub fn lookup(&mut self, name: &[u8]) -> Option<&mut ProducerFn> {
        self.entries
            .iter_mut()
            .find(|e| e.name == name)
            .map(|e| &mut e.producer)
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }
}

impl Producers for Registry {
    fn produce(&mut self, name: &[u8], out: &mut [u8]) -> Option<Result<usize, Error>> {
        let producer = self.lookup(name)?;

        Some(match producer() {
            Some(content) if !content.is_empty() => {
                if content.len() > out.len() {
                    Err(Error::BufferOverflow)
                } else {
                    out[..content.len()].copy_from_slice(&content);
                    Ok(content.len())
                }
            }
            _ => Err(Error::ProducerFailed),
        })
    }
}
