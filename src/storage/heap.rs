//! Growable heap storage.
//!
//! Tables start at [`INITIAL_SECTION_CAPACITY`] sections and
//! [`INITIAL_PAIR_CAPACITY`] pairs per section and double when full. Every
//! table growth and every string copy is first authorised by the storage's
//! [`Allocator`] and then performed with `try_reserve`, so running out of
//! memory is reported as [`StorageError::AllocationRefused`] instead of
//! aborting.

use alloc::collections::TryReserveError;
use alloc::string::String;
use alloc::vec::Vec;
use core::mem::size_of;

use crate::error::StorageError;
use crate::grammar::Pair;
use crate::storage::Storage;

pub const INITIAL_SECTION_CAPACITY: usize = 8;
pub const INITIAL_PAIR_CAPACITY: usize = 32;

/// Authorises heap use of a [`HeapStorage`].
///
/// The storage asks before it grows a table or copies a string, and reports
/// every byte it gives back. Memory itself still comes from the global Rust
/// allocator; an `Allocator` decides how much of it a dataset may hold.
pub trait Allocator {
    /// Returns `false` to refuse `bytes` more bytes.
    fn acquire(&mut self, bytes: usize) -> bool;

    fn release(&mut self, bytes: usize);
}

/// Grants every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct Global;

impl Allocator for Global {
    fn acquire(&mut self, _bytes: usize) -> bool {
        true
    }

    fn release(&mut self, _bytes: usize) {}
}

/// Refuses every request, for code that must not touch the heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHeap;

impl Allocator for NoHeap {
    fn acquire(&mut self, _bytes: usize) -> bool {
        false
    }

    fn release(&mut self, _bytes: usize) {}
}

/// Grants requests until `limit` bytes are in use.
#[derive(Debug, Clone)]
pub struct Budget {
    limit: usize,
    used: usize,
}

impl Budget {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Budget { limit, used: 0 }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit - self.used
    }
}

impl Allocator for Budget {
    fn acquire(&mut self, bytes: usize) -> bool {
        if bytes > self.remaining() {
            return false;
        }
        self.used += bytes;
        true
    }

    fn release(&mut self, bytes: usize) {
        self.used = self.used.saturating_sub(bytes);
    }
}

impl<A: Allocator + ?Sized> Allocator for &mut A {
    fn acquire(&mut self, bytes: usize) -> bool {
        (**self).acquire(bytes)
    }

    fn release(&mut self, bytes: usize) {
        (**self).release(bytes);
    }
}

#[derive(Debug)]
struct HeapPair {
    key: String,
    value: String,
}

#[derive(Debug)]
struct HeapSection {
    name: String,
    pairs: Vec<HeapPair>,
    pair_capacity: usize,
}

/// Sections and pairs in independently growable heap tables.
#[derive(Debug)]
pub struct HeapStorage<A: Allocator = Global> {
    sections: Vec<HeapSection>,
    section_capacity: usize,
    alloc: A,
    acquired: usize,
}

fn try_copy(s: &str) -> Result<String, TryReserveError> {
    let mut copy = String::new();
    copy.try_reserve_exact(s.len())?;
    copy.push_str(s);
    Ok(copy)
}

/// Doubles `capacity`, starting from `initial` for an empty table.
fn grown(capacity: usize, initial: usize) -> usize {
    if capacity == 0 {
        initial
    } else {
        capacity * 2
    }
}

impl HeapStorage<Global> {
    #[must_use]
    pub fn new() -> Self {
        HeapStorage {
            sections: Vec::with_capacity(INITIAL_SECTION_CAPACITY),
            section_capacity: INITIAL_SECTION_CAPACITY,
            alloc: Global,
            acquired: 0,
        }
    }
}

impl Default for HeapStorage<Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> HeapStorage<A> {
    /// Creates a storage whose heap use is authorised by `alloc`.
    ///
    /// # Errors
    ///
    /// `AllocationRefused` if the initial section table cannot be allocated.
    pub fn new_in(alloc: A) -> Result<Self, StorageError> {
        let mut storage = HeapStorage {
            sections: Vec::new(),
            section_capacity: 0,
            alloc,
            acquired: 0,
        };
        storage.reserve_sections()?;
        Ok(storage)
    }

    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Bytes currently held on behalf of the allocator.
    #[must_use]
    pub fn acquired_bytes(&self) -> usize {
        self.acquired
    }

    #[must_use]
    pub fn section_capacity(&self) -> usize {
        self.section_capacity
    }

    #[must_use]
    pub fn pair_capacity(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, |s| s.pair_capacity)
    }

    fn grant(&mut self, bytes: usize) -> Result<(), StorageError> {
        if !self.alloc.acquire(bytes) {
            return Err(StorageError::AllocationRefused { requested: bytes });
        }
        self.acquired += bytes;
        Ok(())
    }

    fn give_back(&mut self, bytes: usize) {
        self.alloc.release(bytes);
        self.acquired -= bytes;
    }

    /// Makes room for one more section.
    fn reserve_sections(&mut self) -> Result<(), StorageError> {
        if self.sections.len() < self.section_capacity {
            return Ok(());
        }
        let capacity = grown(self.section_capacity, INITIAL_SECTION_CAPACITY);
        let bytes = (capacity - self.section_capacity) * size_of::<HeapSection>();
        self.grant(bytes)?;
        if self
            .sections
            .try_reserve_exact(capacity - self.sections.len())
            .is_err()
        {
            self.give_back(bytes);
            return Err(StorageError::AllocationRefused { requested: bytes });
        }
        self.section_capacity = capacity;
        Ok(())
    }

    /// Makes room for one more pair in `section`.
    fn reserve_pairs(&mut self, section: usize) -> Result<(), StorageError> {
        let count = self.sections.len();
        let (len, capacity) = match self.sections.get(section) {
            Some(s) => (s.pairs.len(), s.pair_capacity),
            None => return Err(StorageError::SectionOutOfBounds { index: section, count }),
        };
        if len < capacity {
            return Ok(());
        }
        let new_capacity = grown(capacity, INITIAL_PAIR_CAPACITY);
        let bytes = (new_capacity - capacity) * size_of::<HeapPair>();
        self.grant(bytes)?;
        let target = &mut self.sections[section];
        if target.pairs.try_reserve_exact(new_capacity - len).is_err() {
            self.give_back(bytes);
            return Err(StorageError::AllocationRefused { requested: bytes });
        }
        target.pair_capacity = new_capacity;
        Ok(())
    }
}

impl<A: Allocator> Storage for HeapStorage<A> {
    fn section_count(&self) -> usize {
        self.sections.len()
    }

    fn section_name(&self, section: usize) -> Option<&str> {
        self.sections.get(section).map(|s| s.name.as_str())
    }

    fn pair_count(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, |s| s.pairs.len())
    }

    fn pair(&self, section: usize, index: usize) -> Option<Pair<'_>> {
        let pair = self.sections.get(section)?.pairs.get(index)?;
        Some(Pair {
            key: &pair.key,
            value: &pair.value,
        })
    }

    fn push_section(&mut self, name: &str) -> Result<usize, StorageError> {
        self.reserve_sections()?;

        let bytes = name.len() + INITIAL_PAIR_CAPACITY * size_of::<HeapPair>();
        self.grant(bytes)?;
        let built = try_copy(name).and_then(|name| {
            let mut pairs = Vec::new();
            pairs.try_reserve_exact(INITIAL_PAIR_CAPACITY)?;
            Ok(HeapSection {
                name,
                pairs,
                pair_capacity: INITIAL_PAIR_CAPACITY,
            })
        });
        match built {
            Ok(section) => {
                self.sections.push(section);
                Ok(self.sections.len() - 1)
            }
            Err(_) => {
                self.give_back(bytes);
                Err(StorageError::AllocationRefused { requested: bytes })
            }
        }
    }

    fn push_pair(
        &mut self,
        section: usize,
        key: &str,
        value: &str,
    ) -> Result<usize, StorageError> {
        self.reserve_pairs(section)?;

        let bytes = key.len() + value.len();
        self.grant(bytes)?;
        let built = try_copy(key).and_then(|key| Ok(HeapPair { key, value: try_copy(value)? }));
        match built {
            Ok(pair) => {
                let pairs = &mut self.sections[section].pairs;
                pairs.push(pair);
                Ok(pairs.len() - 1)
            }
            Err(_) => {
                self.give_back(bytes);
                Err(StorageError::AllocationRefused { requested: bytes })
            }
        }
    }

    fn clear(&mut self) {
        self.sections = Vec::new();
        self.section_capacity = 0;
        let acquired = self.acquired;
        self.give_back(acquired);
    }
}

impl<A: Allocator> Drop for HeapStorage<A> {
    fn drop(&mut self) {
        self.alloc.release(self.acquired);
    }
}
