//! Backing storage for datasets.
//!
//! A [`Storage`] keeps an ordered list of sections, each with an ordered list
//! of pairs, and addresses both by index. Two implementations are provided:
//!
//! - [`HeapStorage`]: growable tables on the heap, with every allocation
//!   authorised by an [`Allocator`] capability.
//! - [`FixedStorage`]: everything inside one caller-provided byte buffer with
//!   fixed section and pair limits. Never allocates.
//!
//! Uniqueness of section names is not a storage concern, it is enforced by
//! [`crate::Dataset`].

mod fixed;
mod heap;

pub use fixed::{FixedStorage, DEFAULT_MAX_PAIRS, DEFAULT_MAX_SECTIONS};
pub use heap::{
    Allocator, Budget, Global, HeapStorage, NoHeap, INITIAL_PAIR_CAPACITY,
    INITIAL_SECTION_CAPACITY,
};

use crate::error::StorageError;
use crate::grammar::Pair;

pub trait Storage {
    fn section_count(&self) -> usize;

    /// Name of the section at `section`, `None` if out of bounds.
    fn section_name(&self, section: usize) -> Option<&str>;

    /// Number of pairs in `section`, 0 if out of bounds.
    fn pair_count(&self, section: usize) -> usize;

    /// Pair number `index` of `section`, `None` if either is out of bounds.
    fn pair(&self, section: usize, index: usize) -> Option<Pair<'_>>;

    /// Appends a section and returns its index.
    ///
    /// # Errors
    ///
    /// When the storage cannot grow.
    fn push_section(&mut self, name: &str) -> Result<usize, StorageError>;

    /// Appends a pair to `section` and returns its index within the section.
    ///
    /// # Errors
    ///
    /// `SectionOutOfBounds` for a bad index, otherwise when the storage cannot grow.
    fn push_pair(&mut self, section: usize, key: &str, value: &str)
        -> Result<usize, StorageError>;

    /// Removes everything and gives back what can be given back.
    fn clear(&mut self);
}
