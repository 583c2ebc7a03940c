use core::cell::Cell;
use core::iter::FusedIterator;

use crate::error::{InsertError, StorageError};
use crate::grammar::{is_key, is_section_name, is_value, Pair};
use crate::storage::{Allocator, FixedStorage, HeapStorage, Storage};
use crate::MAX_STRING_LEN;

/// Cuts `s` to at most [`MAX_STRING_LEN`] bytes without splitting a character.
pub(crate) fn bounded(s: &str) -> &str {
    if s.len() <= MAX_STRING_LEN {
        return s;
    }
    let mut end = MAX_STRING_LEN;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// An INI document: uniquely named sections of ordered key/value pairs.
///
/// `S` decides where sections and pairs live, see [`crate::storage`].
/// The last section found by name is remembered, so repeated lookups of the
/// same section skip the scan.
#[derive(Debug)]
pub struct Dataset<S = HeapStorage> {
    storage: S,
    last_hit: Cell<Option<usize>>,
}

impl Dataset<HeapStorage> {
    /// Creates an empty heap-backed dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(HeapStorage::new())
    }
}

impl Default for Dataset<HeapStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> Dataset<HeapStorage<A>> {
    /// Creates an empty heap-backed dataset whose heap use is authorised by `alloc`.
    ///
    /// # Errors
    ///
    /// `AllocationRefused` if the initial section table cannot be allocated.
    pub fn new_in(alloc: A) -> Result<Self, StorageError> {
        Ok(Self::with_storage(HeapStorage::new_in(alloc)?))
    }
}

impl<'a> Dataset<FixedStorage<'a>> {
    /// Creates an empty dataset inside `buffer`, see [`FixedStorage::new`].
    ///
    /// # Errors
    ///
    /// If the limits are invalid or the buffer is too small for them.
    pub fn fixed(
        buffer: &'a mut [u8],
        max_sections: usize,
        max_pairs: usize,
    ) -> Result<Self, StorageError> {
        Ok(Self::with_storage(FixedStorage::new(
            buffer,
            max_sections,
            max_pairs,
        )?))
    }
}

impl<S: Storage> Dataset<S> {
    #[must_use]
    pub fn with_storage(storage: S) -> Self {
        Dataset {
            storage,
            last_hit: Cell::new(None),
        }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.storage.section_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.section_count() == 0
    }

    /// Sections in insertion order.
    #[must_use]
    pub fn sections(&self) -> Sections<'_, S> {
        Sections {
            storage: &self.storage,
            next: 0,
            end: self.storage.section_count(),
        }
    }

    /// The section at `index` in insertion order.
    #[must_use]
    pub fn section(&self, index: usize) -> Option<Section<'_, S>> {
        (index < self.storage.section_count()).then_some(Section {
            storage: &self.storage,
            index,
        })
    }

    /// Finds a section by exact, case-sensitive name.
    #[must_use]
    pub fn has_section(&self, name: &str) -> Option<Section<'_, S>> {
        let index = self.find_section(name)?;
        Some(Section {
            storage: &self.storage,
            index,
        })
    }

    /// Finds a section by name for inserting pairs into it.
    pub fn section_mut(&mut self, name: &str) -> Option<SectionMut<'_, S>> {
        let index = self.find_section(name)?;
        Some(SectionMut {
            storage: &mut self.storage,
            index,
        })
    }

    fn find_section(&self, name: &str) -> Option<usize> {
        let name = bounded(name);
        if let Some(hit) = self.last_hit.get() {
            if self.storage.section_name(hit) == Some(name) {
                return Some(hit);
            }
        }
        let found = (0..self.storage.section_count())
            .find(|&i| self.storage.section_name(i) == Some(name))?;
        self.last_hit.set(Some(found));
        Some(found)
    }

    /// Appends an empty section.
    ///
    /// Names longer than [`MAX_STRING_LEN`] bytes are truncated.
    ///
    /// # Errors
    ///
    /// - `InvalidName` if the name would not read back from a `[name]` header
    /// - `DuplicateSection` if a section of that name exists
    /// - `Storage` if the storage cannot hold another section
    pub fn add_section(&mut self, name: &str) -> Result<SectionMut<'_, S>, InsertError> {
        let name = bounded(name);
        if !is_section_name(name) {
            return Err(InsertError::InvalidName);
        }
        if self.find_section(name).is_some() {
            return Err(InsertError::DuplicateSection);
        }
        let index = self.storage.push_section(name)?;
        log::debug!("added section [{name}] at index {index}");
        Ok(SectionMut {
            storage: &mut self.storage,
            index,
        })
    }

    /// Appends a pair to the section called `section`.
    ///
    /// # Errors
    ///
    /// - `NoSuchSection` if there is no such section
    /// - `InvalidKey` or `InvalidValue`, see [`SectionMut::add_pair`]
    /// - `Storage` if the section cannot hold another pair
    pub fn add_pair(&mut self, section: &str, key: &str, value: &str) -> Result<(), InsertError> {
        let mut target = self
            .section_mut(section)
            .ok_or(InsertError::NoSuchSection)?;
        target.add_pair(key, value)?;
        Ok(())
    }

    pub(crate) fn push_pair_at(
        &mut self,
        section: usize,
        key: &str,
        value: &str,
    ) -> Result<usize, StorageError> {
        self.storage.push_pair(section, bounded(key), bounded(value))
    }

    /// Removes all sections and releases what the storage can release.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.last_hit.set(None);
    }
}

impl<'d, S: Storage> IntoIterator for &'d Dataset<S> {
    type Item = Section<'d, S>;
    type IntoIter = Sections<'d, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections()
    }
}

/// A section of a [`Dataset`].
pub struct Section<'d, S> {
    storage: &'d S,
    index: usize,
}

impl<S> Clone for Section<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Section<'_, S> {}

impl<'d, S: Storage> Section<'d, S> {
    /// Position of the section in insertion order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn name(&self) -> &'d str {
        self.storage.section_name(self.index).unwrap_or_default()
    }

    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.storage.pair_count(self.index)
    }

    #[must_use]
    pub fn pair(&self, index: usize) -> Option<Pair<'d>> {
        self.storage.pair(self.index, index)
    }

    /// Pairs in insertion order, duplicates included.
    #[must_use]
    pub fn pairs(&self) -> Pairs<'d, S> {
        Pairs {
            storage: self.storage,
            section: self.index,
            next: 0,
            end: self.pair_count(),
        }
    }

    /// Value of the first pair called `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'d str> {
        let key = bounded(key);
        self.pairs().find(|pair| pair.key == key).map(|pair| pair.value)
    }
}

impl<S: Storage> core::fmt::Debug for Section<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Section")
            .field("index", &self.index)
            .field("name", &self.name())
            .field("pair_count", &self.pair_count())
            .finish()
    }
}

/// A section of a [`Dataset`] that accepts new pairs.
pub struct SectionMut<'d, S> {
    storage: &'d mut S,
    index: usize,
}

impl<S: Storage> SectionMut<'_, S> {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.storage.section_name(self.index).unwrap_or_default()
    }

    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.storage.pair_count(self.index)
    }

    /// Appends a pair. Keys and values longer than [`MAX_STRING_LEN`] bytes
    /// are truncated.
    ///
    /// Values may hold any spaces, the writer quotes them, but not the
    /// characters that end a value even inside quotes (`[ ] ; # "` and
    /// control characters).
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if the key is not an identifier
    /// - `InvalidValue` if the value would not read back unchanged
    /// - `Storage` if the section cannot hold another pair
    pub fn add_pair(&mut self, key: &str, value: &str) -> Result<Pair<'_>, InsertError> {
        let (key, value) = (bounded(key), bounded(value));
        if !is_key(key) {
            return Err(InsertError::InvalidKey);
        }
        if !is_value(value) {
            return Err(InsertError::InvalidValue);
        }
        let index = self.storage.push_pair(self.index, key, value)?;
        self.storage
            .pair(self.index, index)
            .ok_or(InsertError::Storage(StorageError::SectionOutOfBounds {
                index: self.index,
                count: self.storage.section_count(),
            }))
    }
}

/// Iterator over the sections of a [`Dataset`].
pub struct Sections<'d, S> {
    storage: &'d S,
    next: usize,
    end: usize,
}

impl<'d, S: Storage> Iterator for Sections<'d, S> {
    type Item = Section<'d, S>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let section = Section {
            storage: self.storage,
            index: self.next,
        };
        self.next += 1;
        Some(section)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<S: Storage> ExactSizeIterator for Sections<'_, S> {}
impl<S: Storage> FusedIterator for Sections<'_, S> {}

/// Iterator over the pairs of a [`Section`].
pub struct Pairs<'d, S> {
    storage: &'d S,
    section: usize,
    next: usize,
    end: usize,
}

impl<'d, S: Storage> Iterator for Pairs<'d, S> {
    type Item = Pair<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let pair = self.storage.pair(self.section, self.next);
        self.next += 1;
        pair
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<S: Storage> ExactSizeIterator for Pairs<'_, S> {}
impl<S: Storage> FusedIterator for Pairs<'_, S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn bounded_respects_char_boundaries() {
        let long: String = core::iter::repeat('é').take(200).collect();
        let cut = bounded(&long);
        assert!(cut.len() <= MAX_STRING_LEN);
        assert_eq!(cut.len(), MAX_STRING_LEN);
        assert_eq!(bounded("short"), "short");
    }

    #[test]
    fn cache_follows_the_dataset() {
        let mut data = Dataset::new();
        data.add_section("a").unwrap();
        data.add_section("b").unwrap();
        assert_eq!(data.has_section("b").map(|s| s.index()), Some(1));
        assert_eq!(data.last_hit.get(), Some(1));
        assert_eq!(data.has_section("a").map(|s| s.index()), Some(0));
        data.clear();
        assert_eq!(data.last_hit.get(), None);
        assert!(data.has_section("a").is_none());
    }
}
