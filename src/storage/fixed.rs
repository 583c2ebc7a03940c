//! Storage inside a caller-provided buffer.
//!
//! Buffer layout: `[section descriptors][pair descriptors][string data]`.
//!
//! - A section descriptor is (`name_start`, `name_length`, `pair_count`).
//! - Every section owns `max_pairs` pair descriptors, each
//!   (`key_start`, `key_length`, `value_start`, `value_length`).
//! - Strings are appended to the data section in insertion order.
//!
//! All descriptor fields are little-endian `usize` words. Nothing is ever
//! allocated; running out of slots or bytes is a [`StorageError`].

use core::mem::size_of;

use crate::error::StorageError;
use crate::grammar::Pair;
use crate::storage::Storage;

const WORD: usize = size_of::<usize>();
const SECTION_DESCRIPTOR_SIZE: usize = 3 * WORD;
const PAIR_DESCRIPTOR_SIZE: usize = 4 * WORD;

pub const DEFAULT_MAX_SECTIONS: usize = 8;
pub const DEFAULT_MAX_PAIRS: usize = 32;

/// Sections and pairs stored in a borrowed byte buffer with fixed limits.
#[derive(Debug)]
pub struct FixedStorage<'a> {
    buffer: &'a mut [u8],
    max_sections: usize,
    max_pairs: usize,
    section_count: usize,
    data_used: usize,
}

impl<'a> FixedStorage<'a> {
    /// Bytes taken by the descriptor tables for the given limits.
    ///
    /// A buffer needs at least one more byte than this, plus room for the
    /// strings it is going to hold.
    #[must_use]
    pub const fn metadata_size(max_sections: usize, max_pairs: usize) -> usize {
        max_sections * SECTION_DESCRIPTOR_SIZE + max_sections * max_pairs * PAIR_DESCRIPTOR_SIZE
    }

    /// Creates a storage with room for `max_sections` sections of at most
    /// `max_pairs` pairs each.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if a limit is 0 or the tables would not be addressable
    /// - `BufferTooSmall` if the buffer cannot hold the tables and at least one byte of data
    pub fn new(
        buffer: &'a mut [u8],
        max_sections: usize,
        max_pairs: usize,
    ) -> Result<Self, StorageError> {
        if max_sections == 0 {
            return Err(StorageError::InvalidConfiguration {
                parameter: "max_sections",
                value: max_sections,
            });
        }
        if max_pairs == 0 {
            return Err(StorageError::InvalidConfiguration {
                parameter: "max_pairs",
                value: max_pairs,
            });
        }

        let metadata_space = max_sections
            .checked_mul(max_pairs)
            .and_then(|slots| slots.checked_mul(PAIR_DESCRIPTOR_SIZE))
            .and_then(|pairs| pairs.checked_add(max_sections * SECTION_DESCRIPTOR_SIZE))
            .ok_or(StorageError::InvalidConfiguration {
                parameter: "max_pairs",
                value: max_pairs,
            })?;
        let min_required = metadata_space + 1; // At least 1 byte for data

        if buffer.len() < min_required {
            return Err(StorageError::BufferTooSmall {
                required: min_required,
                provided: buffer.len(),
            });
        }

        Ok(Self {
            buffer,
            max_sections,
            max_pairs,
            section_count: 0,
            data_used: 0,
        })
    }

    /// Creates a storage with [`DEFAULT_MAX_SECTIONS`] and [`DEFAULT_MAX_PAIRS`].
    ///
    /// # Errors
    ///
    /// `BufferTooSmall` if the buffer is too small.
    pub fn with_default_limits(buffer: &'a mut [u8]) -> Result<Self, StorageError> {
        Self::new(buffer, DEFAULT_MAX_SECTIONS, DEFAULT_MAX_PAIRS)
    }

    #[must_use]
    pub fn max_sections(&self) -> usize {
        self.max_sections
    }

    #[must_use]
    pub fn max_pairs(&self) -> usize {
        self.max_pairs
    }

    #[must_use]
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes of string data stored so far.
    #[must_use]
    pub fn data_used(&self) -> usize {
        self.data_used
    }

    /// Bytes left for string data.
    #[must_use]
    pub fn available_bytes(&self) -> usize {
        self.buffer.len() - self.data_start() - self.data_used
    }

    fn pairs_start(&self) -> usize {
        self.max_sections * SECTION_DESCRIPTOR_SIZE
    }

    fn data_start(&self) -> usize {
        Self::metadata_size(self.max_sections, self.max_pairs)
    }

    fn section_offset(&self, section: usize) -> usize {
        section * SECTION_DESCRIPTOR_SIZE
    }

    fn pair_offset(&self, section: usize, index: usize) -> usize {
        self.pairs_start() + (section * self.max_pairs + index) * PAIR_DESCRIPTOR_SIZE
    }

    fn read_word(&self, offset: usize) -> usize {
        let mut word = [0u8; WORD];
        if let Some(bytes) = self.buffer.get(offset..offset + WORD) {
            word.copy_from_slice(bytes);
        }
        usize::from_le_bytes(word)
    }

    fn write_word(&mut self, offset: usize, value: usize) {
        if let Some(bytes) = self.buffer.get_mut(offset..offset + WORD) {
            bytes.copy_from_slice(&value.to_le_bytes());
        }
    }

    fn str_at(&self, start: usize, length: usize) -> Option<&str> {
        let bytes = self.buffer.get(start..start + length)?;
        core::str::from_utf8(bytes).ok()
    }

    fn ensure_data_space(&self, requested: usize) -> Result<(), StorageError> {
        let available = self.available_bytes();
        if requested > available {
            return Err(StorageError::BufferOverflow {
                requested,
                available,
            });
        }
        Ok(())
    }

    /// Appends `s` to the data section and returns its start offset.
    fn store_str(&mut self, s: &str) -> Result<usize, StorageError> {
        self.ensure_data_space(s.len())?;
        let start = self.data_start() + self.data_used;
        let end = start + s.len();
        if let Some(dest) = self.buffer.get_mut(start..end) {
            dest.copy_from_slice(s.as_bytes());
        }
        self.data_used += s.len();
        Ok(start)
    }
}

impl Storage for FixedStorage<'_> {
    fn section_count(&self) -> usize {
        self.section_count
    }

    fn section_name(&self, section: usize) -> Option<&str> {
        if section >= self.section_count {
            return None;
        }
        let offset = self.section_offset(section);
        self.str_at(self.read_word(offset), self.read_word(offset + WORD))
    }

    fn pair_count(&self, section: usize) -> usize {
        if section >= self.section_count {
            return 0;
        }
        self.read_word(self.section_offset(section) + 2 * WORD)
    }

    fn pair(&self, section: usize, index: usize) -> Option<Pair<'_>> {
        if index >= self.pair_count(section) {
            return None;
        }
        let offset = self.pair_offset(section, index);
        let key = self.str_at(self.read_word(offset), self.read_word(offset + WORD))?;
        let value = self.str_at(
            self.read_word(offset + 2 * WORD),
            self.read_word(offset + 3 * WORD),
        )?;
        Some(Pair { key, value })
    }

    fn push_section(&mut self, name: &str) -> Result<usize, StorageError> {
        if self.section_count >= self.max_sections {
            return Err(StorageError::SectionLimitExceeded {
                max_sections: self.max_sections,
            });
        }

        let start = self.store_str(name)?;
        let section = self.section_count;
        let offset = self.section_offset(section);
        self.write_word(offset, start);
        self.write_word(offset + WORD, name.len());
        self.write_word(offset + 2 * WORD, 0);
        self.section_count += 1;

        Ok(section)
    }

    fn push_pair(
        &mut self,
        section: usize,
        key: &str,
        value: &str,
    ) -> Result<usize, StorageError> {
        if section >= self.section_count {
            return Err(StorageError::SectionOutOfBounds {
                index: section,
                count: self.section_count,
            });
        }
        let index = self.pair_count(section);
        if index >= self.max_pairs {
            return Err(StorageError::PairLimitExceeded {
                max_pairs: self.max_pairs,
            });
        }
        // Both strings or neither
        self.ensure_data_space(key.len() + value.len())?;

        let key_start = self.store_str(key)?;
        let value_start = self.store_str(value)?;
        let offset = self.pair_offset(section, index);
        self.write_word(offset, key_start);
        self.write_word(offset + WORD, key.len());
        self.write_word(offset + 2 * WORD, value_start);
        self.write_word(offset + 3 * WORD, value.len());
        self.write_word(self.section_offset(section) + 2 * WORD, index + 1);

        Ok(index)
    }

    fn clear(&mut self) {
        self.section_count = 0;
        self.data_used = 0;
    }
}
