//! Error types.
//!
//! All types here are `no_std` compatible. [`ParseError`] keeps its copy of
//! the offending line inline, so reporting an error never allocates.

use core::fmt;

use thiserror::Error;

use crate::grammar::parse_section;
use crate::MAX_LINE_SIZE;

/// A line failed the grammar at `offset`, a zero-based byte index into the raw line.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid character at offset {offset}")]
pub struct SyntaxError {
    pub offset: usize,
}

/// Failures of the storage backends.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum StorageError {
    /// All section slots are in use
    #[error("Section limit exceeded: maximum {max_sections} sections allowed")]
    SectionLimitExceeded {
        /// Maximum number of sections allowed
        max_sections: usize,
    },
    /// All pair slots of a section are in use
    #[error("Pair limit exceeded: maximum {max_pairs} pairs allowed per section")]
    PairLimitExceeded {
        /// Maximum number of pairs allowed in one section
        max_pairs: usize,
    },
    /// The string area of a fixed buffer is full
    #[error("Buffer overflow: requested {requested} bytes, but only {available} bytes available")]
    BufferOverflow {
        /// Number of bytes requested
        requested: usize,
        /// Number of bytes available
        available: usize,
    },
    /// The allocator refused to provide memory
    #[error("Allocation refused: requested {requested} bytes")]
    AllocationRefused {
        /// Number of bytes requested
        requested: usize,
    },
    /// Section index is beyond the current section count
    #[error("Section index out of bounds: index {index} is beyond section count {count}")]
    SectionOutOfBounds {
        /// Index that was accessed
        index: usize,
        /// Current number of sections
        count: usize,
    },
    /// Buffer is too small to hold the descriptor tables
    #[error("Buffer too small: {required} bytes required, {provided} bytes provided")]
    BufferTooSmall {
        /// Minimum buffer size required
        required: usize,
        /// Actual buffer size provided
        provided: usize,
    },
    /// Invalid configuration parameter
    #[error("Invalid configuration: {parameter} cannot be {value}")]
    InvalidConfiguration {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value
        value: usize,
    },
}

/// Failures of programmatic insertion into a dataset.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum InsertError {
    #[error("section already exists")]
    DuplicateSection,
    #[error("no such section")]
    NoSuchSection,
    /// The name cannot be written as a section header
    #[error("invalid section name")]
    InvalidName,
    /// The key cannot be written as the key of a pair
    #[error("invalid key")]
    InvalidKey,
    /// The value holds characters the grammar rejects even when quoted
    #[error("invalid value")]
    InvalidValue,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What went wrong while reading a document.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("Failed to parse section.")]
    MalformedSection,
    #[error("Failed to parse pair.")]
    MalformedPair,
    #[error("Pairs must reside within a section.")]
    PairOutsideSection,
    #[error("Duplicate section.")]
    DuplicateSection,
    #[error("Storage exhausted.")]
    StorageExhausted,
    #[error("Line too long.")]
    LineTooLong,
    #[error("Invalid UTF-8.")]
    InvalidEncoding,
    #[error("I/O error: {0:?}")]
    Io(embedded_io::ErrorKind),
}

/// The first error of a parse attempt.
///
/// Holds the raw line as read (terminator included, truncated to
/// [`MAX_LINE_SIZE`] bytes), its one-based number, and the byte offset of the
/// first invalid character. I/O failures that happen outside of any line
/// carry line number 0 and an empty line.
#[derive(Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ErrorKind,
    line_number: usize,
    offset: usize,
    line: [u8; MAX_LINE_SIZE],
    line_len: usize,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ErrorKind, line_number: usize, line: &[u8], offset: usize) -> Self {
        let line_len = line.len().min(MAX_LINE_SIZE);
        let mut copy = [0u8; MAX_LINE_SIZE];
        copy[..line_len].copy_from_slice(&line[..line_len]);
        ParseError {
            kind,
            line_number,
            offset,
            line: copy,
            line_len,
        }
    }

    pub(crate) fn io(kind: embedded_io::ErrorKind, line_number: usize) -> Self {
        Self::new(ErrorKind::Io(kind), line_number, &[], 0)
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The offending line exactly as read.
    #[must_use]
    pub fn line_bytes(&self) -> &[u8] {
        &self.line[..self.line_len]
    }

    /// The offending line, or its valid UTF-8 prefix for encoding errors.
    #[must_use]
    pub fn line(&self) -> &str {
        let bytes = self.line_bytes();
        match core::str::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
        }
    }

    /// Message, line and a caret under the offending byte, one per row.
    #[must_use]
    pub fn report(&self) -> Report<'_> {
        Report { error: self }
    }

    fn write_message(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == ErrorKind::DuplicateSection {
            if let Ok(name) = parse_section(self.line()) {
                return write!(f, "Duplicate section '{name}'.");
            }
        }
        write!(f, "{}", self.kind)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_message(f)?;
        write!(f, " (line {}, offset {})", self.line_number, self.offset)
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseError")
            .field("kind", &self.kind)
            .field("line_number", &self.line_number)
            .field("offset", &self.offset)
            .field("line", &self.line())
            .finish()
    }
}

impl core::error::Error for ParseError {}

/// Caret display of a [`ParseError`], see [`ParseError::report`].
pub struct Report<'e> {
    error: &'e ParseError,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.write_message(f)?;
        writeln!(f)?;
        writeln!(f, "{}", self.error.line().trim_end_matches(&['\r', '\n'][..]))?;
        write!(f, "{:>width$}", "^", width = self.error.offset + 1)
    }
}
