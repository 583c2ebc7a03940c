#![no_std]
// `ParseError` keeps a copy of the offending line inline
#![allow(clippy::result_large_err)]

//! `inidb`: an INI parser and in-memory database.
//!
//! A document is a list of uniquely named sections, each holding an ordered
//! list of `key=value` pairs:
//!
//! ```text
//! [Server Settings]
//! host = example.org        ; trailing comments are allowed
//! motd = "Welcome,  friend" # quoted values may hold any spaces
//! ```
//!
//! Parsing is line oriented and fail-fast. The first malformed line stops the
//! parse and is reported with its text, its number and the byte offset of the
//! first invalid character:
//!
//! ```
//! use inidb::{Dataset, ErrorKind};
//!
//! let err = Dataset::parse_str("[Section]\nb$ad=pair\n").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::MalformedPair);
//! assert_eq!(err.line(), "b$ad=pair\n");
//! assert_eq!(err.offset(), 1);
//! assert_eq!(err.report().to_string(), "Failed to parse pair.\nb$ad=pair\n ^");
//! ```
//!
//! # Grammar
//!
//! - Section names and keys start with an ASCII letter or `_` and continue
//!   with letters, digits and `_`. Section names may contain single spaces.
//! - A value is either double-quoted, or a run of value characters with
//!   single interior spaces. Value characters are everything except control
//!   characters, space and `[ ] ; # "`.
//! - `;` and `#` start comments, `=` and `:` separate keys from values.
//! - Names, keys and values are at most [`MAX_STRING_LEN`] bytes, lines at
//!   most [`MAX_LINE_SIZE`] bytes.
//!
//! # Storage
//!
//! A [`Dataset`] is generic over its [`Storage`]:
//!
//! - [`HeapStorage`] (the default) grows its tables by doubling. Its heap
//!   use goes through an [`Allocator`] capability, which can cap it
//!   ([`Budget`]) or forbid it ([`NoHeap`]).
//! - [`FixedStorage`] keeps everything in a caller-provided byte buffer with
//!   fixed section and pair limits, for environments without a heap.
//!   Exceeding a limit is an error, never an overflow.
//!
//! ```
//! use inidb::Dataset;
//!
//! let mut buffer = [0u8; 4096];
//! let mut data = Dataset::fixed(&mut buffer, 4, 8).unwrap();
//! data.read_from(&b"[Text]\ngreeting=Hello\nsubject=World\n"[..]).unwrap();
//!
//! assert_eq!(data.get_value("Text", "greeting"), Some("Hello"));
//! assert_eq!(data.get_string("Text", "subject", "nobody"), "World");
//! assert!(data.get_bool("Text", "enthusiastic", true));
//! ```
//!
//! # Queries
//!
//! [`Dataset::get_value`] returns the first matching pair. The typed getters
//! (`get_string`, `get_unsigned`, `get_signed`, `get_hex`, `get_float`,
//! `get_bool`) fall back to the given default when the value is missing or
//! does not parse.
//!
//! ## `no_std` Compatibility
//!
//! The crate is `no_std` and needs `alloc` only for [`HeapStorage`]. Streams
//! are `embedded-io` readers and writers. The default `std` feature adds
//! [`Dataset::read_path`] and [`Dataset::write_path`]:
//! ```toml
//! [dependencies]
//! inidb = { version = "0.1", default-features = false }
//! ```

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod dataset;
mod error;
pub mod grammar;
pub mod lexer;
mod query;
pub mod reader;
pub mod storage;
pub mod writer;

/// Maximum length in bytes of a section name, key or value.
pub const MAX_STRING_LEN: usize = 256;

/// Maximum length in bytes of a line, terminator included.
pub const MAX_LINE_SIZE: usize = 1024;

pub use dataset::{Dataset, Pairs, Section, SectionMut, Sections};
pub use error::{ErrorKind, InsertError, ParseError, Report, StorageError, SyntaxError};
pub use grammar::Pair;
pub use reader::read_into;
pub use storage::{Allocator, Budget, FixedStorage, Global, HeapStorage, NoHeap, Storage};
