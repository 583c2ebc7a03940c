//! Line grammar for section headers, keys and values.
//!
//! Every parser takes one raw line and either borrows the parsed token from
//! it or returns a [`SyntaxError`] whose offset is relative to the start of
//! that raw line, not to wherever whitespace skipping happened to stop.
//!
//! ```
//! use inidb::grammar::{parse_pair, parse_section};
//!
//! assert_eq!(parse_section(" [ Server Settings ] ; main").unwrap(), "Server Settings");
//!
//! let pair = parse_pair("port = 8080 # default").unwrap();
//! assert_eq!((pair.key, pair.value), ("port", "8080"));
//!
//! assert_eq!(parse_section("[Too  many]").unwrap_err().offset, 6);
//! ```

use crate::error::SyntaxError;
use crate::lexer::{
    byte_at, is_delimiter, is_key_char, is_key_start, is_section_name_char,
    is_section_name_start, is_value_char, skip_ignored,
};
use crate::MAX_STRING_LEN;

/// A key and its value, borrowed from a line or from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

fn fail<T>(offset: usize) -> Result<T, SyntaxError> {
    Err(SyntaxError { offset })
}

fn check_length(start: usize, pos: usize) -> Result<(), SyntaxError> {
    if pos - start >= MAX_STRING_LEN {
        return fail(pos);
    }
    Ok(())
}

/// Parses `[name]` and returns the name.
///
/// The name starts with a letter or underscore and continues with letters,
/// digits and underscores. A single space between two name characters is part
/// of the name; any other whitespace ends it, which makes a doubled interior
/// space fail at the first byte after the whitespace run.
///
/// # Errors
///
/// `SyntaxError` at the first byte that breaks the grammar.
pub fn parse_section(line: &str) -> Result<&str, SyntaxError> {
    let bytes = line.as_bytes();

    let mut c = skip_ignored(bytes, 0);
    if byte_at(bytes, c) != b'[' {
        return fail(c);
    }
    c = skip_ignored(bytes, c + 1);

    let start = c;
    if !is_section_name_start(byte_at(bytes, c)) {
        return fail(c);
    }
    loop {
        let b = byte_at(bytes, c);
        let single_space = b == b' ' && is_section_name_char(byte_at(bytes, c + 1));
        if !(is_section_name_char(b) || single_space) {
            break;
        }
        check_length(start, c)?;
        c += 1;
    }
    let end = c;

    c = skip_ignored(bytes, c);
    if byte_at(bytes, c) != b']' {
        return fail(c);
    }
    c = skip_ignored(bytes, c + 1);
    if byte_at(bytes, c) != 0 {
        return fail(c);
    }

    Ok(&line[start..end])
}

/// Parses the key of a `key=value` line.
///
/// The delimiter (`=` or `:`) must follow the key, possibly after whitespace,
/// but is left for [`parse_value`].
///
/// # Errors
///
/// `SyntaxError` at the first byte that breaks the grammar.
pub fn parse_key(line: &str) -> Result<&str, SyntaxError> {
    let bytes = line.as_bytes();

    let mut c = skip_ignored(bytes, 0);
    let start = c;
    if !is_key_start(byte_at(bytes, c)) {
        return fail(c);
    }
    while is_key_char(byte_at(bytes, c)) {
        check_length(start, c)?;
        c += 1;
    }
    let end = c;

    c = skip_ignored(bytes, c);
    if !is_delimiter(byte_at(bytes, c)) {
        return fail(c);
    }

    Ok(&line[start..end])
}

/// Parses the value of a `key=value` line.
///
/// Scanning starts after the first delimiter on the line. A value is either a
/// run of value characters with single interior spaces, or a double-quoted
/// string in which spaces are unrestricted. Quotes are not part of the
/// returned value. A trailing comment is allowed.
///
/// # Errors
///
/// `SyntaxError` at the first byte that breaks the grammar, or at the end of
/// the line if there is no delimiter.
pub fn parse_value(line: &str) -> Result<&str, SyntaxError> {
    let bytes = line.as_bytes();

    let mut c = 0;
    while byte_at(bytes, c) != 0 && !is_delimiter(byte_at(bytes, c)) {
        c += 1;
    }
    if byte_at(bytes, c) == 0 {
        return fail(c);
    }
    c = skip_ignored(bytes, c + 1);

    let quoted = byte_at(bytes, c) == b'"';
    if quoted {
        c += 1;
    }

    let start = c;
    loop {
        let b = byte_at(bytes, c);
        let space_allowed =
            b == b' ' && (quoted || is_value_char(byte_at(bytes, c + 1)));
        if !(is_value_char(b) || space_allowed) {
            break;
        }
        check_length(start, c)?;
        c += 1;
    }
    let end = c;

    if quoted {
        if byte_at(bytes, c) != b'"' {
            return fail(c);
        }
        c += 1;
    }

    c = skip_ignored(bytes, c);
    if byte_at(bytes, c) != 0 {
        return fail(c);
    }

    Ok(&line[start..end])
}

/// Parses a whole `key=value` line.
///
/// # Errors
///
/// The error of [`parse_key`] if the key is malformed, otherwise the error of
/// [`parse_value`].
pub fn parse_pair(line: &str) -> Result<Pair<'_>, SyntaxError> {
    let key = parse_key(line)?;
    let value = parse_value(line)?;
    Ok(Pair { key, value })
}

/// Whether `name` reads back unchanged from a `[name]` header.
#[must_use]
pub fn is_section_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        Some(&first) if is_section_name_start(first) => {}
        _ => return false,
    }
    bytes.iter().enumerate().all(|(i, &b)| {
        is_section_name_char(b) || (b == b' ' && is_section_name_char(byte_at(bytes, i + 1)))
    })
}

/// Whether `key` reads back unchanged as the key of a pair.
#[must_use]
pub fn is_key(key: &str) -> bool {
    let bytes = key.as_bytes();
    match bytes.first() {
        Some(&first) if is_key_start(first) => bytes.iter().all(|&b| is_key_char(b)),
        _ => false,
    }
}

/// Whether `value` reads back unchanged, quoted if it holds spaces.
#[must_use]
pub fn is_value(value: &str) -> bool {
    value.bytes().all(|b| b == b' ' || is_value_char(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representable_strings() {
        assert!(is_section_name("Server Settings"));
        assert!(!is_section_name("Server  Settings"));
        assert!(!is_section_name("Server "));
        assert!(!is_section_name("a]b"));
        assert!(!is_section_name(""));

        assert!(is_key("_key1"));
        assert!(!is_key("k=1"));
        assert!(!is_key("two words"));
        assert!(!is_key(""));

        assert!(is_value(""));
        assert!(is_value("  padded  value "));
        assert!(is_value("2 + 2 = 4"));
        assert!(!is_value("a;b"));
        assert!(!is_value("x # y"));
        assert!(!is_value("say \"hi\""));
        assert!(!is_value("line\nbreak"));
    }

    #[test]
    fn empty_value_is_accepted() {
        assert_eq!(parse_value("key="), Ok(""));
        assert_eq!(parse_value("key=\"\""), Ok(""));
        assert_eq!(parse_value("key =   ; nothing"), Ok(""));
    }

    #[test]
    fn value_may_contain_utf8() {
        assert_eq!(parse_value("name=Zoë Ångström"), Ok("Zoë Ångström"));
    }

    #[test]
    fn colon_delimits_pairs() {
        let pair = parse_pair("key: value").unwrap();
        assert_eq!(pair, Pair { key: "key", value: "value" });
    }
}
