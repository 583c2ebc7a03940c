//! Character classes and comment skipping.
//!
//! Lines are scanned byte by byte. Reading past the end of a line, or
//! reaching a NUL byte, both read as end-of-line, so every scanner in
//! [`crate::grammar`] can treat `0` as the terminator.

/// Byte at `pos`, or `0` past the end of the line.
#[inline]
#[must_use]
pub(crate) fn byte_at(line: &[u8], pos: usize) -> u8 {
    line.get(pos).copied().unwrap_or(0)
}

/// Whitespace in the C locale: space, `\t`, `\n`, `\v`, `\f` and `\r`.
#[inline]
#[must_use]
pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Starts a comment that runs to the end of the line.
#[inline]
#[must_use]
pub fn is_comment_start(c: u8) -> bool {
    c == b';' || c == b'#'
}

/// Separates a key from its value.
#[inline]
#[must_use]
pub fn is_delimiter(c: u8) -> bool {
    c == b'=' || c == b':'
}

/// Advances `pos` past whitespace and, if a comment follows, to the end of the line.
///
/// The returned position is either a significant byte or the end of the line
/// (the line length or the position of a NUL byte).
#[must_use]
pub fn skip_ignored(line: &[u8], mut pos: usize) -> usize {
    while is_space(byte_at(line, pos)) {
        pos += 1;
    }
    if is_comment_start(byte_at(line, pos)) {
        while byte_at(line, pos) != 0 {
            pos += 1;
        }
    }
    pos
}

/// A line is blank if it holds nothing but whitespace and an optional comment.
#[must_use]
pub fn is_blank_line(line: &str) -> bool {
    let bytes = line.as_bytes();
    byte_at(bytes, skip_ignored(bytes, 0)) == 0
}

#[inline]
#[must_use]
pub fn is_section_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

/// Interior spaces are handled by the section grammar, not here.
#[inline]
#[must_use]
pub fn is_section_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[inline]
#[must_use]
pub fn is_key_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

#[inline]
#[must_use]
pub fn is_key_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Bytes allowed in a value.
///
/// Everything is allowed except NUL, ASCII control characters, space and the
/// structural characters `[ ] ; # "`. Spaces are admitted by the value
/// grammar: any number inside quotes, one at a time between value characters
/// outside of them. Bytes of multi-byte UTF-8 sequences are value characters.
#[inline]
#[must_use]
pub fn is_value_char(c: u8) -> bool {
    !(c.is_ascii_control() || matches!(c, b' ' | b'[' | b']' | b';' | b'#' | b'"'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_stops_at_significant_byte() {
        assert_eq!(skip_ignored(b"  \tkey", 0), 3);
        assert_eq!(skip_ignored(b"key", 0), 0);
    }

    #[test]
    fn skip_consumes_comment() {
        assert_eq!(skip_ignored(b"  ; comment", 0), 11);
        assert_eq!(skip_ignored(b"value # comment", 5), 15);
    }

    #[test]
    fn nul_ends_the_line() {
        assert_eq!(skip_ignored(b"# abc\0def", 0), 5);
        assert_eq!(byte_at(b"ab", 7), 0);
    }

    #[test]
    fn value_chars_follow_deny_list() {
        for c in b"abcXYZ019_-+.,:'(){}\\/~!@$%^&*|<>?=".iter() {
            assert!(is_value_char(*c), "{} should be a value char", *c as char);
        }
        for c in b"[];#\" \t\r\n\0\x7f".iter() {
            assert!(!is_value_char(*c), "{:?} should not be a value char", *c as char);
        }
        assert!(is_value_char(0xc3));
    }

    #[test]
    fn identifiers() {
        assert!(is_key_start(b'_'));
        assert!(is_key_start(b'k'));
        assert!(!is_key_start(b'1'));
        assert!(is_key_char(b'1'));
        assert!(!is_key_char(b'-'));
        assert!(is_section_name_start(b'S'));
        assert!(!is_section_name_char(b' '));
    }
}
