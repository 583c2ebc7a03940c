//! Reading documents line by line into a [`Dataset`].
//!
//! Parsing is fail-fast: the first malformed line or rule violation stops the
//! loop and is returned as a [`ParseError`]. Nothing is retried.

use embedded_io::{Error as _, Read};

use crate::dataset::Dataset;
use crate::error::{ErrorKind, InsertError, ParseError};
use crate::grammar::{parse_pair, parse_section};
use crate::lexer::{byte_at, is_blank_line, skip_ignored};
use crate::storage::{HeapStorage, Storage};
use crate::MAX_LINE_SIZE;

/// One line as read, terminator included.
#[derive(Debug, Clone, Copy)]
pub struct Line<'buf> {
    /// One-based line number
    pub number: usize,
    pub bytes: &'buf [u8],
}

/// Splits a byte stream into `\n`-terminated lines.
///
/// Lines are assembled in a caller-provided buffer; a line longer than the
/// buffer is an error, not a split.
pub struct LineReader<'buf, R> {
    reader: R,
    buf: &'buf mut [u8],
    n_bytes: usize,    // Bytes of `buf` holding data
    n_consumed: usize, // Length of the line handed out last
    eof: bool,
    line_number: usize,
}

impl<'buf, R: Read> LineReader<'buf, R> {
    #[must_use]
    pub fn new(reader: R, buf: &'buf mut [u8]) -> Self {
        LineReader {
            reader,
            buf,
            n_bytes: 0,
            n_consumed: 0,
            eof: false,
            line_number: 0,
        }
    }

    /// Number of the line returned last, 0 before the first line.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns the next line, or `None` at the end of the stream.
    ///
    /// The last line may lack a terminator.
    ///
    /// # Errors
    ///
    /// - `LineTooLong` if a line does not fit in the buffer
    /// - `Io` if the underlying reader fails
    pub fn next_line(&mut self) -> Result<Option<Line<'_>>, ParseError> {
        self.shift_out_consumed();

        let mut scanned = 0;
        loop {
            if let Some(pos) = self.buf[scanned..self.n_bytes]
                .iter()
                .position(|&b| b == b'\n')
            {
                return Ok(Some(self.take(scanned + pos + 1)));
            }
            scanned = self.n_bytes;

            if self.eof {
                if self.n_bytes == 0 {
                    return Ok(None);
                }
                return Ok(Some(self.take(self.n_bytes)));
            }
            if self.n_bytes == self.buf.len() {
                if self.at_end()? {
                    continue;
                }
                return Err(ParseError::new(
                    ErrorKind::LineTooLong,
                    self.line_number + 1,
                    &self.buf[..self.n_bytes],
                    self.n_bytes,
                ));
            }
            self.read_more()?;
        }
    }

    fn take(&mut self, length: usize) -> Line<'_> {
        self.n_consumed = length;
        self.line_number += 1;
        Line {
            number: self.line_number,
            bytes: &self.buf[..length],
        }
    }

    fn shift_out_consumed(&mut self) {
        if self.n_consumed > 0 {
            self.buf.copy_within(self.n_consumed..self.n_bytes, 0);
            self.n_bytes -= self.n_consumed;
            self.n_consumed = 0;
        }
    }

    /// Reads one byte past a full buffer to tell a last line from an overlong one.
    fn at_end(&mut self) -> Result<bool, ParseError> {
        let mut lookahead = [0u8; 1];
        match self.reader.read(&mut lookahead) {
            Ok(0) => {
                self.eof = true;
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(e) => Err(ParseError::io(e.kind(), self.line_number + 1)),
        }
    }

    fn read_more(&mut self) -> Result<(), ParseError> {
        match self.reader.read(&mut self.buf[self.n_bytes..]) {
            Ok(0) => self.eof = true,
            Ok(n) => self.n_bytes += n,
            Err(e) => return Err(ParseError::io(e.kind(), self.line_number + 1)),
        }
        Ok(())
    }
}

/// Parses `reader` into `dataset`, assembling lines in `line_buffer`.
///
/// Sections and pairs are appended to whatever `dataset` already holds. On
/// failure the dataset is cleared: heap storage is released, fixed storage is
/// left empty.
///
/// # Errors
///
/// The first error encountered, see [`ErrorKind`].
pub fn read_into<R: Read, S: Storage>(
    reader: R,
    dataset: &mut Dataset<S>,
    line_buffer: &mut [u8],
) -> Result<(), ParseError> {
    let result = parse_lines(reader, dataset, line_buffer);
    if let Err(e) = &result {
        log::debug!("parse failed: {e}");
        dataset.clear();
    }
    result
}

fn parse_lines<R: Read, S: Storage>(
    reader: R,
    dataset: &mut Dataset<S>,
    line_buffer: &mut [u8],
) -> Result<(), ParseError> {
    let mut lines = LineReader::new(reader, line_buffer);
    let mut current_section = None;
    while let Some(line) = lines.next_line()? {
        parse_line(dataset, &mut current_section, line)?;
    }
    Ok(())
}

/// Applies one line to the dataset, tracking the section pairs go to.
fn parse_line<S: Storage>(
    dataset: &mut Dataset<S>,
    current_section: &mut Option<usize>,
    line: Line<'_>,
) -> Result<(), ParseError> {
    let fail = |kind, offset| ParseError::new(kind, line.number, line.bytes, offset);

    let text = core::str::from_utf8(line.bytes)
        .map_err(|e| fail(ErrorKind::InvalidEncoding, e.valid_up_to()))?;

    if is_blank_line(text) {
        log::trace!("line {}: blank", line.number);
        return Ok(());
    }
    let start = skip_ignored(line.bytes, 0);

    match parse_pair(text) {
        Ok(pair) => {
            let Some(section) = *current_section else {
                return Err(fail(ErrorKind::PairOutsideSection, start));
            };
            log::trace!("line {}: pair {}", line.number, pair.key);
            return match dataset.push_pair_at(section, pair.key, pair.value) {
                Ok(_) => Ok(()),
                Err(e) => {
                    log::debug!("line {}: {e}", line.number);
                    Err(fail(ErrorKind::StorageExhausted, start))
                }
            };
        }
        Err(e) if byte_at(line.bytes, start) != b'[' => {
            return Err(fail(ErrorKind::MalformedPair, e.offset));
        }
        Err(_) => {}
    }

    let name = parse_section(text).map_err(|e| fail(ErrorKind::MalformedSection, e.offset))?;
    match dataset.add_section(name) {
        Ok(section) => {
            *current_section = Some(section.index());
            Ok(())
        }
        Err(InsertError::DuplicateSection) => Err(fail(ErrorKind::DuplicateSection, start)),
        Err(e) => {
            log::debug!("line {}: {e}", line.number);
            Err(fail(ErrorKind::StorageExhausted, start))
        }
    }
}

impl<S: Storage> Dataset<S> {
    /// Parses `reader` into this dataset with a [`MAX_LINE_SIZE`] line buffer.
    ///
    /// # Errors
    ///
    /// See [`read_into`]; the dataset is cleared on failure.
    pub fn read_from<R: Read>(&mut self, reader: R) -> Result<(), ParseError> {
        let mut line_buffer = [0u8; MAX_LINE_SIZE];
        read_into(reader, self, &mut line_buffer)
    }
}

impl Dataset<HeapStorage> {
    /// Parses a whole document held in memory.
    ///
    /// # Errors
    ///
    /// The first error encountered, see [`ErrorKind`].
    pub fn parse_str(text: &str) -> Result<Self, ParseError> {
        let mut dataset = Self::new();
        dataset.read_from(text.as_bytes())?;
        Ok(dataset)
    }

    /// Opens and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// `Io` with line number 0 if the file cannot be opened, otherwise the
    /// first error encountered.
    #[cfg(feature = "std")]
    pub fn read_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ParseError> {
        let file = std::fs::File::open(path)
            .map_err(|e| ParseError::io(embedded_io::Error::kind(&e), 0))?;
        let mut dataset = Self::new();
        dataset.read_from(embedded_io_adapters::std::FromStd::new(file))?;
        Ok(dataset)
    }
}
