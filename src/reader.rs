use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{is_valid_delimiter, Error, Result};
use crate::row::Row;

/// Builds a CSV reader with a non-default configuration.
///
/// The only configuration knob is the field delimiter. Once a [`Reader`] is
/// built, its configuration cannot be changed.
///
/// # Example
///
/// ```
/// use strict_csv::{ReaderBuilder, Row};
///
/// # fn main() -> strict_csv::Result<()> {
/// let mut rdr = ReaderBuilder::new()
///     .delimiter(b'\t')
///     .from_reader("a\tb".as_bytes())?;
/// let mut row = Row::new();
/// assert!(rdr.read_row(&mut row)?);
/// assert_eq!(row.get(0), Some(&b"a"[..]));
/// assert_eq!(row.get(1), Some(&b"b"[..]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReaderBuilder {
    delimiter: u8,
}

impl ReaderBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder { delimiter: b',' }
    }

    /// The field delimiter to use when parsing.
    ///
    /// The default is `b','`. The delimiter may be any single byte except
    /// `"`, `\r` and `\n`, which are structural; building a reader with one
    /// of those fails with
    /// [`Error::InvalidDelimiter`](crate::Error::InvalidDelimiter).
    pub fn delimiter(&mut self, delimiter: u8) -> &mut ReaderBuilder {
        self.delimiter = delimiter;
        self
    }

    /// Build a CSV reader over an arbitrary `io::Read`.
    ///
    /// The reader does not close or otherwise manage `rdr`; dropping the
    /// returned reader drops `rdr`. To keep ownership of the underlying
    /// source (stdin, say, or a file that is closed elsewhere), pass
    /// `&mut rdr`.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Result<Reader<R>> {
        if !is_valid_delimiter(self.delimiter) {
            return Err(Error::InvalidDelimiter(self.delimiter));
        }
        Ok(Reader {
            src: ByteSource::new(rdr),
            delimiter: self.delimiter,
            line: 1,
            field: Vec::with_capacity(256),
        })
    }

    /// Build a CSV reader over the file at the given path.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Reader<File>> {
        self.from_reader(File::open(path)?)
    }
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder::new()
    }
}

/// A streaming CSV reader.
///
/// This reader pulls one byte at a time (with at most one byte of lookahead)
/// from its source and produces one [`Row`] per call to [`Reader::read_row`].
/// It never reads past the row it is asked for.
///
/// Rows are separated by `\r`, `\n` or `\r\n` (the latter counts as a single
/// separator). Fields may be wrapped in `"`, in which case the delimiter,
/// `\r` and `\n` lose their structural meaning inside the field and a
/// literal quote is written doubled (`""`). This reader is strict about
/// those rules: a quote in an unquoted field, a closing quote followed by
/// anything but the delimiter or a row terminator, or an unclosed quote at
/// end of input are reported as [`Error::Format`](crate::Error::Format)
/// rather than patched over.
///
/// # Example
///
/// ```
/// use strict_csv::{Reader, Row};
///
/// # fn main() -> strict_csv::Result<()> {
/// let data = "city,pop\n\"Hello, World\",\"13\"\n";
/// let mut rdr = Reader::from_reader(data.as_bytes());
/// let mut row = Row::new();
/// let mut cities = vec![];
/// while rdr.read_row(&mut row)? {
///     cities.push(row[0].to_vec());
/// }
/// assert_eq!(cities, vec![b"city".to_vec(), b"Hello, World".to_vec()]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Reader<R> {
    /// Where bytes come from, with one byte of pushback.
    src: ByteSource<R>,
    /// The configured field delimiter. Never `"`, `\r` or `\n`.
    delimiter: u8,
    /// The current line number, starting at 1.
    line: u64,
    /// Scratch space for the field currently being scanned. Cleared between
    /// fields; only grows.
    field: Vec<u8>,
}

/// The per-field parsing state. The `quoted` flag rides alongside in
/// `read_row_impl`, recording whether the current field opened with a quote.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// About to begin a field; none of its bytes have been consumed.
    Start,
    /// Inside a field.
    InField,
}

impl<R: io::Read> Reader<R> {
    /// Create a CSV reader with the default configuration (comma delimited).
    pub fn from_reader(rdr: R) -> Reader<R> {
        Reader {
            src: ByteSource::new(rdr),
            delimiter: b',',
            line: 1,
            field: Vec::with_capacity(256),
        }
    }

    /// Read the next row into `row`.
    ///
    /// `row` is cleared first, so a single `Row` can be reused across calls
    /// without reallocating. Returns `Ok(true)` when a row was read — note
    /// that an empty line parses to a row with *zero* fields, which is still
    /// `Ok(true)` — and `Ok(false)` once the input is exhausted.
    ///
    /// On error the partially built row is cleared before returning, and the
    /// source is left wherever the failing read stopped; no attempt is made
    /// to resynchronize, so further calls will not produce reliable rows.
    pub fn read_row(&mut self, row: &mut Row) -> Result<bool> {
        match self.read_row_impl(row) {
            Ok(more) => Ok(more),
            Err(err) => {
                row.clear();
                self.field.clear();
                Err(err)
            }
        }
    }

    /// Returns an iterator over the remaining rows, yielding a fresh [`Row`]
    /// per item and ending at end of input.
    pub fn rows(&mut self) -> Rows<R> {
        Rows { rdr: self }
    }

    /// Return the current line number, starting at 1.
    ///
    /// The count advances on every consumed row terminator and on every line
    /// break inside a quoted field. Format errors carry this number.
    pub fn line(&self) -> u64 {
        self.line
    }

    fn read_row_impl(&mut self, row: &mut Row) -> Result<bool> {
        row.clear();
        self.field.clear();
        let mut state = State::Start;
        let mut quoted = false;
        loop {
            let c = self.src.read_byte()?;
            match state {
                State::Start => match c {
                    Some(b'"') => {
                        // quoted is always false in Start: it resets when a
                        // field is closed and Start consumes no field bytes.
                        quoted = true;
                        state = State::InField;
                    }
                    None => {
                        // A preceding delimiter means one more (empty) field
                        // is owed. With no fields at all, the input is done.
                        if row.is_empty() {
                            return Ok(false);
                        }
                        row.push_field(&self.field)?;
                        return Ok(true);
                    }
                    Some(b @ b'\r') | Some(b @ b'\n') => {
                        self.consume_line_break(b)?;
                        if !row.is_empty() {
                            row.push_field(&self.field)?;
                        }
                        return Ok(true);
                    }
                    Some(b) if b == self.delimiter => {
                        row.push_field(&self.field)?;
                        self.field.clear();
                    }
                    Some(b) => {
                        push_byte(&mut self.field, b)?;
                        state = State::InField;
                    }
                },
                State::InField => match c {
                    Some(b'"') if !quoted => {
                        return Err(self.format_error(
                            "quote in unquoted field; \
                             a field containing quotes must itself be quoted",
                        ));
                    }
                    Some(b'"') => {
                        // One byte of lookahead decides whether this quote
                        // escapes a quote, closes the field or closes the
                        // row.
                        match self.src.read_byte()? {
                            Some(b'"') => push_byte(&mut self.field, b'"')?,
                            Some(b) if b == self.delimiter => {
                                row.push_field(&self.field)?;
                                self.field.clear();
                                state = State::Start;
                                quoted = false;
                            }
                            Some(b @ b'\r') | Some(b @ b'\n') => {
                                self.consume_line_break(b)?;
                                row.push_field(&self.field)?;
                                return Ok(true);
                            }
                            _ => {
                                return Err(self.format_error(
                                    "closing quote may only be followed by \
                                     the delimiter or a line break",
                                ));
                            }
                        }
                    }
                    None => {
                        if quoted {
                            return Err(
                                self.format_error("unclosed quote at end of input")
                            );
                        }
                        // Treat end of input as end of row; the next call
                        // reports that no rows remain.
                        row.push_field(&self.field)?;
                        return Ok(true);
                    }
                    Some(b @ b'\r') | Some(b @ b'\n') => {
                        if quoted {
                            // Line breaks are content here, but the line
                            // counter still advances, with `\r\n` counting
                            // once just like a row terminator.
                            self.line += 1;
                            push_byte(&mut self.field, b)?;
                            if b == b'\r' {
                                if let Some(nb) = self.src.read_byte()? {
                                    if nb == b'\n' {
                                        push_byte(&mut self.field, nb)?;
                                    } else {
                                        self.src.unread_byte(nb);
                                    }
                                }
                            }
                        } else {
                            self.consume_line_break(b)?;
                            row.push_field(&self.field)?;
                            return Ok(true);
                        }
                    }
                    Some(b) if b == self.delimiter => {
                        if quoted {
                            push_byte(&mut self.field, b)?;
                        } else {
                            row.push_field(&self.field)?;
                            self.field.clear();
                            state = State::Start;
                            quoted = false;
                        }
                    }
                    Some(b) => push_byte(&mut self.field, b)?,
                },
            }
        }
    }

    /// Finish consuming a row terminator whose first byte was `first`: a
    /// `\r` swallows an immediately following `\n`, anything else is pushed
    /// back for the next read.
    fn consume_line_break(&mut self, first: u8) -> Result<()> {
        if first == b'\r' {
            if let Some(b) = self.src.read_byte()? {
                if b != b'\n' {
                    self.src.unread_byte(b);
                }
            }
        }
        self.line += 1;
        Ok(())
    }

    fn format_error(&self, message: &'static str) -> Error {
        Error::Format { line: self.line, message }
    }
}

impl Reader<File> {
    /// Create a CSV reader with the default configuration over the file at
    /// the given path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
        Ok(Reader::from_reader(File::open(path)?))
    }
}

/// Append one byte to the field buffer, growing it fallibly.
fn push_byte(buf: &mut Vec<u8>, b: u8) -> Result<()> {
    if buf.len() == buf.capacity() {
        buf.try_reserve(1)?;
    }
    buf.push(b);
    Ok(())
}

/// An iterator over the rows of a CSV reader, created by [`Reader::rows`].
///
/// Ends at end of input. An error does not end the iterator by itself, but
/// after yielding an error the underlying reader is not positioned on a row
/// boundary, so callers should stop on the first `Err`.
pub struct Rows<'r, R> {
    rdr: &'r mut Reader<R>,
}

impl<'r, R: io::Read> Iterator for Rows<'r, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Result<Row>> {
        let mut row = Row::new();
        match self.rdr.read_row(&mut row) {
            Ok(true) => Some(Ok(row)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// A byte source with a single byte of pushback.
///
/// The pushback slot is what lets the parser collapse `\r\n` into one row
/// terminator and decide what a closing quote means with only one byte of
/// lookahead; no other rewinding of the source ever happens.
#[derive(Debug)]
struct ByteSource<R> {
    rdr: io::BufReader<R>,
    unread: Option<u8>,
}

impl<R: io::Read> ByteSource<R> {
    fn new(rdr: R) -> ByteSource<R> {
        ByteSource { rdr: io::BufReader::new(rdr), unread: None }
    }

    /// Read the next byte, or `None` at end of input.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.unread.take() {
            return Ok(Some(b));
        }
        let mut one = [0u8; 1];
        loop {
            match self.rdr.read(&mut one) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(one[0])),
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    /// Push `b` back so the next `read_byte` returns it. At most one byte
    /// can be pending.
    fn unread_byte(&mut self, b: u8) {
        debug_assert!(self.unread.is_none());
        self.unread = Some(b);
    }
}
