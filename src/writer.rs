use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{is_valid_delimiter, Error, Result};

/// The quoting style to use when writing CSV data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuoteStyle {
    /// Quote every field. Always.
    All,
    /// Quote a field only when it needs protection: when it contains the
    /// delimiter, a quote, `\r` or `\n`.
    ///
    /// This is the default.
    Minimal,
}

impl Default for QuoteStyle {
    fn default() -> QuoteStyle {
        QuoteStyle::Minimal
    }
}

/// The line break written after each row.
///
/// This only configures the writer. The reader accepts all three forms in a
/// single stream regardless of how the writer was configured.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Terminator {
    /// `\n`. This is the default.
    LF,
    /// `\r\n`.
    CRLF,
    /// `\r`.
    CR,
}

impl Terminator {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            Terminator::LF => b"\n",
            Terminator::CRLF => b"\r\n",
            Terminator::CR => b"\r",
        }
    }
}

impl Default for Terminator {
    fn default() -> Terminator {
        Terminator::LF
    }
}

/// Builds a CSV writer with a non-default configuration.
///
/// This builder permits specifying the field delimiter, the quoting style
/// and the line break. Once a [`Writer`] is built, its configuration cannot
/// be changed.
#[derive(Debug)]
pub struct WriterBuilder {
    delimiter: u8,
    style: QuoteStyle,
    term: Terminator,
}

impl Default for WriterBuilder {
    fn default() -> WriterBuilder {
        WriterBuilder::new()
    }
}

impl WriterBuilder {
    /// Create a new builder with the default configuration: comma delimited,
    /// [`QuoteStyle::Minimal`], [`Terminator::LF`].
    pub fn new() -> WriterBuilder {
        WriterBuilder {
            delimiter: b',',
            style: QuoteStyle::default(),
            term: Terminator::default(),
        }
    }

    /// The field delimiter to use when writing.
    ///
    /// The default is `b','`. The same restriction applies as on the reader:
    /// `"`, `\r` and `\n` are structural and are rejected when the writer is
    /// built.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut WriterBuilder {
        self.delimiter = delimiter;
        self
    }

    /// The quoting style to use when writing.
    ///
    /// The default is [`QuoteStyle::Minimal`].
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.style = style;
        self
    }

    /// The line break to write after each row.
    ///
    /// The default is [`Terminator::LF`].
    pub fn terminator(&mut self, term: Terminator) -> &mut WriterBuilder {
        self.term = term;
        self
    }

    /// Build a CSV writer over an arbitrary `io::Write`.
    ///
    /// The sink is buffered; call [`Writer::flush`] (or [`Writer::into_inner`])
    /// when done. As with the reader, the writer does not close `wtr`; pass
    /// `&mut wtr` to keep ownership of the sink.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Result<Writer<W>> {
        if !is_valid_delimiter(self.delimiter) {
            return Err(Error::InvalidDelimiter(self.delimiter));
        }
        Ok(Writer {
            wtr: io::BufWriter::new(wtr),
            delimiter: self.delimiter,
            style: self.style,
            term: self.term,
        })
    }

    /// Build a CSV writer that writes to the file at the given path,
    /// creating it if necessary and truncating it otherwise.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Writer<File>> {
        self.from_writer(File::create(path)?)
    }
}

/// A streaming CSV writer.
///
/// Serializes rows so that the [`Reader`](crate::Reader) in this crate parses
/// them back losslessly. In particular a row with zero fields is written as
/// an empty line, and a row with exactly one empty field is written as `""`
/// regardless of quote style — otherwise the two would serialize identically.
///
/// # Example
///
/// ```
/// use strict_csv::Writer;
///
/// # fn main() -> strict_csv::Result<()> {
/// let mut wtr = Writer::from_writer(vec![]);
/// wtr.write_row(&["name", "notes"])?;
/// wtr.write_row(&["tab", "a,b"])?;
/// let data = wtr.into_inner()?;
/// assert_eq!(data, b"name,notes\ntab,\"a,b\"\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    wtr: io::BufWriter<W>,
    delimiter: u8,
    style: QuoteStyle,
    term: Terminator,
}

impl<W: io::Write> Writer<W> {
    /// Create a CSV writer with the default configuration (comma delimited,
    /// minimal quoting, `\n` line breaks).
    pub fn from_writer(wtr: W) -> Writer<W> {
        Writer {
            wtr: io::BufWriter::new(wtr),
            delimiter: b',',
            style: QuoteStyle::default(),
            term: Terminator::default(),
        }
    }

    /// Write one row, followed by the configured line break.
    ///
    /// Accepts anything that iterates over byte-string-like fields: a
    /// [`Row`](crate::Row), a vector of strings, a slice of byte slices.
    pub fn write_row<I, T>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut count = 0;
        let mut last_len = 0;
        for field in row {
            let field = field.as_ref();
            if count > 0 {
                let delim = self.delimiter;
                self.write_bytes(&[delim])?;
            }
            count += 1;
            last_len = field.len();
            self.write_field(field)?;
        }
        // A row with a single empty field must stay distinguishable from a
        // row with zero fields, so it becomes `""` no matter the style.
        // Under QuoteStyle::All the field loop already quoted it.
        if count == 1 && last_len == 0 && self.style == QuoteStyle::Minimal {
            self.write_bytes(b"\"\"")?;
        }
        let term = self.term.as_bytes();
        self.write_bytes(term)
    }

    /// Flush the underlying buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(self) -> Result<W> {
        self.wtr.into_inner().map_err(|err| Error::Io(err.into_error()))
    }

    fn write_field(&mut self, field: &[u8]) -> Result<()> {
        let quote = match self.style {
            QuoteStyle::All => true,
            QuoteStyle::Minimal => self.needs_quotes(field),
        };
        if quote {
            self.write_bytes(b"\"")?;
        }
        // Field content, with every quote doubled.
        let mut rest = field;
        while let Some(i) = rest.iter().position(|&b| b == b'"') {
            self.write_bytes(&rest[..i])?;
            self.write_bytes(b"\"\"")?;
            rest = &rest[i + 1..];
        }
        self.write_bytes(rest)?;
        if quote {
            self.write_bytes(b"\"")?;
        }
        Ok(())
    }

    fn needs_quotes(&self, field: &[u8]) -> bool {
        field.iter().any(|&b| {
            b == self.delimiter || b == b'"' || b == b'\r' || b == b'\n'
        })
    }

    /// Every byte this writer emits leaves through here, so a single I/O
    /// error path covers the whole row.
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.wtr.write_all(data)?;
        Ok(())
    }
}

impl Writer<File> {
    /// Create a CSV writer with the default configuration that writes to the
    /// file at the given path, creating it if necessary and truncating it
    /// otherwise.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Writer<File>> {
        Ok(Writer::from_writer(File::create(path)?))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::row::Row;

    use super::{QuoteStyle, Terminator, Writer, WriterBuilder};

    fn wtr_with<F>(config: F) -> Writer<Vec<u8>>
    where
        F: FnOnce(&mut WriterBuilder),
    {
        let mut builder = WriterBuilder::new();
        config(&mut builder);
        builder.from_writer(Vec::new()).unwrap()
    }

    fn out(wtr: Writer<Vec<u8>>) -> String {
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn minimal_leaves_plain_fields_unquoted() {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_row(&["a", "b", "c"]).unwrap();
        assert_eq!(out(wtr), "a,b,c\n");
    }

    #[test]
    fn minimal_quotes_only_what_needs_it() {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_row(&["a,b", "c\"d", "e\rf", "g\nh", "plain"]).unwrap();
        assert_eq!(out(wtr), "\"a,b\",\"c\"\"d\",\"e\rf\",\"g\nh\",plain\n");
    }

    #[test]
    fn all_quotes_everything() {
        let mut wtr = wtr_with(|b| {
            b.quote_style(QuoteStyle::All);
        });
        wtr.write_row(&["a", "b"]).unwrap();
        assert_eq!(out(wtr), "\"a\",\"b\"\n");
    }

    #[test]
    fn zero_fields_is_an_empty_line() {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_row(&Row::new()).unwrap();
        assert_eq!(out(wtr), "\n");
    }

    #[test]
    fn single_empty_field_is_double_quotes() {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_row(&[""]).unwrap();
        assert_eq!(out(wtr), "\"\"\n");

        // The same under QuoteStyle::All, and in particular not `""""`.
        let mut wtr = wtr_with(|b| {
            b.quote_style(QuoteStyle::All);
        });
        wtr.write_row(&[""]).unwrap();
        assert_eq!(out(wtr), "\"\"\n");
    }

    #[test]
    fn empty_fields_among_others_stay_bare() {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_row(&["", "x", ""]).unwrap();
        assert_eq!(out(wtr), ",x,\n");
    }

    #[test]
    fn quote_only_field() {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_row(&["\""]).unwrap();
        assert_eq!(out(wtr), "\"\"\"\"\n");
    }

    #[test]
    fn terminators() {
        let mut wtr = wtr_with(|b| {
            b.terminator(Terminator::CRLF);
        });
        wtr.write_row(&["a"]).unwrap();
        wtr.write_row(&["b"]).unwrap();
        assert_eq!(out(wtr), "a\r\nb\r\n");

        let mut wtr = wtr_with(|b| {
            b.terminator(Terminator::CR);
        });
        wtr.write_row(&["a"]).unwrap();
        assert_eq!(out(wtr), "a\r");
    }

    #[test]
    fn custom_delimiter_drives_quoting() {
        let mut wtr = wtr_with(|b| {
            b.delimiter(b';');
        });
        wtr.write_row(&["a;b", "c,d"]).unwrap();
        assert_eq!(out(wtr), "\"a;b\";c,d\n");
    }

    #[test]
    fn invalid_delimiters_rejected() {
        for &delim in &[b'"', b'\r', b'\n'] {
            let err = WriterBuilder::new()
                .delimiter(delim)
                .from_writer(Vec::new())
                .err()
                .expect("delimiter must be rejected");
            match err {
                Error::InvalidDelimiter(b) => assert_eq!(b, delim),
                err => panic!("unexpected error: {}", err),
            }
        }
    }

    #[test]
    fn accepts_rows_and_ad_hoc_fields() {
        let mut row = Row::new();
        row.push_field(b"a").unwrap();
        row.push_field(b"b,c").unwrap();

        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_row(&row).unwrap();
        wtr.write_row(vec!["x".to_string(), "y".to_string()]).unwrap();
        wtr.write_row(&[&b"\xFF"[..], &b"z"[..]]).unwrap();
        let data = wtr.into_inner().unwrap();
        assert_eq!(data, b"a,\"b,c\"\nx,y\n\xFF,z\n".to_vec());
    }

    #[test]
    fn sink_ownership_stays_with_caller() {
        let mut buf = Vec::new();
        {
            let mut wtr = Writer::from_writer(&mut buf);
            wtr.write_row(&["a"]).unwrap();
            wtr.flush().unwrap();
        }
        assert_eq!(buf, b"a\n");
    }
}
