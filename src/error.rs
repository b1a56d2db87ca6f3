use std::collections::TryReserveError;
use std::error;
use std::fmt;
use std::io;
use std::result;

/// A type alias for `Result<T, strict_csv::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when reading or writing CSV data.
#[derive(Debug)]
pub enum Error {
    /// An I/O error from the underlying byte source or sink.
    Io(io::Error),
    /// An allocation failed while growing a field buffer or a row.
    ///
    /// This kind carries no allocation state of its own, so reporting it can
    /// never itself fail for want of memory.
    OutOfMemory,
    /// A reader or writer was configured with a delimiter that the format
    /// reserves: `"`, `\r` or `\n`.
    ///
    /// This error only occurs at construction time. Construction never reads
    /// from the source or writes to the sink.
    InvalidDelimiter(u8),
    /// The input violated the quoting rules of the format.
    ///
    /// This error only occurs while parsing. Once it has been returned, the
    /// reader is left wherever the offending byte was read and no attempt is
    /// made to resynchronize; further parsing is unreliable.
    Format {
        /// The line on which the violation was found, starting at 1.
        line: u64,
        /// A description of the violation.
        message: &'static str,
    },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Error {
        Error::OutOfMemory
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::OutOfMemory => write!(f, "out of memory"),
            Error::InvalidDelimiter(b) => write!(
                f,
                "invalid field delimiter 0x{:02X}: \
                 a delimiter must not be a quote, CR or LF",
                b
            ),
            Error::Format { line, message } => {
                write!(f, "CSV format error on line {}: {}", line, message)
            }
        }
    }
}

/// Returns true if `delimiter` may be used as a field delimiter.
///
/// The quote and the row terminator bytes are structural and may not double
/// as delimiters.
pub(crate) fn is_valid_delimiter(delimiter: u8) -> bool {
    !matches!(delimiter, b'"' | b'\r' | b'\n')
}

#[cfg(test)]
mod tests {
    use super::{is_valid_delimiter, Error};

    #[test]
    fn reserved_delimiters() {
        assert!(!is_valid_delimiter(b'"'));
        assert!(!is_valid_delimiter(b'\r'));
        assert!(!is_valid_delimiter(b'\n'));
        assert!(is_valid_delimiter(b','));
        assert!(is_valid_delimiter(b'\t'));
        assert!(is_valid_delimiter(b';'));
    }

    #[test]
    fn display_format_error() {
        let err = Error::Format { line: 3, message: "unclosed quote" };
        assert_eq!(
            err.to_string(),
            "CSV format error on line 3: unclosed quote"
        );
    }
}
