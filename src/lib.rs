/*!
Streaming CSV reading and writing with strict quoting rules.

This crate treats a CSV stream as a list of rows and a row as a list of
fields. A stream contains zero or more rows; a row contains zero or more
fields. Parsing is strictly streaming: one byte of input at a time, with at
most one byte of lookahead, so arbitrarily large inputs are handled in
constant memory per row.

# The format

* Rows are separated by `\r`, `\n` or `\r\n` (one separator, not two).
* Fields are separated by a configurable single-byte delimiter, `,` by
  default. The delimiter may not be `\r`, `\n` or `"`.
* A field may be wrapped in `"`. Inside a quoted field the delimiter, `\r`
  and `\n` are ordinary content, and a literal quote is written doubled:
  `""`.
* Fields are raw bytes; no charset decoding is performed.

Two edge cases keep reading and writing lossless inverses of one another: an
empty line is a row with *zero* fields, and the two-byte line `""` is a row
with exactly one field whose value is the empty string. (`""""` is one field
whose value is `"`.)

The parser is strict about quoting. A quote appearing in an unquoted field,
a closing quote followed by anything but the delimiter or a line break, or a
quote still open at end of input are reported as errors instead of being
patched over. (The parser in Python's standard library, for comparison, is
more tolerant.)

# Example

Parse some rows, then write them back out:

```
use strict_csv::{Reader, Row, Writer};

# fn main() -> strict_csv::Result<()> {
let data = "name,notes\n\"Ferris\",\"likes \"\"rust\"\"\"\n";

let mut rdr = Reader::from_reader(data.as_bytes());
let mut wtr = Writer::from_writer(vec![]);
let mut row = Row::new();
while rdr.read_row(&mut row)? {
    wtr.write_row(&row)?;
}

let written = wtr.into_inner()?;
assert_eq!(written, b"name,notes\nFerris,\"likes \"\"rust\"\"\"\n");
# Ok(())
# }
```

The reader and writer take their source and sink by value, but a `&mut`
reference to any `io::Read`/`io::Write` is itself a reader/writer, so
callers that manage the lifetime of a file or use the standard streams can
keep ownership:

```no_run
use std::io;
use strict_csv::{Reader, Row};

# fn main() -> strict_csv::Result<()> {
let stdin = io::stdin();
let mut lock = stdin.lock();
let mut rdr = Reader::from_reader(&mut lock);
let mut row = Row::new();
while rdr.read_row(&mut row)? {
    println!("{} fields", row.len());
}
# Ok(())
# }
```
*/

#![deny(missing_docs)]

pub use crate::error::{Error, Result};
pub use crate::reader::{Reader, ReaderBuilder, Rows};
pub use crate::row::{Row, RowIter};
pub use crate::writer::{QuoteStyle, Terminator, Writer, WriterBuilder};

mod error;
mod reader;
mod row;
#[cfg(test)]
mod tests;
mod writer;
