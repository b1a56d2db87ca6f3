use std::fmt;
use std::ops;
use std::slice;

use bstr::{BStr, ByteSlice};

use crate::error::Result;

/// The number of field slots a fresh row reserves up front.
const INITIAL_FIELDS: usize = 32;

/// A single CSV row: an ordered sequence of owned, raw-byte fields.
///
/// A row with zero fields is a legal value (the parse of an empty line) and
/// is distinct from a row with one empty field (the parse of `""`).
///
/// Fields are raw bytes. No charset decoding is performed anywhere in this
/// crate, and any byte value — including NUL — is preserved verbatim.
///
/// A row can be reused across many parse or write cycles: [`Row::clear`]
/// drops the fields but keeps the row's backing storage.
#[derive(Clone, Eq, PartialEq)]
pub struct Row {
    fields: Vec<Vec<u8>>,
}

impl Row {
    /// Create a new empty row.
    pub fn new() -> Row {
        Row { fields: Vec::with_capacity(INITIAL_FIELDS) }
    }

    /// Append a copy of `field` after the last field in this row.
    ///
    /// This is the only way a row is ever mutated; fields are never edited in
    /// place. Returns [`Error::OutOfMemory`](crate::Error::OutOfMemory) if
    /// the allocation for the copy fails, in which case the row is unchanged.
    pub fn push_field(&mut self, field: &[u8]) -> Result<()> {
        if self.fields.len() == self.fields.capacity() {
            self.fields.try_reserve(1)?;
        }
        let mut owned = Vec::new();
        owned.try_reserve_exact(field.len())?;
        owned.extend_from_slice(field);
        self.fields.push(owned);
        Ok(())
    }

    /// Return the field at index `i`, or `None` if `i` is out of bounds.
    pub fn get(&self, i: usize) -> Option<&[u8]> {
        self.fields.get(i).map(|f| f.as_slice())
    }

    /// Returns the number of fields in this row.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if and only if this row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remove all fields from this row.
    ///
    /// The storage backing the row itself is retained, so a cleared row can
    /// be refilled without growing again.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Returns an iterator over the fields in this row.
    pub fn iter(&self) -> RowIter {
        RowIter { inner: self.fields.iter() }
    }
}

impl Default for Row {
    fn default() -> Row {
        Row::new()
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fields: Vec<&BStr> = self.iter().map(|f| f.as_bstr()).collect();
        write!(f, "Row({:?})", fields)
    }
}

impl ops::Index<usize> for Row {
    type Output = [u8];

    /// Return the field at index `i`.
    ///
    /// Indexing out of bounds is a contract violation and panics; use
    /// [`Row::get`] for a checked lookup.
    fn index(&self, i: usize) -> &[u8] {
        &self.fields[i]
    }
}

impl<'a> IntoIterator for &'a Row {
    type IntoIter = RowIter<'a>;
    type Item = &'a [u8];

    fn into_iter(self) -> RowIter<'a> {
        self.iter()
    }
}

/// An iterator over the fields of a [`Row`].
pub struct RowIter<'a> {
    inner: slice::Iter<'a, Vec<u8>>,
}

impl<'a> Iterator for RowIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        self.inner.next().map(|f| f.as_slice())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> ExactSizeIterator for RowIter<'a> {}

#[cfg(feature = "serde")]
mod serde_impls {
    use std::fmt;
    use std::str;

    use bstr::BString;
    use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
    use serde::ser::{Serialize, Serializer};

    use super::Row;

    // A field serializes as text when it is valid UTF-8 and as raw bytes
    // otherwise, matching bstr's representation of byte strings.
    struct Field<'a>(&'a [u8]);

    impl<'a> Serialize for Field<'a> {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match str::from_utf8(self.0) {
                Ok(text) => serializer.serialize_str(text),
                Err(_) => serializer.serialize_bytes(self.0),
            }
        }
    }

    impl Serialize for Row {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.collect_seq(self.iter().map(Field))
        }
    }

    impl<'de> Deserialize<'de> for Row {
        fn deserialize<D>(deserializer: D) -> Result<Row, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct RowVisitor;

            impl<'de> Visitor<'de> for RowVisitor {
                type Value = Row;

                fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, "a sequence of CSV fields")
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<Row, A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    let mut row = Row::new();
                    while let Some(field) = seq.next_element::<BString>()? {
                        row.fields.push(Vec::from(field));
                    }
                    Ok(row)
                }
            }

            deserializer.deserialize_seq(RowVisitor)
        }
    }
}
