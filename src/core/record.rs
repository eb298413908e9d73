// Record buffer: owned storage for the record being assembled
//
// Decoded bytes of every field go into one arena, each field followed by a
// NUL byte, and the field table keeps an (offset, length) pair per field.
// A record therefore occupies its decoded bytes plus one byte per field.
// Capacity survives across records and only ever grows.

use super::dialect::Limits;
use log::debug;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Index;

/// Which limit a push ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Overflow {
    Bytes,
    Fields,
}

pub(crate) struct RecordBuffer {
    arena: Vec<u8>,
    /// Current byte ceiling for `arena`
    limit: usize,
    spans: Vec<(usize, usize)>,
    /// Current ceiling for `spans`
    max_fields: usize,
    /// Arena offset where the open field begins
    field_start: usize,
    expand: bool,
}

impl RecordBuffer {
    pub fn new(limits: &Limits) -> Self {
        RecordBuffer {
            arena: Vec::with_capacity(limits.record_buffer_size),
            limit: limits.record_buffer_size,
            spans: Vec::with_capacity(limits.max_fields.min(64)),
            max_fields: limits.max_fields,
            field_start: 0,
            expand: limits.expand,
        }
    }

    /// Forget the previous record, keeping allocations.
    pub fn begin_record(&mut self) {
        self.arena.clear();
        self.spans.clear();
        self.field_start = 0;
    }

    /// Make room for `additional` more arena bytes, growing if allowed.
    fn reserve(&mut self, additional: usize) -> bool {
        let needed = self.arena.len() + additional;
        if needed <= self.limit {
            return true;
        }
        if !self.expand {
            return false;
        }
        let limit = needed.max(self.limit.saturating_mul(2));
        debug!("record buffer grows from {} to {} bytes", self.limit, limit);
        self.arena.reserve(limit - self.arena.len());
        self.limit = limit;
        true
    }

    /// Append one byte to the open field. The byte is refused unless the
    /// field's terminator still fits after it.
    #[inline]
    pub fn push_byte(&mut self, byte: u8) -> Result<(), Overflow> {
        if self.arena.len() + 2 > self.limit && !self.reserve(2) {
            return Err(Overflow::Bytes);
        }
        self.arena.push(byte);
        Ok(())
    }

    /// Append a run of bytes to the open field, keeping room for its terminator.
    ///
    /// On overflow, returns how many leading bytes were accepted before the
    /// limit was hit.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), usize> {
        if self.reserve(bytes.len() + 1) {
            self.arena.extend_from_slice(bytes);
            return Ok(());
        }
        let accepted = self.limit.saturating_sub(self.arena.len() + 1);
        self.arena.extend_from_slice(&bytes[..accepted]);
        Err(accepted)
    }

    /// Drop whatever the open field holds so far.
    pub fn truncate_field(&mut self) {
        self.arena.truncate(self.field_start);
    }

    /// Close the open field.
    pub fn end_field(&mut self) -> Result<(), Overflow> {
        if self.spans.len() == self.max_fields && !self.grow_fields() {
            return Err(Overflow::Fields);
        }
        if !self.reserve(1) {
            return Err(Overflow::Bytes);
        }
        let length = self.arena.len() - self.field_start;
        self.spans.push((self.field_start, length));
        self.arena.push(0);
        self.field_start = self.arena.len();
        Ok(())
    }

    /// Check that one more field may follow the ones already closed.
    pub fn open_field(&mut self) -> Result<(), Overflow> {
        if self.spans.len() >= self.max_fields && !self.grow_fields() {
            return Err(Overflow::Fields);
        }
        Ok(())
    }

    fn grow_fields(&mut self) -> bool {
        if !self.expand {
            return false;
        }
        let max_fields = self.max_fields.saturating_mul(2);
        debug!("field table grows from {} to {} fields", self.max_fields, max_fields);
        self.max_fields = max_fields;
        true
    }

    /// Turn a record made of a single empty field into a record with no fields.
    pub fn collapse_empty(&mut self) {
        if self.spans.len() == 1 && self.spans[0].1 == 0 {
            self.begin_record();
        }
    }

    #[inline]
    pub fn field_count(&self) -> usize {
        self.spans.len()
    }

    pub fn field(&self, index: usize) -> Option<&[u8]> {
        self.spans
            .get(index)
            .map(|&(offset, length)| &self.arena[offset..offset + length])
    }

    pub fn fields(&self) -> Fields<'_> {
        Fields {
            arena: &self.arena,
            spans: self.spans.iter(),
        }
    }

    /// Current byte ceiling.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Current field ceiling.
    pub fn max_fields(&self) -> usize {
        self.max_fields
    }
}

/// Read-only view of the last record read.
///
/// Borrows the reader, so it cannot outlive the next call to `read`. Use
/// [`Record::to_vec`] to keep a copy.
#[derive(Clone, Copy)]
pub struct Record<'r> {
    buffer: &'r RecordBuffer,
}

impl<'r> Record<'r> {
    pub(crate) fn new(buffer: &'r RecordBuffer) -> Self {
        Record { buffer }
    }

    pub fn len(&self) -> usize {
        self.buffer.field_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&'r [u8]> {
        self.buffer.field(index)
    }

    pub fn iter(&self) -> Fields<'r> {
        self.buffer.fields()
    }

    /// Copy every field out of the reader's buffer.
    pub fn to_vec(&self) -> Vec<Vec<u8>> {
        self.iter().map(<[u8]>::to_vec).collect()
    }
}

impl<'r> Index<usize> for Record<'r> {
    type Output = [u8];

    fn index(&self, index: usize) -> &[u8] {
        match self.get(index) {
            Some(field) => field,
            None => panic!("field index {} out of range for record of {} fields", index, self.len()),
        }
    }
}

impl<'r> IntoIterator for Record<'r> {
    type Item = &'r [u8];
    type IntoIter = Fields<'r>;

    fn into_iter(self) -> Fields<'r> {
        self.iter()
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(String::from_utf8_lossy))
            .finish()
    }
}

impl<'r, T: AsRef<[u8]>> PartialEq<[T]> for Record<'r> {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<'r, T: AsRef<[u8]>> PartialEq<Vec<T>> for Record<'r> {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == other[..]
    }
}

/// Iterator over the fields of a [`Record`].
#[derive(Clone)]
pub struct Fields<'r> {
    arena: &'r [u8],
    spans: std::slice::Iter<'r, (usize, usize)>,
}

impl<'r> Iterator for Fields<'r> {
    type Item = &'r [u8];

    #[inline]
    fn next(&mut self) -> Option<&'r [u8]> {
        let &(offset, length) = self.spans.next()?;
        Some(&self.arena[offset..offset + length])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.spans.size_hint()
    }
}

impl<'r> DoubleEndedIterator for Fields<'r> {
    fn next_back(&mut self) -> Option<&'r [u8]> {
        let &(offset, length) = self.spans.next_back()?;
        Some(&self.arena[offset..offset + length])
    }
}

impl ExactSizeIterator for Fields<'_> {}

impl FusedIterator for Fields<'_> {}
