//! Raw font bytes, and a cursor for parsing them.

use std::ops::{Range, RangeBounds};

use font_types::{Offset, Scalar};

use crate::read::{FontReadWithArgs, ReadError};
use crate::FontRead;

/// A reference to raw binary font data.
///
/// This is a thin wrapper around a byte slice that provides the bounds
/// checked, big-endian-aware reads the rest of the crate is built on. No
/// table is ever copied out of its backing bytes; every parsed type borrows
/// from the `'a` lifetime of the original buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontData<'a> {
    bytes: &'a [u8],
}

impl<'a> FontData<'a> {
    pub const EMPTY: FontData<'static> = FontData { bytes: &[] };

    pub const fn new(bytes: &'a [u8]) -> Self {
        FontData { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn slice(&self, range: impl RangeBounds<usize>) -> Option<FontData<'a>> {
        let bounds = (range.start_bound().cloned(), range.end_bound().cloned());
        self.bytes.get(bounds).map(|bytes| FontData { bytes })
    }

    /// Read a scalar at `offset`, decoding it from big-endian wire bytes.
    pub fn read_at<T: Scalar>(&self, offset: usize) -> Result<T, ReadError> {
        let end = offset
            .checked_add(std::mem::size_of::<T::Raw>())
            .ok_or(ReadError::OutOfBounds)?;
        self.bytes
            .get(offset..end)
            .and_then(T::read)
            .ok_or(ReadError::OutOfBounds)
    }

    pub fn read_with_args<T>(&self, range: Range<usize>, args: &T::Args) -> Result<T, ReadError>
    where
        T: FontReadWithArgs<'a>,
    {
        self.slice(range)
            .ok_or(ReadError::OutOfBounds)
            .and_then(|data| T::read_with_args(data, args))
    }

    /// Follow an offset (relative to the start of `self`) and parse the
    /// table it points to. A null offset is reported as [`ReadError::NullOffset`]
    /// rather than silently returning a default, so callers can choose
    /// whether NULL is meaningful for the field in question.
    pub fn resolve_offset<O: Offset, T: FontRead<'a>>(&self, offset: O) -> Result<T, ReadError> {
        let pos = offset.non_null().ok_or(ReadError::NullOffset)?;
        let sub = self.slice(pos..).ok_or(ReadError::OutOfBounds)?;
        T::read(sub)
    }

    /// Like [`Self::resolve_offset`], but a NULL offset yields `Ok(None)`
    /// instead of an error, matching the many OpenType fields that are
    /// legitimately optional.
    pub fn resolve_nullable_offset<O: Offset, T: FontRead<'a>>(
        &self,
        offset: O,
    ) -> Result<Option<T>, ReadError> {
        match offset.non_null() {
            None => Ok(None),
            Some(pos) => {
                let sub = self.slice(pos..).ok_or(ReadError::OutOfBounds)?;
                T::read(sub).map(Some)
            }
        }
    }

    pub fn cursor(&self) -> Cursor<'a> {
        Cursor {
            pos: 0,
            data: *self,
        }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// A cursor for sequentially parsing the fields of a fixed-layout table.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    pos: usize,
    data: FontData<'a>,
}

impl<'a> Cursor<'a> {
    fn advance_by(&mut self, n_bytes: usize) {
        self.pos = self.pos.saturating_add(n_bytes);
    }

    /// Read a scalar and advance the cursor past it.
    pub fn read<T: Scalar>(&mut self) -> Result<T, ReadError> {
        let value = self.data.read_at(self.pos);
        self.advance_by(std::mem::size_of::<T::Raw>());
        value
    }

    /// Read `n_elem` scalars as a lazily-indexed array and advance past them.
    pub fn read_array<T: Scalar>(&mut self, n_elem: usize) -> Result<crate::array::BeArray<'a, T>, ReadError> {
        let item_len = std::mem::size_of::<T::Raw>();
        let len = n_elem.checked_mul(item_len).ok_or(ReadError::OutOfBounds)?;
        let end = self.pos.checked_add(len).ok_or(ReadError::OutOfBounds)?;
        let slice = self
            .data
            .slice(self.pos..end)
            .ok_or(ReadError::OutOfBounds)?;
        self.advance_by(len);
        Ok(crate::array::BeArray::new(slice))
    }

    /// Read `n_elem` fixed-size records as a lazily-indexed array.
    pub fn read_records<T: crate::array::ReadRecord<'a>>(
        &mut self,
        n_elem: usize,
    ) -> Result<crate::array::RecordArray<'a, T>, ReadError> {
        let len = n_elem
            .checked_mul(T::RECORD_LEN)
            .ok_or(ReadError::OutOfBounds)?;
        let end = self.pos.checked_add(len).ok_or(ReadError::OutOfBounds)?;
        let slice = self
            .data
            .slice(self.pos..end)
            .ok_or(ReadError::OutOfBounds)?;
        self.advance_by(len);
        Ok(crate::array::RecordArray::new(slice))
    }

    /// Read `n_elem` records whose size depends on `args`.
    pub fn read_computed_records<T>(
        &mut self,
        n_elem: usize,
        args: T::Args,
    ) -> Result<crate::array::ComputedRecordArray<'a, T>, ReadError>
    where
        T: crate::array::ReadRecordWithArgs<'a>,
    {
        let item_len = T::compute_len(&args);
        let len = n_elem.checked_mul(item_len).ok_or(ReadError::OutOfBounds)?;
        let end = self.pos.checked_add(len).ok_or(ReadError::OutOfBounds)?;
        let slice = self
            .data
            .slice(self.pos..end)
            .ok_or(ReadError::OutOfBounds)?;
        self.advance_by(len);
        Ok(crate::array::ComputedRecordArray::new(slice, item_len, args))
    }

    pub fn position(&self) -> Result<usize, ReadError> {
        self.data
            .bytes
            .get(..self.pos)
            .ok_or(ReadError::OutOfBounds)
            .map(|_| self.pos)
    }

    pub fn remaining(self) -> Option<FontData<'a>> {
        self.data.slice(self.pos..)
    }
}

impl<'a> FontRead<'a> for FontData<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(data)
    }
}
