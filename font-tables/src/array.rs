//! Lazily-indexed array views over font bytes.
//!
//! None of these types copy or allocate: each just remembers the byte range
//! it covers and decodes an item on demand in [`get`][BeArray::get]. This is
//! what makes a subtable evaluation (coverage search, class lookup, context
//! match) run directly against the font's own buffer.

use std::marker::PhantomData;

use font_types::{FixedSize, Scalar};

use crate::font_data::FontData;
use crate::read::{ReadArgs, ReadError};

/// A lazily-decoded array of fixed-size scalars (`u16`, `GlyphId`, `Offset16<T>`...).
#[derive(Clone, Copy)]
pub struct BeArray<'a, T: Scalar> {
    data: FontData<'a>,
    _marker: PhantomData<T>,
}

impl<'a, T: Scalar> BeArray<'a, T> {
    pub(crate) fn new(data: FontData<'a>) -> Self {
        BeArray {
            data,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len() / std::mem::size_of::<T::Raw>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<T> {
        let item_len = std::mem::size_of::<T::Raw>();
        self.data.read_at(index.checked_mul(item_len)?).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        let copy = *self;
        (0..copy.len()).map(move |i| copy.get(i).expect("index in bounds"))
    }

    /// Binary search for `target` in a slice that is sorted in ascending order.
    pub fn binary_search(&self, target: T) -> Result<usize, usize>
    where
        T: Ord,
    {
        let mut lo = 0usize;
        let mut hi = self.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let value = self.get(mid).expect("index in bounds");
            match value.cmp(&target) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return Ok(mid),
            }
        }
        Err(lo)
    }
}

/// A fixed-size record (not a scalar itself, but a small fixed group of
/// scalar fields, e.g. `RangeRecord`) that can be parsed out of a byte
/// range with no outside context.
pub trait ReadRecord<'a>: Sized {
    const RECORD_LEN: usize;
    fn read_record(data: FontData<'a>) -> Result<Self, ReadError>;
}

/// A lazily-decoded array of fixed-size records.
#[derive(Clone, Copy)]
pub struct RecordArray<'a, T> {
    data: FontData<'a>,
    _marker: PhantomData<T>,
}

impl<'a, T: ReadRecord<'a>> RecordArray<'a, T> {
    pub(crate) fn new(data: FontData<'a>) -> Self {
        RecordArray {
            data,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        if T::RECORD_LEN == 0 {
            0
        } else {
            self.data.len() / T::RECORD_LEN
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(T::RECORD_LEN)?;
        let end = start.checked_add(T::RECORD_LEN)?;
        let slice = self.data.slice(start..end)?;
        T::read_record(slice).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + 'a
    where
        T: 'a,
    {
        let copy = *self;
        (0..copy.len()).map(move |i| copy.get(i).expect("index in bounds"))
    }
}

/// A record whose size depends on external arguments (a `ValueFormat`, a
/// mark class count...), mirroring [`ReadRecord`] for the variable-size case.
pub trait ReadRecordWithArgs<'a>: Sized + ReadArgs {
    fn compute_len(args: &Self::Args) -> usize;
    fn read_record_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError>;
}

/// A lazily-decoded array of records whose per-item length is computed once
/// from `args` and then applied uniformly (GPOS `PairValueRecord`,
/// `Class1Record` and friends all need this).
#[derive(Clone, Copy)]
pub struct ComputedRecordArray<'a, T: ReadArgs> {
    data: FontData<'a>,
    item_len: usize,
    args: T::Args,
}

impl<'a, T: ReadRecordWithArgs<'a>> ComputedRecordArray<'a, T> {
    pub(crate) fn new(data: FontData<'a>, item_len: usize, args: T::Args) -> Self {
        ComputedRecordArray {
            data,
            item_len,
            args,
        }
    }

    pub fn len(&self) -> usize {
        if self.item_len == 0 {
            0
        } else {
            self.data.len() / self.item_len
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(self.item_len)?;
        let end = start.checked_add(self.item_len)?;
        let slice = self.data.slice(start..end)?;
        T::read_record_with_args(slice, &self.args).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + 'a
    where
        T: 'a,
    {
        let copy = *self;
        (0..copy.len()).map(move |i| copy.get(i).expect("index in bounds"))
    }
}

// Blanket impl so a `FixedSize` scalar can always be read as a one-field "record"
// by code generic over `ReadRecord` (used for offset arrays).
impl<'a, T: Scalar + FixedSize> ReadRecord<'a> for T {
    const RECORD_LEN: usize = T::RAW_BYTE_LEN;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        data.read_at(0)
    }
}
