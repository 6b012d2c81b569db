//! Traits for interpreting font data.

use crate::font_data::FontData;
use font_types::Tag;

/// A type that can be read from raw table data with no external context.
///
/// Implemented by every table and format enum that is fully
/// self-describing: the bytes alone are enough to know how to parse it.
/// Types that need outside information (a value format, a class count, a
/// feature tag...) implement [`FontReadWithArgs`] instead.
pub trait FontRead<'a>: Sized {
    fn read(data: FontData<'a>) -> Result<Self, ReadError>;
}

/// A type that needs additional arguments in order to be read.
pub trait ReadArgs {
    type Args: Copy;
}

/// A type that requires external data (a format, a count, a tag...) in
/// order to know how to interpret its bytes.
pub trait FontReadWithArgs<'a>: Sized + ReadArgs {
    fn read_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError>;
}

// Every unconditional reader is trivially a reader that ignores its args.
impl<'a, T: FontRead<'a>> ReadArgs for T {
    type Args = ();
}

impl<'a, T: FontRead<'a>> FontReadWithArgs<'a> for T {
    fn read_with_args(data: FontData<'a>, _args: &()) -> Result<Self, ReadError> {
        Self::read(data)
    }
}

/// A type whose wire size can be computed ahead of time from its args,
/// without needing to actually read it (used by [`ComputedRecordArray`]).
///
/// [`ComputedRecordArray`]: crate::array::ComputedRecordArray
pub trait ComputeSize: ReadArgs {
    fn compute_size(args: &Self::Args) -> usize;
}

/// Font-data parsing errors.
///
/// Per the core's error handling design, these never escape as panics:
/// a malformed subtable degrades to "this rule does not match" rather than
/// corrupting memory or aborting the shaping run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("an offset or index was out of bounds")]
    OutOfBounds,
    #[error("invalid format value {0}")]
    InvalidFormat(u16),
    #[error("an offset was unexpectedly null")]
    NullOffset,
    #[error("array length was not a multiple of the item size")]
    InvalidArrayLen,
    #[error("the {0} table is missing")]
    TableIsMissing(Tag),
    #[error("malformed data: {0}")]
    MalformedData(&'static str),
}
