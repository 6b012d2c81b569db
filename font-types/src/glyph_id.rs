//! Glyph identifiers.
//!
//! Although these are treated as plain `u16`s in the OpenType spec, we use a
//! distinct type so that glyph IDs cannot be silently confused with other
//! 16-bit quantities (class numbers, feature indices, coverage indices...).

use crate::raw::Scalar;

/// A 16-bit glyph identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphId(u16);

impl GlyphId {
    /// The identifier reserved for the "notdef" glyph.
    pub const NOTDEF: GlyphId = GlyphId(0);

    pub const fn new(raw: u16) -> Self {
        GlyphId(raw)
    }

    pub const fn to_u16(self) -> u16 {
        self.0
    }

    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for GlyphId {
    fn default() -> Self {
        GlyphId::NOTDEF
    }
}

impl std::fmt::Display for GlyphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gid{}", self.0)
    }
}

impl From<GlyphId> for u16 {
    fn from(value: GlyphId) -> Self {
        value.0
    }
}

impl Scalar for GlyphId {
    type Raw = [u8; 2];

    fn from_raw(raw: Self::Raw) -> Self {
        GlyphId(u16::from_be_bytes(raw))
    }

    fn to_raw(self) -> Self::Raw {
        self.0.to_be_bytes()
    }
}
