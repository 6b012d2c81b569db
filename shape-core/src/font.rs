//! The font protocol: the external collaborator that supplies raw table
//! bytes, code-point-to-glyph mapping, and advances.
//!
//! The pipeline never demultiplexes a font file itself (that is explicitly
//! out of scope); it consumes whatever implements [`Font`].

use font_types::GlyphId;

/// A layout direction, as carried by a [`crate::pattern::Pattern`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

/// Supplies the raw material [`crate::processor::TextProcessor`] needs from
/// a font: table bytes, cmap-equivalent lookup, and advance widths.
///
/// Implementors own font file demultiplexing; this core only ever sees
/// already-located, big-endian table byte slices.
pub trait Font {
    /// Returns the raw bytes of the table named by `tag` (e.g. `b"GSUB"`),
    /// or `None` if the font carries no such table.
    fn load_table(&self, tag: [u8; 4]) -> Option<&[u8]>;

    /// Maps a Unicode code point to a glyph ID, or `GlyphId::NOTDEF` if the
    /// font has no mapping for it.
    fn glyph_id_for_code_point(&self, code_point: u32) -> GlyphId;

    /// The horizontal (or vertical, for vertical layout) advance of `gid`,
    /// in font units, before any GPOS adjustment.
    fn advance_for_glyph(&self, gid: GlyphId) -> i32;
}
