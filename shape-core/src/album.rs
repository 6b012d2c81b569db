//! The album: the mutable glyph buffer a shaping run operates on.
//!
//! An album owns four parallel sequences (glyph IDs, per-glyph details,
//! positions, advances) plus a composite-association arena, and walks
//! through an explicit state machine (`Empty` → `Filling` → `Filled` →
//! `Arranging` → `Arranged`) that gates which mutators are legal. State
//! violations are programmer errors, caught with `assert!`, not propagated
//! as `Result`.

use font_types::GlyphId;

/// Per-glyph trait bits, packed into the high half of a glyph's mask.
///
/// The low byte holds boolean flags; the high byte (mirroring
/// [`font_tables::tables::layout::LookupFlag`]'s own mark-attachment-type
/// convention) holds the glyph's mark attachment class, when it is a mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct GlyphTraits(u16);

impl GlyphTraits {
    pub const BASE: u16 = 0x0001;
    pub const LIGATURE: u16 = 0x0002;
    pub const MARK: u16 = 0x0004;
    pub const COMPONENT: u16 = 0x0008;
    pub const PLACEHOLDER: u16 = 0x0010;
    pub const COMPOSITE: u16 = 0x0020;
    pub const RIGHT_TO_LEFT: u16 = 0x0040;
    const MARK_ATTACHMENT_CLASS_MASK: u16 = 0xFF00;

    pub fn empty() -> Self {
        GlyphTraits(0)
    }

    pub fn from_bits(bits: u16) -> Self {
        GlyphTraits(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    pub fn insert(&mut self, bit: u16) {
        self.0 |= bit;
    }

    pub fn remove(&mut self, bit: u16) {
        self.0 &= !bit;
    }

    pub fn mark_attachment_class(self) -> u8 {
        ((self.0 & Self::MARK_ATTACHMENT_CLASS_MASK) >> 8) as u8
    }

    pub fn set_mark_attachment_class(&mut self, class: u8) {
        self.0 = (self.0 & !Self::MARK_ATTACHMENT_CLASS_MASK) | ((class as u16) << 8);
    }
}

/// A glyph's feature mask: the low half of its 32-bit mask, gating which
/// feature units a lookup may touch it under.
///
/// `0xFFFF` is reserved as the "no feature claims this position" sentinel.
/// The anti-mask of a value is its bitwise complement, except that the
/// anti-mask of zero is defined as `0x0000` rather than the sentinel itself
/// — this keeps "apply to positions with no feature" and "apply everywhere"
/// distinguishable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureMask(pub u16);

impl FeatureMask {
    pub const EMPTY: FeatureMask = FeatureMask(0xFFFF);

    pub fn anti_mask(self) -> FeatureMask {
        if self.0 == 0 {
            FeatureMask(0x0000)
        } else {
            FeatureMask(!self.0)
        }
    }

    /// Whether `unit_mask` (a single feature unit's gating bit) applies at
    /// this glyph's current feature mask.
    pub fn matches(self, unit_mask: FeatureMask) -> bool {
        self.0 & unit_mask.0 != 0 || (self.0 == 0 && unit_mask.0 == 0)
    }
}

impl Default for FeatureMask {
    fn default() -> Self {
        FeatureMask(0)
    }
}

/// A glyph's back-reference to the code point(s) it represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Association {
    /// Index into the album's code point sequence.
    Single(usize),
    /// Index of the arena's length cell for a composite glyph.
    Composite(usize),
}

/// Per-glyph metadata, parallel to the glyph ID sequence.
#[derive(Clone, Copy, Debug)]
pub struct GlyphDetails {
    pub association: Association,
    pub feature_mask: FeatureMask,
    pub traits: GlyphTraits,
    pub cursive_offset: i16,
    pub attachment_offset: i16,
}

impl GlyphDetails {
    fn for_association(association: Association) -> Self {
        GlyphDetails {
            association,
            feature_mask: FeatureMask::default(),
            traits: GlyphTraits::empty(),
            cursive_offset: 0,
            attachment_offset: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlbumState {
    Empty,
    Filling,
    Filled,
    Arranging,
    Arranged,
}

/// The mutable glyph buffer a single shaping run operates on.
///
/// Every structural mutation (add, reserve, remove) bumps [`Self::version`]
/// so that a [`crate::locator::Locator`] constructed before the mutation can
/// detect it is stale and re-derive its bounds.
pub struct Album {
    code_points: Vec<u32>,
    glyphs: Vec<GlyphId>,
    details: Vec<GlyphDetails>,
    positions: Vec<(i32, i32)>,
    advances: Vec<i32>,
    arena: Vec<u32>,
    code_point_to_glyph: Vec<u32>,
    state: AlbumState,
    version: u64,
}

impl Default for Album {
    fn default() -> Self {
        Self::new()
    }
}

impl Album {
    pub fn new() -> Self {
        Album {
            code_points: Vec::new(),
            glyphs: Vec::new(),
            details: Vec::new(),
            positions: Vec::new(),
            advances: Vec::new(),
            arena: Vec::new(),
            code_point_to_glyph: Vec::new(),
            state: AlbumState::Empty,
            version: 0,
        }
    }

    pub fn state(&self) -> AlbumState {
        self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn assert_state(&self, allowed: &[AlbumState]) {
        assert!(
            allowed.contains(&self.state),
            "album mutation invalid in state {:?} (expected one of {:?})",
            self.state,
            allowed
        );
    }

    pub fn code_point_count(&self) -> usize {
        self.code_points.len()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn code_points(&self) -> &[u32] {
        &self.code_points
    }

    /// Resets the album to `Empty` and loads a fresh code point source.
    ///
    /// `code_points` must be non-empty: shaping an empty run is rejected
    /// here rather than silently producing an empty album.
    pub fn reset(&mut self, code_points: &[u32]) {
        assert!(!code_points.is_empty(), "album reset requires nonempty input");
        self.code_points.clear();
        self.code_points.extend_from_slice(code_points);
        self.glyphs.clear();
        self.details.clear();
        self.positions.clear();
        self.advances.clear();
        self.arena.clear();
        self.code_point_to_glyph.clear();
        self.state = AlbumState::Empty;
        self.bump_version();
    }

    /// `Empty` → `Filling`. Pre-reserves capacity sized off the code point
    /// count: roughly one glyph per code point, with headroom for
    /// multiple-substitution expansion.
    pub fn start_filling(&mut self) {
        self.assert_state(&[AlbumState::Empty]);
        let n = self.code_points.len();
        self.glyphs.reserve(n * 2);
        self.details.reserve(n * 2);
        self.state = AlbumState::Filling;
    }

    pub fn add_glyph(&mut self, gid: GlyphId, assoc: usize) {
        self.assert_state(&[AlbumState::Filling]);
        assert!(assoc < self.code_points.len(), "association out of range");
        self.glyphs.push(gid);
        self.details
            .push(GlyphDetails::for_association(Association::Single(assoc)));
        self.bump_version();
    }

    /// Inserts `count` uninitialized glyph slots at `index`, shifting the
    /// tail right. Used by multiple-substitution to expand one glyph into N.
    pub fn reserve_glyphs(&mut self, index: usize, count: usize) {
        self.assert_state(&[AlbumState::Filling, AlbumState::Filled, AlbumState::Arranging]);
        assert!(index <= self.glyphs.len(), "reserve index out of range");
        let filler_gid = GlyphId::NOTDEF;
        let filler_details = GlyphDetails::for_association(Association::Single(0));
        for i in 0..count {
            self.glyphs.insert(index + i, filler_gid);
            self.details.insert(index + i, filler_details);
        }
        if self.state == AlbumState::Arranging {
            for i in 0..count {
                self.positions.insert(index + i, (0, 0));
                self.advances.insert(index + i, 0);
            }
        }
        self.bump_version();
    }

    pub fn set_glyph(&mut self, index: usize, gid: GlyphId) {
        self.glyphs[index] = gid;
        self.bump_version();
    }

    pub fn get_glyph(&self, index: usize) -> GlyphId {
        self.glyphs[index]
    }

    pub fn glyphs(&self) -> &[GlyphId] {
        &self.glyphs
    }

    pub fn details(&self, index: usize) -> &GlyphDetails {
        &self.details[index]
    }

    pub fn set_traits(&mut self, index: usize, traits: GlyphTraits) {
        self.assert_state(&[AlbumState::Filling, AlbumState::Arranging]);
        self.details[index].traits = traits;
    }

    pub fn insert_traits(&mut self, index: usize, bit: u16) {
        self.assert_state(&[AlbumState::Filling, AlbumState::Arranging]);
        self.details[index].traits.insert(bit);
    }

    pub fn remove_traits(&mut self, index: usize, bit: u16) {
        self.assert_state(&[AlbumState::Filling, AlbumState::Arranging]);
        self.details[index].traits.remove(bit);
    }

    pub fn traits(&self, index: usize) -> GlyphTraits {
        self.details[index].traits
    }

    pub fn set_feature_mask(&mut self, index: usize, mask: FeatureMask) {
        self.assert_state(&[AlbumState::Filling]);
        self.details[index].feature_mask = mask;
    }

    pub fn get_feature_mask(&self, index: usize) -> FeatureMask {
        self.details[index].feature_mask
    }

    pub fn set_single_association(&mut self, index: usize, assoc: usize) {
        self.assert_state(&[AlbumState::Filling]);
        self.details[index].association = Association::Single(assoc);
        self.details[index].traits.remove(GlyphTraits::COMPOSITE);
    }

    pub fn association(&self, index: usize) -> Association {
        self.details[index].association
    }

    /// Allocates an arena cell of `count` code-point associations for the
    /// glyph at `index`, marks it `Composite`, and returns the cell to fill.
    pub fn make_composite_associations(&mut self, index: usize, count: usize) -> &mut [u32] {
        self.assert_state(&[AlbumState::Filling]);
        assert!(count >= 1, "composite association must claim at least one code point");
        let cell = self.arena.len();
        self.arena.push(count as u32);
        self.arena.resize(self.arena.len() + count, 0);
        self.details[index].association = Association::Composite(cell);
        self.details[index].traits.insert(GlyphTraits::COMPOSITE);
        &mut self.arena[cell + 1..cell + 1 + count]
    }

    pub fn get_composite_associations(&self, cell: usize) -> &[u32] {
        let len = self.arena[cell] as usize;
        &self.arena[cell + 1..cell + 1 + len]
    }

    /// `Filling` → `Filled`.
    pub fn stop_filling(&mut self) {
        self.assert_state(&[AlbumState::Filling]);
        self.state = AlbumState::Filled;
    }

    /// `Filled` → `Arranging`. Allocates zeroed positions/advances arrays
    /// matching the current glyph count.
    pub fn start_arranging(&mut self) {
        self.assert_state(&[AlbumState::Filled]);
        self.positions.clear();
        self.positions.resize(self.glyphs.len(), (0, 0));
        self.advances.clear();
        self.advances.resize(self.glyphs.len(), 0);
        self.state = AlbumState::Arranging;
    }

    pub fn set_x(&mut self, index: usize, x: i32) {
        self.assert_state(&[AlbumState::Arranging]);
        self.positions[index].0 = x;
    }

    pub fn set_y(&mut self, index: usize, y: i32) {
        self.assert_state(&[AlbumState::Arranging]);
        self.positions[index].1 = y;
    }

    pub fn add_x(&mut self, index: usize, dx: i32) {
        self.assert_state(&[AlbumState::Arranging]);
        self.positions[index].0 += dx;
    }

    pub fn add_y(&mut self, index: usize, dy: i32) {
        self.assert_state(&[AlbumState::Arranging]);
        self.positions[index].1 += dy;
    }

    pub fn position(&self, index: usize) -> (i32, i32) {
        self.positions[index]
    }

    pub fn set_advance(&mut self, index: usize, advance: i32) {
        self.assert_state(&[AlbumState::Arranging]);
        self.advances[index] = advance;
    }

    pub fn advance(&self, index: usize) -> i32 {
        self.advances[index]
    }

    pub fn set_cursive_offset(&mut self, index: usize, offset: i16) {
        self.assert_state(&[AlbumState::Arranging]);
        self.details[index].cursive_offset = offset;
    }

    pub fn set_attachment_offset(&mut self, index: usize, offset: i16) {
        self.assert_state(&[AlbumState::Arranging]);
        self.details[index].attachment_offset = offset;
    }

    pub fn positions(&self) -> &[(i32, i32)] {
        &self.positions
    }

    pub fn advances(&self) -> &[i32] {
        &self.advances
    }

    /// Removes every glyph carrying the `Placeholder` trait, preserving the
    /// relative order of survivors.
    ///
    /// Walks high to low, batching contiguous placeholder runs into a single
    /// `drain` so a long run of consumed ligature components costs one
    /// shift instead of one per glyph.
    pub fn remove_placeholders(&mut self) {
        let mut run_end: Option<usize> = None;
        let mut i = self.glyphs.len();
        while i > 0 {
            i -= 1;
            let is_placeholder = self.details[i].traits.contains(GlyphTraits::PLACEHOLDER);
            match (is_placeholder, run_end) {
                (true, None) => run_end = Some(i + 1),
                (true, Some(_)) => {}
                (false, Some(end)) => {
                    self.excise_run(i + 1, end);
                    run_end = None;
                }
                (false, None) => {}
            }
        }
        if let Some(end) = run_end {
            self.excise_run(0, end);
        }
        self.bump_version();
    }

    fn excise_run(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        self.glyphs.drain(start..end);
        self.details.drain(start..end);
        if self.state == AlbumState::Arranging || self.state == AlbumState::Arranged {
            self.positions.drain(start..end);
            self.advances.drain(start..end);
        }
    }

    /// Builds the code-point → glyph map by walking glyphs in reverse index
    /// order, so that among several glyphs claiming the same code point the
    /// one with the lowest index wins (the first glyph of a multi-glyph
    /// substitution represents its source code point).
    pub fn build_code_point_to_glyph_map(&mut self) {
        self.code_point_to_glyph.clear();
        self.code_point_to_glyph.resize(self.code_points.len(), u32::MAX);
        for i in (0..self.glyphs.len()).rev() {
            match self.details[i].association {
                Association::Single(cp) => {
                    self.code_point_to_glyph[cp] = i as u32;
                }
                Association::Composite(cell) => {
                    let len = self.arena[cell] as usize;
                    for &cp in &self.arena[cell + 1..cell + 1 + len] {
                        self.code_point_to_glyph[cp as usize] = i as u32;
                    }
                }
            }
        }
    }

    pub fn code_point_to_glyph_map(&self) -> &[u32] {
        &self.code_point_to_glyph
    }

    /// `Arranging` → `Arranged`.
    pub fn stop_arranging(&mut self) {
        self.assert_state(&[AlbumState::Arranging]);
        self.state = AlbumState::Arranged;
    }

    /// Releases owned buffers, returning the album to `Empty`.
    pub fn finalize(&mut self) {
        self.code_points = Vec::new();
        self.glyphs = Vec::new();
        self.details = Vec::new();
        self.positions = Vec::new();
        self.advances = Vec::new();
        self.arena = Vec::new();
        self.code_point_to_glyph = Vec::new();
        self.state = AlbumState::Empty;
        self.bump_version();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_mask_anti_mask_symmetry() {
        assert_eq!(FeatureMask(0).anti_mask(), FeatureMask(0x0000));
        assert_eq!(FeatureMask(0x0001).anti_mask(), FeatureMask(0xFFFE));
        assert_eq!(FeatureMask::EMPTY.anti_mask(), FeatureMask(0x0000));
    }

    #[test]
    fn reset_rejects_empty_input() {
        let mut album = Album::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            album.reset(&[]);
        }));
        assert!(result.is_err());
    }

    #[test]
    fn remove_placeholders_preserves_order_and_is_idempotent() {
        let mut album = Album::new();
        album.reset(&[0, 1, 2, 3, 4]);
        album.start_filling();
        for i in 0..5u16 {
            album.add_glyph(GlyphId::new(i), i as usize);
        }
        album.insert_traits(1, GlyphTraits::PLACEHOLDER);
        album.stop_filling();
        album.remove_placeholders();
        assert_eq!(album.glyph_count(), 4);
        let remaining: Vec<_> = album.glyphs().iter().map(|g| g.to_u16()).collect();
        assert_eq!(remaining, vec![0, 2, 3, 4]);

        let before = album.glyphs().to_vec();
        album.remove_placeholders();
        assert_eq!(album.glyphs(), before.as_slice());
    }

    #[test]
    fn composite_inverse_map_first_glyph_wins() {
        let mut album = Album::new();
        album.reset(&[0, 1, 2]);
        album.start_filling();
        album.add_glyph(GlyphId::new(10), 2);
        album.add_glyph(GlyphId::new(11), 2);
        album.stop_filling();
        album.build_code_point_to_glyph_map();
        assert_eq!(album.code_point_to_glyph_map()[2], 0);
    }
}
