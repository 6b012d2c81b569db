//! The locator: a filtered cursor over an album.
//!
//! A locator does not borrow its album: the dispatcher needs `&mut Album`
//! while nested lookups run, and a locator holding `&Album` would make that
//! impossible. Instead every method that needs to inspect glyph traits
//! takes the album as an explicit parameter, and the locator itself caches
//! only scalar cursor state plus whatever it borrows straight from font
//! bytes (the lookup's mark filtering coverage table), which lives in a
//! wholly separate, non-conflicting lifetime.

use font_tables::tables::layout::{CoverageTable, LookupFlag};

use crate::album::{Album, GlyphTraits};

pub const INVALID: usize = usize::MAX;

/// Copy of a lookup's flag byte, decoded into the bits the locator cares
/// about. Mirrors `font_tables::tables::layout::LookupFlag`'s packing.
#[derive(Clone, Copy, Debug, Default)]
pub struct LookupFlags {
    pub ignore_base_glyphs: bool,
    pub ignore_ligatures: bool,
    pub ignore_marks: bool,
    pub use_mark_filtering_set: bool,
    pub mark_attachment_type: u8,
}

impl LookupFlags {
    /// The ignore-mask these flags translate to, excluding mark-filtering-set
    /// and mark-attachment-type (handled separately since they depend on
    /// per-glyph class, not just the trait bitset).
    fn ignore_mask(self) -> u16 {
        let mut mask = 0u16;
        if self.ignore_base_glyphs {
            mask |= GlyphTraits::BASE;
        }
        if self.ignore_ligatures {
            mask |= GlyphTraits::LIGATURE;
        }
        if self.ignore_marks {
            mask |= GlyphTraits::MARK;
        }
        mask
    }
}

impl From<LookupFlag> for LookupFlags {
    fn from(flag: LookupFlag) -> Self {
        LookupFlags {
            ignore_base_glyphs: flag.ignore_base_glyphs(),
            ignore_ligatures: flag.ignore_ligatures(),
            ignore_marks: flag.ignore_marks(),
            use_mark_filtering_set: flag.use_mark_filtering_set(),
            mark_attachment_type: flag.mark_attachment_type() as u8,
        }
    }
}

/// A filtered cursor over an [`Album`].
pub struct Locator<'a> {
    start: usize,
    limit: usize,
    index: usize,
    /// Set when `reset`'s window reached the album's end at the time: the
    /// window tracks buffer growth (e.g. a multiple-substitution expansion)
    /// rather than staying pinned to its original length.
    track_end: bool,
    ignore_mask: u16,
    flags: LookupFlags,
    mark_filtering_set: Option<CoverageTable<'a>>,
    version: u64,
}

impl<'a> Locator<'a> {
    /// Builds a locator with an empty filter, ready for [`Self::reset`].
    pub fn new() -> Self {
        Locator {
            start: 0,
            limit: 0,
            index: INVALID,
            track_end: false,
            ignore_mask: 0,
            flags: LookupFlags::default(),
            mark_filtering_set: None,
            version: 0,
        }
    }

    /// Sets the traversal window to `[start, start + count)` and invalidates
    /// the current position.
    pub fn reset(&mut self, album: &Album, start: usize, count: usize) {
        self.start = start;
        self.limit = (start + count).min(album.glyph_count());
        self.track_end = self.limit >= album.glyph_count();
        self.index = INVALID;
        self.version = album.version();
    }

    /// Loads filtering state from a lookup's flag and optional mark set.
    pub fn reserve(&mut self, flags: LookupFlags, mark_filtering_set: Option<CoverageTable<'a>>) {
        self.ignore_mask = flags.ignore_mask();
        self.flags = flags;
        self.mark_filtering_set = mark_filtering_set;
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_valid_index(&self, i: usize) -> bool {
        i != INVALID
    }

    /// Re-derives `limit` against the album's current glyph count and
    /// version. Called before any walk if the locator may have gone stale
    /// across a nested mutation.
    pub fn resync(&mut self, album: &Album) {
        if self.version == album.version() {
            return;
        }
        self.limit = if self.track_end {
            album.glyph_count()
        } else {
            self.limit.min(album.glyph_count())
        };
        self.start = self.start.min(self.limit);
        if self.index != INVALID && self.index >= self.limit {
            self.index = INVALID;
        }
        self.version = album.version();
    }

    fn passes_filter(&self, album: &Album, i: usize) -> bool {
        let details = album.details(i);
        if details.traits.contains(GlyphTraits::PLACEHOLDER) {
            // Already-consumed positions (e.g. ligature components) are
            // invisible to every subsequent lookup, independent of flags.
            return false;
        }
        if details.traits.bits() & self.ignore_mask != 0 {
            return false;
        }
        if self.flags.use_mark_filtering_set && details.traits.contains(GlyphTraits::MARK) {
            if let Some(set) = &self.mark_filtering_set {
                let gid = album.get_glyph(i);
                if !set.contains(gid) {
                    return false;
                }
            }
        }
        if self.flags.mark_attachment_type != 0 && details.traits.contains(GlyphTraits::MARK) {
            if details.traits.mark_attachment_class() != self.flags.mark_attachment_type {
                return false;
            }
        }
        true
    }

    /// The next non-filtered index strictly greater than `k` within the
    /// window, or [`INVALID`] if none remains.
    pub fn get_after(&self, album: &Album, k: usize) -> usize {
        let mut i = if k == INVALID { self.start } else { k + 1 };
        while i < self.limit {
            if self.passes_filter(album, i) {
                return i;
            }
            i += 1;
        }
        INVALID
    }

    /// The previous non-filtered index strictly less than `k`, which may
    /// range below `start` for backtrack assessment, or [`INVALID`].
    pub fn get_before(&self, album: &Album, k: usize) -> usize {
        if k == INVALID || k == 0 {
            return INVALID;
        }
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.passes_filter(album, i) {
                return i;
            }
        }
        INVALID
    }

    /// Advances `index` to the next non-filtered position at or after the
    /// current one. Returns `false` at the end of the window.
    pub fn move_next(&mut self, album: &Album) -> bool {
        let next = if self.index == INVALID {
            self.get_after(album, INVALID)
        } else if self.passes_filter(album, self.index) {
            self.index
        } else {
            self.get_after(album, self.index)
        };
        match next {
            INVALID => {
                self.index = INVALID;
                false
            }
            i => {
                self.index = i;
                true
            }
        }
    }

    /// Advances `n` non-filtered positions past the current one.
    pub fn skip(&mut self, album: &Album, n: usize) -> bool {
        for _ in 0..n {
            let next = self.get_after(album, self.index);
            if next == INVALID {
                self.index = INVALID;
                return false;
            }
            self.index = next;
        }
        true
    }

    /// Sets `index` directly, bypassing filtering (used to re-anchor inside
    /// a matched context).
    pub fn jump_to(&mut self, k: usize) {
        self.index = k;
    }

    /// Copies the effective resting position of `other`, so that an outer
    /// walk resumes past a fully-consumed nested context.
    pub fn take_state(&mut self, other: &Locator<'a>) {
        self.index = other.index;
        self.limit = other.limit;
        self.track_end = self.track_end || other.track_end;
        self.version = other.version;
    }
}

impl<'a> Default for Locator<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_types::GlyphId;

    fn filled_album(traits: &[u16]) -> Album {
        let code_points: Vec<u32> = (0..traits.len() as u32).collect();
        let mut album = Album::new();
        album.reset(&code_points);
        album.start_filling();
        for (i, &t) in traits.iter().enumerate() {
            album.add_glyph(GlyphId::new(i as u16), i);
            album.insert_traits(i, t);
        }
        album.stop_filling();
        album
    }

    #[test]
    fn move_next_skips_ignored_traits() {
        let album = filled_album(&[0, GlyphTraits::MARK, 0, GlyphTraits::MARK, 0]);
        let mut locator = Locator::new();
        locator.reset(&album, 0, album.glyph_count());
        locator.reserve(
            LookupFlags {
                ignore_marks: true,
                ..Default::default()
            },
            None,
        );
        let mut seen = Vec::new();
        while locator.move_next(&album) {
            seen.push(locator.index());
            locator.jump_to(locator.index() + 1);
            if locator.index() >= album.glyph_count() {
                break;
            }
        }
        assert_eq!(seen, vec![0, 2, 4]);
    }

    #[test]
    fn get_before_may_range_below_window_start() {
        // Backtrack assessment must be able to see glyphs before a lookup's
        // restricted window, so get_before only bottoms out at the album
        // start, not at `self.start`.
        let album = filled_album(&[0, 0, 0]);
        let mut locator = Locator::new();
        locator.reset(&album, 1, 2);
        locator.reserve(LookupFlags::default(), None);
        assert_eq!(locator.get_before(&album, 1), 0);
        assert_eq!(locator.get_before(&album, 0), INVALID);
    }

    #[test]
    fn resync_grows_limit_for_a_whole_buffer_window() {
        let mut album = filled_album(&[0, 0]);
        let mut locator = Locator::new();
        locator.reset(&album, 0, album.glyph_count());
        locator.reserve(LookupFlags::default(), None);
        album.reserve_glyphs(1, 3);
        assert_eq!(album.glyph_count(), 5);
        locator.resync(&album);
        assert_eq!(locator.limit(), 5);
    }
}
