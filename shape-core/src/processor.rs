//! The text processor: the phased driver that turns a code-point source
//! into a shaped album.
//!
//! `shape` runs the four phases in order — `DiscoverGlyphs`,
//! `SubstituteGlyphs`, `PositionGlyphs`, `WrapUp` — walking each of a
//! pattern's feature units in declared order and, within a unit, each
//! lookup in declared order over the whole album before moving to the
//! next. Cursive and mark-attachment position deltas are resolved as each
//! lookup applies (see [`dispatcher::apply_cursive_pos`] and
//! [`dispatcher::attach_to_anchor`]) rather than in a separate deferred
//! sweep; `cursiveOffset`/`attachmentOffset` remain on the album as
//! per-glyph provenance of that resolution, not as unresolved links.

use font_tables::tables::gdef::Gdef;
use font_tables::tables::gpos::{Gpos, PositionLookup};
use font_tables::tables::gsub::{Gsub, SubstitutionLookup};
use font_tables::tables::layout::{Lookup, LookupList};
use font_tables::{FontData, FontRead};

use crate::album::{Album, AlbumState, FeatureMask, GlyphTraits};
use crate::dispatcher;
use crate::error::ShapeError;
use crate::font::Font;
use crate::locator::{Locator, INVALID};
use crate::pattern::Pattern;

/// An optional hook for shaping-engine-specific pre-substitution glyph
/// decoration (e.g. Arabic joining-type feature masks). Most scripts need
/// none; the default no-op is provided as [`NoopDecorator`].
pub trait PreSubstitutionDecorator {
    fn decorate(&self, album: &mut Album);
}

/// The decorator used when a caller has no script-specific decoration to
/// apply.
pub struct NoopDecorator;

impl PreSubstitutionDecorator for NoopDecorator {
    fn decorate(&self, _album: &mut Album) {}
}

/// The phased driver. Stateless: all mutable state lives in the [`Album`]
/// passed to [`Self::shape`].
pub struct TextProcessor {
    ppem: u16,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    /// Builds a processor with no static hinting (`ppem = 0`).
    pub fn new() -> Self {
        TextProcessor { ppem: 0 }
    }

    /// Sets the pixels-per-em used to resolve static `Device` hinting
    /// deltas during `PositionGlyphs`. `0` skips device deltas entirely.
    pub fn with_ppem(mut self, ppem: u16) -> Self {
        self.ppem = ppem;
        self
    }

    /// Runs all four phases against `album`, which must already have been
    /// `reset` with the source code points.
    pub fn shape(
        &self,
        font: &dyn Font,
        pattern: &Pattern,
        album: &mut Album,
        decorator: &dyn PreSubstitutionDecorator,
    ) -> Result<(), ShapeError> {
        let gdef = self.read_gdef(font);
        let gsub = self.read_gsub(font);
        let gpos = self.read_gpos(font);

        self.discover_glyphs(font, album, gdef.as_ref(), decorator);
        self.substitute_glyphs(pattern, album, gsub.as_ref(), gdef.as_ref());
        self.position_glyphs(font, pattern, album, gpos.as_ref(), gdef.as_ref());
        self.wrap_up(album);
        Ok(())
    }

    fn read_gdef<'a>(&self, font: &'a dyn Font) -> Option<Gdef<'a>> {
        font.load_table(*b"GDEF").and_then(|bytes| Gdef::read(FontData::new(bytes)).ok())
    }

    // A GSUB/GPOS table that fails to parse degrades to "absent", same as a
    // malformed subtable degrading to "rule does not match" inside the
    // dispatcher: font data errors never surface as a hard failure.
    fn read_gsub<'a>(&self, font: &'a dyn Font) -> Option<Gsub<'a>> {
        font.load_table(*b"GSUB").and_then(|bytes| Gsub::read(FontData::new(bytes)).ok())
    }

    fn read_gpos<'a>(&self, font: &'a dyn Font) -> Option<Gpos<'a>> {
        font.load_table(*b"GPOS").and_then(|bytes| Gpos::read(FontData::new(bytes)).ok())
    }

    /// Phase 1: populate glyph IDs from code points, then GDEF glyph-class
    /// traits, then any shaping-engine-specific decoration.
    fn discover_glyphs(&self, font: &dyn Font, album: &mut Album, gdef: Option<&Gdef>, decorator: &dyn PreSubstitutionDecorator) {
        album.start_filling();
        for (i, &cp) in album.code_points().to_vec().iter().enumerate() {
            let gid = font.glyph_id_for_code_point(cp);
            album.add_glyph(gid, i);
        }
        if let Some(gdef) = gdef {
            let mark_attach_class_def = gdef.mark_attach_class_def();
            for i in 0..album.glyph_count() {
                let gid = album.get_glyph(i);
                match gdef.glyph_class(gid) {
                    Some(font_tables::tables::gdef::GlyphClassDef::Base) => {
                        album.insert_traits(i, GlyphTraits::BASE);
                    }
                    Some(font_tables::tables::gdef::GlyphClassDef::Ligature) => {
                        album.insert_traits(i, GlyphTraits::LIGATURE);
                    }
                    Some(font_tables::tables::gdef::GlyphClassDef::Mark) => {
                        album.insert_traits(i, GlyphTraits::MARK);
                        if let Some(class_def) = &mark_attach_class_def {
                            let class = class_def.get(gid);
                            let mut traits = album.traits(i);
                            traits.set_mark_attachment_class(class as u8);
                            album.set_traits(i, traits);
                        }
                    }
                    Some(font_tables::tables::gdef::GlyphClassDef::Component) => {
                        album.insert_traits(i, GlyphTraits::COMPONENT);
                    }
                    None => {}
                }
            }
        }
        decorator.decorate(album);
    }

    /// Phase 2: apply every substitution feature unit's lookups, in order,
    /// each as a full left-to-right pass over the album.
    fn substitute_glyphs(&self, pattern: &Pattern, album: &mut Album, gsub: Option<&Gsub>, gdef: Option<&Gdef>) {
        // Substitution mutators (insert_traits, set_single_association,
        // make_composite_associations) only run while the album is still
        // Filling, so stop_filling() happens after the lookups, not before.
        let Some(lookup_list) = gsub.and_then(|g| g.lookup_list()) else {
            album.stop_filling();
            return;
        };
        for unit in &pattern.substitution_units {
            let mask = FeatureMask(unit.mask);
            for &lookup_index in &unit.lookup_indices {
                self.run_gsub_pass(lookup_list, gdef, lookup_index, mask, album);
            }
        }
        album.stop_filling();
    }

    fn run_gsub_pass<'a>(
        &self,
        lookup_list: LookupList<'a, Lookup<'a, SubstitutionLookup<'a>>>,
        gdef: Option<&Gdef<'a>>,
        lookup_index: u16,
        mask: FeatureMask,
        album: &mut Album,
    ) {
        // Reverse chaining single substitution (GSUB type 8) is the one
        // lookup type the album is walked tail-to-head for; every other
        // type walks left-to-right.
        let is_reverse_chaining = lookup_list
            .get(lookup_index)
            .map(|lookup| lookup.lookup_type == 8)
            .unwrap_or(false);
        if is_reverse_chaining {
            self.run_gsub_pass_reverse(lookup_list, gdef, lookup_index, mask, album);
        } else {
            self.run_gsub_pass_forward(lookup_list, gdef, lookup_index, mask, album);
        }
    }

    fn run_gsub_pass_forward<'a>(
        &self,
        lookup_list: LookupList<'a, Lookup<'a, SubstitutionLookup<'a>>>,
        gdef: Option<&Gdef<'a>>,
        lookup_index: u16,
        mask: FeatureMask,
        album: &mut Album,
    ) {
        let mut locator = Locator::new();
        locator.reset(album, 0, album.glyph_count());
        let mut pos = locator.get_after(album, INVALID);
        while pos != INVALID {
            locator.jump_to(pos);
            if album.get_feature_mask(pos).matches(mask) {
                dispatcher::apply_gsub_lookup(lookup_list, gdef, lookup_index, album, &mut locator, 0);
            }
            locator.resync(album);
            pos = locator.get_after(album, locator.index());
        }
    }

    fn run_gsub_pass_reverse<'a>(
        &self,
        lookup_list: LookupList<'a, Lookup<'a, SubstitutionLookup<'a>>>,
        gdef: Option<&Gdef<'a>>,
        lookup_index: u16,
        mask: FeatureMask,
        album: &mut Album,
    ) {
        let mut locator = Locator::new();
        locator.reset(album, 0, album.glyph_count());
        let mut pos = locator.get_before(album, locator.limit());
        while pos != INVALID {
            locator.jump_to(pos);
            if album.get_feature_mask(pos).matches(mask) {
                dispatcher::apply_gsub_lookup(lookup_list, gdef, lookup_index, album, &mut locator, 0);
            }
            locator.resync(album);
            pos = locator.get_before(album, locator.index());
        }
    }

    /// Phase 3: seed advances from the font, then apply every positioning
    /// feature unit's lookups as full passes over the album.
    fn position_glyphs(&self, font: &dyn Font, pattern: &Pattern, album: &mut Album, gpos: Option<&Gpos>, gdef: Option<&Gdef>) {
        album.start_arranging();
        for i in 0..album.glyph_count() {
            let gid = album.get_glyph(i);
            album.set_advance(i, font.advance_for_glyph(gid));
        }
        let Some(lookup_list) = gpos.and_then(|g| g.lookup_list()) else {
            return;
        };
        for unit in &pattern.positioning_units {
            let mask = FeatureMask(unit.mask);
            for &lookup_index in &unit.lookup_indices {
                self.run_gpos_pass(lookup_list, gdef, lookup_index, mask, album);
            }
        }
    }

    fn run_gpos_pass<'a>(
        &self,
        lookup_list: LookupList<'a, Lookup<'a, PositionLookup<'a>>>,
        gdef: Option<&Gdef<'a>>,
        lookup_index: u16,
        mask: FeatureMask,
        album: &mut Album,
    ) {
        let mut locator = Locator::new();
        locator.reset(album, 0, album.glyph_count());
        let mut pos = locator.get_after(album, INVALID);
        while pos != INVALID {
            locator.jump_to(pos);
            if album.get_feature_mask(pos).matches(mask) {
                dispatcher::apply_gpos_lookup(lookup_list, gdef, lookup_index, album, &mut locator, self.ppem, 0);
            }
            locator.resync(album);
            pos = locator.get_after(album, locator.index());
        }
    }

    /// Phase 4: drop consumed placeholders, build the inverse map, and
    /// close out the arranging state.
    fn wrap_up(&self, album: &mut Album) {
        album.remove_placeholders();
        album.build_code_point_to_glyph_map();
        album.stop_arranging();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_types::GlyphId;

    struct StubFont;

    impl Font for StubFont {
        fn load_table(&self, _tag: [u8; 4]) -> Option<&[u8]> {
            None
        }

        fn glyph_id_for_code_point(&self, code_point: u32) -> GlyphId {
            GlyphId::new(code_point as u16)
        }

        fn advance_for_glyph(&self, gid: GlyphId) -> i32 {
            gid.to_u16() as i32 * 10
        }
    }

    #[test]
    fn no_op_tables_leave_glyphs_and_advances_untouched() {
        let font = StubFont;
        let pattern = Pattern::new(
            font_types::Tag::new(b"latn"),
            font_types::DFLT_LANG,
            crate::font::Direction::LeftToRight,
        );
        let mut album = Album::new();
        album.reset(&[0x41, 0x42, 0x43]);
        let processor = TextProcessor::new();
        processor.shape(&font, &pattern, &mut album, &NoopDecorator).unwrap();

        assert_eq!(
            album.glyphs().to_vec(),
            vec![GlyphId::new(0x41), GlyphId::new(0x42), GlyphId::new(0x43)]
        );
        assert_eq!(album.positions().to_vec(), vec![(0, 0), (0, 0), (0, 0)]);
        assert_eq!(album.advances().to_vec(), vec![0x41 * 10, 0x42 * 10, 0x43 * 10]);
        assert_eq!(album.code_point_to_glyph_map().to_vec(), vec![0u32, 1, 2]);
        assert_eq!(album.state(), AlbumState::Arranged);
    }
}
