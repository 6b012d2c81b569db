//! The lookup dispatcher: applies a single GSUB or GPOS lookup, by index,
//! at a locator's current position.
//!
//! Each public entry point resolves the lookup from its table's
//! `LookupList`, loads its flags into the locator, then tries each subtable
//! in declared order until one claims the position (first-subtable-match
//! wins, mirroring how `SubstitutionLookup`/`PositionLookup` are declared).
//! Context and chain-context subtables recurse back into these same entry
//! points through [`context`], bounded by [`context::MAX_DEPTH`].

use font_tables::tables::gdef::Gdef;
use font_tables::tables::gpos::{self, AnchorTable, PositionLookup, ValueRecord};
use font_tables::tables::gsub::{self, ReverseChainSingleSubstFormat1, Sequence, SubstitutionLookup};
use font_tables::tables::layout::{Lookup, LookupList};
use font_types::GlyphId;

use crate::album::{Album, Association, GlyphTraits};
use crate::context;
use crate::locator::{LookupFlags, Locator, INVALID};

/// Resolves a lookup's mark-filtering coverage set from GDEF, if the lookup
/// asks for one and a GDEF table was supplied.
fn resolve_mark_filtering_set<'a, T: font_tables::read::FontRead<'a>>(
    lookup: &Lookup<'a, T>,
    flags: LookupFlags,
    gdef: Option<&Gdef<'a>>,
) -> Option<font_tables::tables::layout::CoverageTable<'a>> {
    if !flags.use_mark_filtering_set {
        return None;
    }
    let set_index = lookup.mark_filtering_set()?;
    gdef?.mark_glyph_sets_def()?.coverage(set_index)
}

/// Applies GSUB lookup `index` at `locator`'s current position. Returns
/// whether a subtable matched and mutated the album.
pub fn apply_gsub_lookup<'a>(
    lookup_list: LookupList<'a, Lookup<'a, SubstitutionLookup<'a>>>,
    gdef: Option<&Gdef<'a>>,
    index: u16,
    album: &mut Album,
    locator: &mut Locator<'a>,
    depth: u32,
) -> bool {
    if depth >= context::MAX_DEPTH {
        return false;
    }
    let Some(lookup) = lookup_list.get(index) else {
        return false;
    };
    let flags = LookupFlags::from(lookup.lookup_flag);
    let mark_set = resolve_mark_filtering_set(&lookup, flags, gdef);
    locator.reserve(flags, mark_set);
    locator.resync(album);
    if locator.index() == INVALID {
        return false;
    }
    for subtable in lookup.gsub_subtables() {
        if apply_gsub_subtable(&subtable.resolve_extension(), lookup_list, gdef, flags, mark_set, album, locator, depth) {
            return true;
        }
    }
    false
}

#[allow(clippy::too_many_arguments)]
fn apply_gsub_subtable<'a>(
    subtable: &SubstitutionLookup<'a>,
    lookup_list: LookupList<'a, Lookup<'a, SubstitutionLookup<'a>>>,
    gdef: Option<&Gdef<'a>>,
    flags: LookupFlags,
    mark_set: Option<font_tables::tables::layout::CoverageTable<'a>>,
    album: &mut Album,
    locator: &mut Locator<'a>,
    depth: u32,
) -> bool {
    let pos = locator.index();
    let gid = album.get_glyph(pos);
    match subtable {
        SubstitutionLookup::Single(single) => match single.map_glyph(gid) {
            Some(new_gid) => {
                album.set_glyph(pos, new_gid);
                true
            }
            None => false,
        },
        SubstitutionLookup::Multiple(multiple) => match multiple.sequence_for_glyph(gid) {
            Some(seq) => {
                apply_multiple_substitution(album, locator, pos, &seq);
                true
            }
            None => false,
        },
        SubstitutionLookup::Alternate(alternate) => match alternate
            .alternate_set_for_glyph(gid)
            .and_then(|set| set.first_alternate())
        {
            Some(new_gid) => {
                album.set_glyph(pos, new_gid);
                true
            }
            None => false,
        },
        SubstitutionLookup::Ligature(ligature) => try_apply_ligature(ligature, album, locator, pos),
        SubstitutionLookup::Contextual(ctx) => {
            context::match_and_apply_sequence_context(ctx, album, locator, flags, mark_set, depth, &mut |album, loc, idx, d| {
                apply_gsub_lookup(lookup_list, gdef, idx, album, loc, d)
            })
        }
        SubstitutionLookup::ChainContextual(ctx) => {
            context::match_and_apply_chained_sequence_context(ctx, album, locator, flags, mark_set, depth, &mut |album, loc, idx, d| {
                apply_gsub_lookup(lookup_list, gdef, idx, album, loc, d)
            })
        }
        SubstitutionLookup::Reverse(reverse) => apply_reverse_chaining(reverse, album, locator, pos),
        SubstitutionLookup::Extension(_) => false,
    }
}

fn apply_multiple_substitution(album: &mut Album, locator: &mut Locator, pos: usize, seq: &Sequence) {
    let glyphs: Vec<GlyphId> = seq.substitute_glyph_ids().iter().collect();
    if glyphs.is_empty() {
        // An empty substitute sequence deletes the glyph outright.
        album.insert_traits(pos, GlyphTraits::PLACEHOLDER);
        return;
    }
    let assoc = album.association(pos);
    album.set_glyph(pos, glyphs[0]);
    if glyphs.len() > 1 {
        album.reserve_glyphs(pos + 1, glyphs.len() - 1);
        let codepoints = codepoints_of(album, assoc);
        for (i, gid) in glyphs[1..].iter().enumerate() {
            let idx = pos + 1 + i;
            album.set_glyph(idx, *gid);
            assign_codepoints(album, idx, &codepoints);
        }
        locator.resync(album);
    }
    locator.jump_to(pos + glyphs.len() - 1);
}

fn codepoints_of(album: &Album, assoc: Association) -> Vec<u32> {
    match assoc {
        Association::Single(cp) => vec![cp as u32],
        Association::Composite(cell) => album.get_composite_associations(cell).to_vec(),
    }
}

fn assign_codepoints(album: &mut Album, index: usize, codepoints: &[u32]) {
    if codepoints.len() == 1 {
        album.set_single_association(index, codepoints[0] as usize);
    } else {
        let cell = album.make_composite_associations(index, codepoints.len());
        cell.copy_from_slice(codepoints);
    }
}

fn try_apply_ligature(
    subst: &gsub::LigatureSubstFormat1,
    album: &mut Album,
    locator: &mut Locator,
    pos: usize,
) -> bool {
    let gid = album.get_glyph(pos);
    let Some(set) = subst.ligature_set_for_glyph(gid) else {
        return false;
    };
    for ligature in set.ligatures() {
        let mut positions = vec![pos];
        let mut cur = pos;
        let mut matched = true;
        for component in ligature.component_glyph_ids().iter() {
            cur = locator.get_after(album, cur);
            if cur == INVALID || album.get_glyph(cur) != component {
                matched = false;
                break;
            }
            positions.push(cur);
        }
        if !matched {
            continue;
        }
        let codepoints: Vec<u32> = positions
            .iter()
            .flat_map(|&p| codepoints_of(album, album.association(p)))
            .collect();
        assign_codepoints(album, pos, &codepoints);
        album.set_glyph(pos, ligature.ligature_glyph);
        album.insert_traits(pos, GlyphTraits::LIGATURE);
        for &p in &positions[1..] {
            album.insert_traits(p, GlyphTraits::PLACEHOLDER);
        }
        locator.jump_to(pos);
        return true;
    }
    false
}

fn apply_reverse_chaining(
    subst: &ReverseChainSingleSubstFormat1,
    album: &mut Album,
    locator: &Locator,
    pos: usize,
) -> bool {
    let gid = album.get_glyph(pos);
    let Some(cov_index) = subst.coverage().and_then(|c| c.get(gid)) else {
        return false;
    };
    let mut p = pos;
    for i in 0..subst.backtrack_count() {
        p = locator.get_before(album, p);
        let Some(cov) = subst.backtrack_coverage(i) else {
            return false;
        };
        if p == INVALID || !cov.contains(album.get_glyph(p)) {
            return false;
        }
    }
    let mut q = pos;
    for i in 0..subst.lookahead_count() {
        q = locator.get_after(album, q);
        let Some(cov) = subst.lookahead_coverage(i) else {
            return false;
        };
        if q == INVALID || !cov.contains(album.get_glyph(q)) {
            return false;
        }
    }
    match subst.map_glyph(cov_index) {
        Some(new_gid) => {
            album.set_glyph(pos, new_gid);
            true
        }
        None => false,
    }
}

/// Applies GPOS lookup `index` at `locator`'s current position. `ppem` feeds
/// static `Device` hinting deltas; pass `0` to skip them.
pub fn apply_gpos_lookup<'a>(
    lookup_list: LookupList<'a, Lookup<'a, PositionLookup<'a>>>,
    gdef: Option<&Gdef<'a>>,
    index: u16,
    album: &mut Album,
    locator: &mut Locator<'a>,
    ppem: u16,
    depth: u32,
) -> bool {
    if depth >= context::MAX_DEPTH {
        return false;
    }
    let Some(lookup) = lookup_list.get(index) else {
        return false;
    };
    let flags = LookupFlags::from(lookup.lookup_flag);
    let mark_set = resolve_mark_filtering_set(&lookup, flags, gdef);
    locator.reserve(flags, mark_set);
    locator.resync(album);
    if locator.index() == INVALID {
        return false;
    }
    for subtable in lookup.gpos_subtables() {
        if apply_gpos_subtable(&subtable.resolve_extension(), lookup_list, gdef, flags, mark_set, album, locator, ppem, depth) {
            return true;
        }
    }
    false
}

#[allow(clippy::too_many_arguments)]
fn apply_gpos_subtable<'a>(
    subtable: &PositionLookup<'a>,
    lookup_list: LookupList<'a, Lookup<'a, PositionLookup<'a>>>,
    gdef: Option<&Gdef<'a>>,
    flags: LookupFlags,
    mark_set: Option<font_tables::tables::layout::CoverageTable<'a>>,
    album: &mut Album,
    locator: &mut Locator<'a>,
    ppem: u16,
    depth: u32,
) -> bool {
    let pos = locator.index();
    let gid = album.get_glyph(pos);
    match subtable {
        PositionLookup::Single(single) => match single.value_for_glyph(gid) {
            Some(record) => {
                apply_value_record(album, pos, &record, ppem);
                true
            }
            None => false,
        },
        PositionLookup::Pair(pair) => apply_pair_pos(pair, album, locator, pos, ppem),
        PositionLookup::Cursive(cursive) => apply_cursive_pos(cursive, album, locator, pos),
        PositionLookup::MarkToBase(mark_base) => apply_mark_to_base(mark_base, album, locator, pos),
        PositionLookup::MarkToLig(mark_lig) => apply_mark_to_ligature(mark_lig, album, locator, pos),
        PositionLookup::MarkToMark(mark_mark) => apply_mark_to_mark(mark_mark, album, locator, pos),
        PositionLookup::Contextual(ctx) => {
            context::match_and_apply_sequence_context(ctx, album, locator, flags, mark_set, depth, &mut |album, loc, idx, d| {
                apply_gpos_lookup(lookup_list, gdef, idx, album, loc, ppem, d)
            })
        }
        PositionLookup::ChainContextual(ctx) => {
            context::match_and_apply_chained_sequence_context(ctx, album, locator, flags, mark_set, depth, &mut |album, loc, idx, d| {
                apply_gpos_lookup(lookup_list, gdef, idx, album, loc, ppem, d)
            })
        }
        PositionLookup::Extension(_) => false,
    }
}

fn apply_value_record(album: &mut Album, index: usize, record: &ValueRecord, ppem: u16) {
    let mut dx = record.x_placement as i32;
    let mut dy = record.y_placement as i32;
    let mut da = record.x_advance as i32;
    if ppem != 0 {
        dx += record.x_placement_device().map(|d| d.delta_for_ppem(ppem)).unwrap_or(0);
        dy += record.y_placement_device().map(|d| d.delta_for_ppem(ppem)).unwrap_or(0);
        da += record.x_advance_device().map(|d| d.delta_for_ppem(ppem)).unwrap_or(0);
    }
    album.add_x(index, dx);
    album.add_y(index, dy);
    let advance = album.advance(index) + da;
    album.set_advance(index, advance);
}

fn apply_pair_pos(pair: &gpos::PairPos, album: &mut Album, locator: &mut Locator, pos: usize, ppem: u16) -> bool {
    let gid = album.get_glyph(pos);
    let next_pos = locator.get_after(album, pos);
    if next_pos == INVALID {
        return false;
    }
    let next_gid = album.get_glyph(next_pos);
    let applied = match pair {
        gpos::PairPos::Format1(f1) => f1.pair_set_for_glyph(gid).and_then(|set| set.find(next_gid)).map(|rec| {
            apply_value_record(album, pos, &rec.value_record1, ppem);
            apply_value_record(album, next_pos, &rec.value_record2, ppem);
        }),
        gpos::PairPos::Format2(f2) => {
            if f2.coverage().map(|c| c.contains(gid)) != Some(true) {
                None
            } else {
                let class1 = f2.class_def1().map(|cd| cd.get(gid)).unwrap_or(0);
                let class2 = f2.class_def2().map(|cd| cd.get(next_gid)).unwrap_or(0);
                f2.value_for_classes(class1, class2).map(|(v1, v2)| {
                    apply_value_record(album, pos, &v1, ppem);
                    apply_value_record(album, next_pos, &v2, ppem);
                })
            }
        }
    };
    if applied.is_some() {
        locator.jump_to(next_pos);
        true
    } else {
        false
    }
}

fn apply_cursive_pos(cursive: &gpos::CursivePosFormat1, album: &mut Album, locator: &Locator, pos: usize) -> bool {
    let gid = album.get_glyph(pos);
    let Some(cov_index) = cursive.coverage().and_then(|c| c.get(gid)) else {
        return false;
    };
    let Some((entry, _exit)) = cursive.entry_exit(cov_index) else {
        return false;
    };
    let Some(entry) = entry else {
        return false;
    };
    let prev = locator.get_before(album, pos);
    if prev == INVALID {
        return false;
    }
    let prev_gid = album.get_glyph(prev);
    let Some(prev_cov) = cursive.coverage().and_then(|c| c.get(prev_gid)) else {
        return false;
    };
    let Some((_, Some(prev_exit))) = cursive.entry_exit(prev_cov) else {
        return false;
    };
    let (prev_x, prev_y) = album.position(prev);
    let (ex, ey) = entry.coordinates();
    let (px, py) = prev_exit.coordinates();
    let dy = (prev_y + py as i32) - (ey as i32);
    let dx = (prev_x + px as i32) - (ex as i32);
    album.add_x(pos, dx);
    album.add_y(pos, dy);
    album.set_cursive_offset(pos, dy.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
    true
}

/// Aligns a mark's anchor onto a base glyph's matching anchor.
fn attach_to_anchor(album: &mut Album, mark_pos: usize, mark_anchor: &AnchorTable, base_pos: usize, base_anchor: &AnchorTable) {
    let (base_x, base_y) = album.position(base_pos);
    let (bx, by) = base_anchor.coordinates();
    let (mx, my) = mark_anchor.coordinates();
    album.set_x(mark_pos, base_x + bx as i32 - mx as i32);
    album.set_y(mark_pos, base_y + by as i32 - my as i32);
    let offset = base_pos as i64 - mark_pos as i64;
    album.set_attachment_offset(mark_pos, offset.clamp(i16::MIN as i64, i16::MAX as i64) as i16);
}

fn apply_mark_to_base(mark_base: &gpos::MarkBasePosFormat1, album: &mut Album, locator: &Locator, pos: usize) -> bool {
    let gid = album.get_glyph(pos);
    let Some(mark_index) = mark_base.mark_coverage().and_then(|c| c.get(gid)) else {
        return false;
    };
    let base_pos = locator.get_before(album, pos);
    if base_pos == INVALID {
        return false;
    }
    let base_gid = album.get_glyph(base_pos);
    let Some(base_index) = mark_base.base_coverage().and_then(|c| c.get(base_gid)) else {
        return false;
    };
    let (Some((mark_class, mark_anchor)), Some(base_array)) =
        (mark_base.mark_array().and_then(|a| a.get(mark_index)), mark_base.base_array())
    else {
        return false;
    };
    let Some(base_anchor) = base_array.base_anchor(base_index, mark_class) else {
        return false;
    };
    attach_to_anchor(album, pos, &mark_anchor, base_pos, &base_anchor);
    true
}

fn apply_mark_to_ligature(mark_lig: &gpos::MarkLigPosFormat1, album: &mut Album, locator: &Locator, pos: usize) -> bool {
    let gid = album.get_glyph(pos);
    let Some(mark_index) = mark_lig.mark_coverage().and_then(|c| c.get(gid)) else {
        return false;
    };
    let base_pos = locator.get_before(album, pos);
    if base_pos == INVALID {
        return false;
    }
    let base_gid = album.get_glyph(base_pos);
    let Some(lig_index) = mark_lig.ligature_coverage().and_then(|c| c.get(base_gid)) else {
        return false;
    };
    let (Some((mark_class, mark_anchor)), Some(lig_array)) =
        (mark_lig.mark_array().and_then(|a| a.get(mark_index)), mark_lig.ligature_array())
    else {
        return false;
    };
    // The component the mark attaches to is, precisely, a function of how
    // many ligature components precede it in the original text; without
    // per-glyph component tracking this always attaches to the first
    // component, a scope reduction noted alongside this function.
    let Some(attach) = lig_array.ligature_attach(lig_index) else {
        return false;
    };
    let Some(anchor) = attach.component_anchor(0, mark_class) else {
        return false;
    };
    attach_to_anchor(album, pos, &mark_anchor, base_pos, &anchor);
    true
}

fn apply_mark_to_mark(mark_mark: &gpos::MarkMarkPosFormat1, album: &mut Album, locator: &Locator, pos: usize) -> bool {
    let gid = album.get_glyph(pos);
    let Some(mark1_index) = mark_mark.mark1_coverage().and_then(|c| c.get(gid)) else {
        return false;
    };
    let base_pos = locator.get_before(album, pos);
    if base_pos == INVALID {
        return false;
    }
    let base_gid = album.get_glyph(base_pos);
    let Some(mark2_index) = mark_mark.mark2_coverage().and_then(|c| c.get(base_gid)) else {
        return false;
    };
    let (Some((mark_class, mark_anchor)), Some(mark2_array)) = (
        mark_mark.mark1_array().and_then(|a| a.get(mark1_index)),
        mark_mark.mark2_array(),
    ) else {
        return false;
    };
    let Some(anchor) = mark2_array.mark2_anchor(mark2_index, mark_class) else {
        return false;
    };
    attach_to_anchor(album, pos, &mark_anchor, base_pos, &anchor);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_tables::{FontData, FontRead};

    #[test]
    fn multiple_substitution_expands_one_glyph_and_reassigns_associations() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&3u16.to_be_bytes()); // glyphCount
        buf.extend_from_slice(&0xA0u16.to_be_bytes());
        buf.extend_from_slice(&0xA1u16.to_be_bytes());
        buf.extend_from_slice(&0xA2u16.to_be_bytes());
        let seq = Sequence::read(FontData::new(&buf)).unwrap();

        let mut album = Album::new();
        album.reset(&[0x10]);
        album.start_filling();
        album.add_glyph(GlyphId::new(0x10), 0);

        let mut locator = Locator::new();
        locator.reset(&album, 0, album.glyph_count());
        locator.reserve(LookupFlags::default(), None);

        apply_multiple_substitution(&mut album, &mut locator, 0, &seq);

        assert_eq!(
            album.glyphs().to_vec(),
            vec![GlyphId::new(0xA0), GlyphId::new(0xA1), GlyphId::new(0xA2)]
        );
        for i in 0..3 {
            assert_eq!(album.association(i), Association::Single(0));
        }
        album.build_code_point_to_glyph_map();
        assert_eq!(album.code_point_to_glyph_map().to_vec(), vec![0u32]);
    }
}
