//! The context matcher: format 1/2/3 sequence-context and chained-sequence-
//! context evaluation, shared by GSUB types 5/6 and GPOS types 7/8 since
//! both dispatch through the same [`SequenceContext`]/[`ChainedSequenceContext`]
//! reader.
//!
//! Three assessment modes share one walking driver: by glyph-ID equality
//! (format 1), by class number (format 2), and by coverage membership
//! (format 3). A match triggers a list of nested lookup applications, each
//! landing at a declared offset within the matched input range.

use font_tables::array::RecordArray;
use font_tables::tables::layout::{ChainedSequenceContext, ClassDef, CoverageTable, SequenceContext, SequenceLookupRecord};

use crate::album::Album;
use crate::locator::{LookupFlags, Locator, INVALID};

/// Maximum nested-lookup recursion depth. A rule that (directly or through
/// a chain of other rules) tries to recurse past this is silently dropped.
pub const MAX_DEPTH: u32 = 16;

/// A single position's match test within a context zone.
enum MatchValue<'a> {
    Glyph(font_types::GlyphId),
    Class { class_def: ClassDef<'a>, expected: u16 },
    Coverage(CoverageTable<'a>),
}

impl<'a> MatchValue<'a> {
    fn matches(&self, album: &Album, index: usize) -> bool {
        let gid = album.get_glyph(index);
        match self {
            MatchValue::Glyph(expected) => gid == *expected,
            MatchValue::Class { class_def, expected } => class_def.get(gid) == *expected,
            MatchValue::Coverage(coverage) => coverage.contains(gid),
        }
    }
}

/// Walks forward from `start` (the first, already-confirmed input glyph),
/// matching each of `values` against the next non-filtered position in
/// turn. Returns the index of the last matched position, or `None` if the
/// album ends before `values` is exhausted or any position fails to match.
fn match_forward(album: &Album, locator: &Locator, start: usize, values: &[MatchValue]) -> Option<usize> {
    let mut pos = start;
    for value in values {
        pos = locator.get_after(album, pos);
        if pos == INVALID || !value.matches(album, pos) {
            return None;
        }
    }
    Some(pos)
}

/// Walks backward from `start` (exclusive), matching `values` in
/// nearest-first order against preceding non-filtered positions.
fn match_backward(album: &Album, locator: &Locator, start: usize, values: &[MatchValue]) -> bool {
    let mut pos = start;
    for value in values {
        pos = locator.get_before(album, pos);
        if pos == INVALID || !value.matches(album, pos) {
            return false;
        }
    }
    true
}

/// Applies the nested lookups named by a matched rule, then leaves `outer`
/// positioned past the whole consumed context.
fn apply_nested(
    album: &mut Album,
    outer: &mut Locator,
    context_start: usize,
    context_end: usize,
    lookup_records: RecordArray<SequenceLookupRecord>,
    flags: LookupFlags,
    mark_filtering_set: Option<CoverageTable>,
    depth: u32,
    apply_lookup: &mut dyn FnMut(&mut Album, &mut Locator, u16, u32) -> bool,
) {
    if depth >= MAX_DEPTH {
        log::warn!("context recursion depth {depth} exceeded, dropping nested application");
        return;
    }
    let mut inner = Locator::new();
    inner.reset(album, context_start, context_end - context_start + 1);
    inner.reserve(flags, mark_filtering_set);
    for record in lookup_records.iter() {
        inner.resync(album);
        inner.jump_to(INVALID);
        if !inner.move_next(album) {
            continue;
        }
        if !inner.skip(album, record.sequence_index as usize) {
            continue;
        }
        apply_lookup(album, &mut inner, record.lookup_list_index, depth + 1);
    }
    outer.take_state(&inner);
}

/// Attempts to match `ctx` at `outer`'s current position and, on success,
/// applies its nested lookups and advances `outer` past the match.
/// Returns whether a rule matched.
#[allow(clippy::too_many_arguments)]
pub fn match_and_apply_sequence_context(
    ctx: &SequenceContext,
    album: &mut Album,
    outer: &mut Locator,
    flags: LookupFlags,
    mark_filtering_set: Option<CoverageTable>,
    depth: u32,
    apply_lookup: &mut dyn FnMut(&mut Album, &mut Locator, u16, u32) -> bool,
) -> bool {
    let start = outer.index();
    if start == INVALID {
        return false;
    }
    let gid = album.get_glyph(start);
    match ctx {
        SequenceContext::Format1(f1) => {
            let Some(cov_index) = f1.coverage().and_then(|c| c.get(gid)) else {
                return false;
            };
            let Some(rule_set) = f1.rule_set(cov_index) else {
                return false;
            };
            for rule in rule_set.rules() {
                let values: Vec<MatchValue> = rule.input_sequence().iter().map(MatchValue::Glyph).collect();
                if let Some(end) = match_forward(album, outer, start, &values) {
                    apply_nested(
                        album,
                        outer,
                        start,
                        end,
                        rule.lookup_records(),
                        flags,
                        mark_filtering_set,
                        depth,
                        apply_lookup,
                    );
                    return true;
                }
            }
            false
        }
        SequenceContext::Format2(f2) => {
            let Some(class_def) = f2.class_def() else {
                return false;
            };
            if f2.coverage().map(|c| c.contains(gid)) != Some(true) {
                return false;
            }
            let class = class_def.get(gid);
            let Some(rule_set) = f2.rule_set(class) else {
                return false;
            };
            for rule in rule_set.rules() {
                let values: Vec<MatchValue> = rule
                    .input_sequence()
                    .iter()
                    .map(|expected| MatchValue::Class { class_def, expected })
                    .collect();
                if let Some(end) = match_forward(album, outer, start, &values) {
                    apply_nested(
                        album,
                        outer,
                        start,
                        end,
                        rule.lookup_records(),
                        flags,
                        mark_filtering_set,
                        depth,
                        apply_lookup,
                    );
                    return true;
                }
            }
            false
        }
        SequenceContext::Format3(f3) => {
            let glyph_count = f3.glyph_count();
            if glyph_count == 0 {
                return false;
            }
            let Some(first_cov) = f3.coverage(0) else {
                return false;
            };
            if !first_cov.contains(gid) {
                return false;
            }
            let values: Vec<MatchValue> = (1..glyph_count)
                .filter_map(|i| f3.coverage(i).map(MatchValue::Coverage))
                .collect();
            if values.len() != glyph_count - 1 {
                return false;
            }
            if let Some(end) = match_forward(album, outer, start, &values) {
                apply_nested(
                    album,
                    outer,
                    start,
                    end,
                    f3.lookup_records(),
                    flags,
                    mark_filtering_set,
                    depth,
                    apply_lookup,
                );
                true
            } else {
                false
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn match_and_apply_chained_sequence_context(
    ctx: &ChainedSequenceContext,
    album: &mut Album,
    outer: &mut Locator,
    flags: LookupFlags,
    mark_filtering_set: Option<CoverageTable>,
    depth: u32,
    apply_lookup: &mut dyn FnMut(&mut Album, &mut Locator, u16, u32) -> bool,
) -> bool {
    let start = outer.index();
    if start == INVALID {
        return false;
    }
    let gid = album.get_glyph(start);
    match ctx {
        ChainedSequenceContext::Format1(f1) => {
            let Some(cov_index) = f1.coverage().and_then(|c| c.get(gid)) else {
                return false;
            };
            let Some(rule_set) = f1.rule_set(cov_index) else {
                return false;
            };
            for rule in rule_set.rules() {
                let backtrack: Vec<MatchValue> =
                    rule.backtrack_sequence().iter().map(MatchValue::Glyph).collect();
                let input: Vec<MatchValue> = rule.input_sequence().iter().map(MatchValue::Glyph).collect();
                let lookahead: Vec<MatchValue> =
                    rule.lookahead_sequence().iter().map(MatchValue::Glyph).collect();
                if !match_backward(album, outer, start, &backtrack) {
                    continue;
                }
                let Some(end) = match_forward(album, outer, start, &input) else {
                    continue;
                };
                if !match_forward(album, outer, end, &lookahead).map(|_| true).unwrap_or(lookahead.is_empty()) {
                    continue;
                }
                apply_nested(
                    album,
                    outer,
                    start,
                    end,
                    rule.lookup_records(),
                    flags,
                    mark_filtering_set,
                    depth,
                    apply_lookup,
                );
                return true;
            }
            false
        }
        ChainedSequenceContext::Format2(f2) => {
            let (Some(backtrack_cd), Some(input_cd), Some(lookahead_cd)) =
                (f2.backtrack_class_def(), f2.input_class_def(), f2.lookahead_class_def())
            else {
                return false;
            };
            if f2.coverage().map(|c| c.contains(gid)) != Some(true) {
                return false;
            }
            let class = input_cd.get(gid);
            let Some(rule_set) = f2.rule_set(class) else {
                return false;
            };
            for rule in rule_set.rules() {
                let backtrack: Vec<MatchValue> = rule
                    .backtrack_sequence()
                    .iter()
                    .map(|expected| MatchValue::Class {
                        class_def: backtrack_cd,
                        expected,
                    })
                    .collect();
                let input: Vec<MatchValue> = rule
                    .input_sequence()
                    .iter()
                    .map(|expected| MatchValue::Class {
                        class_def: input_cd,
                        expected,
                    })
                    .collect();
                let lookahead: Vec<MatchValue> = rule
                    .lookahead_sequence()
                    .iter()
                    .map(|expected| MatchValue::Class {
                        class_def: lookahead_cd,
                        expected,
                    })
                    .collect();
                if !match_backward(album, outer, start, &backtrack) {
                    continue;
                }
                let Some(end) = match_forward(album, outer, start, &input) else {
                    continue;
                };
                if match_forward(album, outer, end, &lookahead).is_none() && !lookahead.is_empty() {
                    continue;
                }
                apply_nested(
                    album,
                    outer,
                    start,
                    end,
                    rule.lookup_records(),
                    flags,
                    mark_filtering_set,
                    depth,
                    apply_lookup,
                );
                return true;
            }
            false
        }
        ChainedSequenceContext::Format3(f3) => {
            let backtrack_count = f3.backtrack_count();
            let input_count = f3.input_count();
            let lookahead_count = f3.lookahead_count();
            if input_count == 0 {
                return false;
            }
            let Some(first_cov) = f3.input_coverage(0) else {
                return false;
            };
            if !first_cov.contains(gid) {
                return false;
            }
            // Backtrack coverage is declared nearest-glyph-first, matching the
            // order `match_backward` consumes values in.
            let backtrack: Vec<MatchValue> = (0..backtrack_count)
                .filter_map(|i| f3.backtrack_coverage(i).map(MatchValue::Coverage))
                .collect();
            if backtrack.len() != backtrack_count {
                return false;
            }
            let input: Vec<MatchValue> = (1..input_count)
                .filter_map(|i| f3.input_coverage(i).map(MatchValue::Coverage))
                .collect();
            if input.len() != input_count - 1 {
                return false;
            }
            let lookahead: Vec<MatchValue> = (0..lookahead_count)
                .filter_map(|i| f3.lookahead_coverage(i).map(MatchValue::Coverage))
                .collect();
            if lookahead.len() != lookahead_count {
                return false;
            }
            if !match_backward(album, outer, start, &backtrack) {
                return false;
            }
            let Some(end) = match_forward(album, outer, start, &input) else {
                return false;
            };
            if match_forward(album, outer, end, &lookahead).is_none() && !lookahead.is_empty() {
                return false;
            }
            apply_nested(
                album,
                outer,
                start,
                end,
                f3.lookup_records(),
                flags,
                mark_filtering_set,
                depth,
                apply_lookup,
            );
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_tables::tables::layout::ChainedSequenceContext;
    use font_tables::FontData;
    use font_tables::FontRead;
    use font_types::GlyphId;

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    fn coverage_bytes(gid: u16) -> Vec<u8> {
        let mut buf = Vec::new();
        push_u16(&mut buf, 1);
        push_u16(&mut buf, 1);
        push_u16(&mut buf, gid);
        buf
    }

    // backtrack {0x41}, input {0x42}, lookahead {0x43}, one nested lookup at
    // sequence index 0.
    fn chain_context_format3_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        push_u16(&mut buf, 3); // format
        push_u16(&mut buf, 1); // backtrackGlyphCount
        push_u16(&mut buf, 20); // backtrackCoverageOffsets[0]
        push_u16(&mut buf, 1); // inputGlyphCount
        push_u16(&mut buf, 26); // inputCoverageOffsets[0]
        push_u16(&mut buf, 1); // lookaheadGlyphCount
        push_u16(&mut buf, 32); // lookaheadCoverageOffsets[0]
        push_u16(&mut buf, 1); // seqLookupCount
        push_u16(&mut buf, 0); // sequenceIndex
        push_u16(&mut buf, 0); // lookupListIndex
        buf.extend(coverage_bytes(0x41));
        buf.extend(coverage_bytes(0x42));
        buf.extend(coverage_bytes(0x43));
        buf
    }

    fn filled_album(gids: &[u16]) -> Album {
        let code_points: Vec<u32> = (0..gids.len() as u32).collect();
        let mut album = Album::new();
        album.reset(&code_points);
        album.start_filling();
        for (i, &g) in gids.iter().enumerate() {
            album.add_glyph(GlyphId::new(g), i);
        }
        album.stop_filling();
        album
    }

    #[test]
    fn chained_context_format3_applies_nested_single_substitution() {
        let bytes = chain_context_format3_bytes();
        let ctx = ChainedSequenceContext::read(FontData::new(&bytes)).unwrap();

        let mut album = filled_album(&[0x41, 0x42, 0x43]);
        let mut outer = Locator::new();
        outer.reset(&album, 0, album.glyph_count());
        outer.reserve(LookupFlags::default(), None);
        outer.jump_to(1);

        let matched = match_and_apply_chained_sequence_context(
            &ctx,
            &mut album,
            &mut outer,
            LookupFlags::default(),
            None,
            0,
            &mut |album, inner, _lookup_list_index, _depth| {
                album.set_glyph(inner.index(), GlyphId::new(0x99));
                true
            },
        );

        assert!(matched);
        assert_eq!(
            album.glyphs().to_vec(),
            vec![GlyphId::new(0x41), GlyphId::new(0x99), GlyphId::new(0x43)]
        );
    }

    #[test]
    fn chained_context_format3_rejects_wrong_backtrack() {
        let bytes = chain_context_format3_bytes();
        let ctx = ChainedSequenceContext::read(FontData::new(&bytes)).unwrap();

        // Input glyph at position 1 matches, but the preceding glyph is not
        // 0x41, so the backtrack zone must fail to match.
        let mut album = filled_album(&[0x40, 0x42, 0x43]);
        let mut outer = Locator::new();
        outer.reset(&album, 0, album.glyph_count());
        outer.reserve(LookupFlags::default(), None);
        outer.jump_to(1);

        let matched = match_and_apply_chained_sequence_context(
            &ctx,
            &mut album,
            &mut outer,
            LookupFlags::default(),
            None,
            0,
            &mut |_, _, _, _| true,
        );
        assert!(!matched);
        assert_eq!(album.get_glyph(1), GlyphId::new(0x42));
    }
}
