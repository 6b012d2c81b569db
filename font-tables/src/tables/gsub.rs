//! The `GSUB` table: glyph substitution lookups (single, multiple,
//! alternate, ligature, context, chaining context, extension, reverse
//! chaining single).

use font_types::{GlyphId, MajorMinor, Offset16, Offset32, Tag};

use crate::array::BeArray;
use crate::font_data::FontData;
use crate::read::{FontRead, ReadError};
use crate::tables::layout::{
    ChainedSequenceContext, CoverageTable, FeatureList, Lookup, LookupList, ScriptList,
    SequenceContext,
};

pub const TAG: Tag = Tag::new(b"GSUB");

#[derive(Clone, Copy)]
pub struct Gsub<'a> {
    data: FontData<'a>,
    pub version: MajorMinor,
    script_list_offset: Offset16<ScriptList<'static>>,
    feature_list_offset: Offset16<FeatureList<'static>>,
    lookup_list_offset: Offset16<LookupList<'static, Lookup<'static, SubstitutionLookup<'static>>>>,
}

impl<'a> Gsub<'a> {
    pub fn script_list(&self) -> Option<ScriptList<'a>> {
        self.data.resolve_offset(self.script_list_offset).ok()
    }

    pub fn feature_list(&self) -> Option<FeatureList<'a>> {
        self.data.resolve_offset(self.feature_list_offset).ok()
    }

    pub fn lookup_list(&self) -> Option<LookupList<'a, Lookup<'a, SubstitutionLookup<'a>>>> {
        self.data.resolve_offset(self.lookup_list_offset).ok()
    }
}

impl<'a> FontRead<'a> for Gsub<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: MajorMinor = cursor.read()?;
        let script_list_offset = cursor.read()?;
        let feature_list_offset = cursor.read()?;
        let lookup_list_offset = cursor.read()?;
        Ok(Gsub {
            data,
            version,
            script_list_offset,
            feature_list_offset,
            lookup_list_offset,
        })
    }
}

/// A single GSUB subtable, dispatched on the owning lookup's `lookup_type`.
///
/// Reading one of these requires knowing the lookup type, which lives on the
/// containing [`Lookup`]; [`Lookup::subtable`]/[`Lookup::subtables`] resolve
/// the offset and then re-read the format word that each subtable itself
/// carries, so no extra argument threading is needed here.
#[derive(Clone, Copy)]
pub enum SubstitutionLookup<'a> {
    Single(SingleSubst<'a>),
    Multiple(MultipleSubstFormat1<'a>),
    Alternate(AlternateSubstFormat1<'a>),
    Ligature(LigatureSubstFormat1<'a>),
    Contextual(SequenceContext<'a>),
    ChainContextual(ChainedSequenceContext<'a>),
    Extension(ExtensionSubtable<'a>),
    Reverse(ReverseChainSingleSubstFormat1<'a>),
}

impl<'a> SubstitutionLookup<'a> {
    /// Follows any `Extension` indirection to the real subtable it wraps.
    pub fn resolve_extension(self) -> Self {
        match self {
            SubstitutionLookup::Extension(ext) => ext.inner(),
            other => other,
        }
    }
}

/// GSUB lookups are read generically via [`Lookup<T>`]; `T`'s `FontRead`
/// impl does not know the lookup type on its own; callers use
/// [`read_subtable_with_type`] with the type word taken from the `Lookup`.
impl<'a> FontRead<'a> for SubstitutionLookup<'a> {
    fn read(_data: FontData<'a>) -> Result<Self, ReadError> {
        Err(ReadError::MalformedData(
            "substitution subtables must be read via read_subtable_with_type",
        ))
    }
}

/// Reads a single GSUB subtable given the lookup type it was declared under.
pub fn read_subtable_with_type(
    data: FontData<'_>,
    lookup_type: u16,
) -> Result<SubstitutionLookup<'_>, ReadError> {
    match lookup_type {
        1 => SingleSubst::read(data).map(SubstitutionLookup::Single),
        2 => MultipleSubstFormat1::read(data).map(SubstitutionLookup::Multiple),
        3 => AlternateSubstFormat1::read(data).map(SubstitutionLookup::Alternate),
        4 => LigatureSubstFormat1::read(data).map(SubstitutionLookup::Ligature),
        5 => SequenceContext::read(data).map(SubstitutionLookup::Contextual),
        6 => ChainedSequenceContext::read(data).map(SubstitutionLookup::ChainContextual),
        7 => ExtensionSubtable::read(data).map(SubstitutionLookup::Extension),
        8 => ReverseChainSingleSubstFormat1::read(data).map(SubstitutionLookup::Reverse),
        other => Err(ReadError::InvalidFormat(other)),
    }
}

impl<'a> Lookup<'a, SubstitutionLookup<'a>> {
    /// Like [`Lookup::subtable`], but dispatches on `self.lookup_type`
    /// rather than relying on `SubstitutionLookup`'s (unusable) blanket
    /// `FontRead` impl.
    pub fn gsub_subtable(&self, index: usize) -> Option<SubstitutionLookup<'a>> {
        let offset = self.raw_subtable_offset(index)?;
        let sub = self.table_data().slice(offset..)?;
        read_subtable_with_type(sub, self.lookup_type).ok()
    }

    pub fn gsub_subtables(&self) -> impl Iterator<Item = SubstitutionLookup<'a>> + 'a {
        let lookup_type = self.lookup_type;
        let data = self.table_data();
        self.raw_subtable_offsets()
            .filter_map(move |off| data.slice(off..))
            .filter_map(move |sub| read_subtable_with_type(sub, lookup_type).ok())
    }
}

// ---------------------------------------------------------------------
// Single substitution
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub enum SingleSubst<'a> {
    Format1(SingleSubstFormat1<'a>),
    Format2(SingleSubstFormat2<'a>),
}

impl<'a> SingleSubst<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        match self {
            SingleSubst::Format1(t) => t.coverage(),
            SingleSubst::Format2(t) => t.coverage(),
        }
    }

    /// Applies the substitution to `gid`, returning the replacement if
    /// `gid` is covered.
    pub fn map_glyph(&self, gid: GlyphId) -> Option<GlyphId> {
        match self {
            SingleSubst::Format1(t) => t.map_glyph(gid),
            SingleSubst::Format2(t) => t.map_glyph(gid),
        }
    }
}

impl<'a> FontRead<'a> for SingleSubst<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => SingleSubstFormat1::read(data).map(SingleSubst::Format1),
            2 => SingleSubstFormat2::read(data).map(SingleSubst::Format2),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[derive(Clone, Copy)]
pub struct SingleSubstFormat1<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    pub delta_glyph_id: i16,
}

impl<'a> SingleSubstFormat1<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn map_glyph(&self, gid: GlyphId) -> Option<GlyphId> {
        self.coverage()?.get(gid)?;
        let mapped = (gid.to_u16() as i32 + self.delta_glyph_id as i32) as u16;
        Some(GlyphId::new(mapped))
    }
}

impl<'a> FontRead<'a> for SingleSubstFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let delta_glyph_id = cursor.read()?;
        Ok(SingleSubstFormat1 {
            data,
            coverage_offset,
            delta_glyph_id,
        })
    }
}

#[derive(Clone, Copy)]
pub struct SingleSubstFormat2<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    substitute_glyph_ids: BeArray<'a, GlyphId>,
}

impl<'a> SingleSubstFormat2<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn map_glyph(&self, gid: GlyphId) -> Option<GlyphId> {
        let index = self.coverage()?.get(gid)?;
        self.substitute_glyph_ids.get(index as usize)
    }
}

impl<'a> FontRead<'a> for SingleSubstFormat2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 2 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let glyph_count: u16 = cursor.read()?;
        let substitute_glyph_ids = cursor.read_array(glyph_count as usize)?;
        Ok(SingleSubstFormat2 {
            data,
            coverage_offset,
            substitute_glyph_ids,
        })
    }
}

// ---------------------------------------------------------------------
// Multiple substitution
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct MultipleSubstFormat1<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    sequence_offsets: BeArray<'a, Offset16<Sequence<'static>>>,
}

impl<'a> MultipleSubstFormat1<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn sequence_for_glyph(&self, gid: GlyphId) -> Option<Sequence<'a>> {
        let index = self.coverage()?.get(gid)?;
        let offset = self.sequence_offsets.get(index as usize)?;
        self.data.resolve_offset(offset).ok()
    }
}

impl<'a> FontRead<'a> for MultipleSubstFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let sequence_count: u16 = cursor.read()?;
        let sequence_offsets = cursor.read_array(sequence_count as usize)?;
        Ok(MultipleSubstFormat1 {
            data,
            coverage_offset,
            sequence_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct Sequence<'a> {
    substitute_glyph_ids: BeArray<'a, GlyphId>,
}

impl<'a> Sequence<'a> {
    pub fn substitute_glyph_ids(&self) -> BeArray<'a, GlyphId> {
        self.substitute_glyph_ids
    }
}

impl<'a> FontRead<'a> for Sequence<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let glyph_count: u16 = cursor.read()?;
        let substitute_glyph_ids = cursor.read_array(glyph_count as usize)?;
        Ok(Sequence {
            substitute_glyph_ids,
        })
    }
}

// ---------------------------------------------------------------------
// Alternate substitution
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct AlternateSubstFormat1<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    alternate_set_offsets: BeArray<'a, Offset16<AlternateSet<'static>>>,
}

impl<'a> AlternateSubstFormat1<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn alternate_set_for_glyph(&self, gid: GlyphId) -> Option<AlternateSet<'a>> {
        let index = self.coverage()?.get(gid)?;
        let offset = self.alternate_set_offsets.get(index as usize)?;
        self.data.resolve_offset(offset).ok()
    }
}

impl<'a> FontRead<'a> for AlternateSubstFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let alternate_set_count: u16 = cursor.read()?;
        let alternate_set_offsets = cursor.read_array(alternate_set_count as usize)?;
        Ok(AlternateSubstFormat1 {
            data,
            coverage_offset,
            alternate_set_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct AlternateSet<'a> {
    alternate_glyph_ids: BeArray<'a, GlyphId>,
}

impl<'a> AlternateSet<'a> {
    pub fn alternate_glyph_ids(&self) -> BeArray<'a, GlyphId> {
        self.alternate_glyph_ids
    }

    /// Picks the first alternate, the default policy when no external
    /// selector overrides it.
    pub fn first_alternate(&self) -> Option<GlyphId> {
        self.alternate_glyph_ids.get(0)
    }
}

impl<'a> FontRead<'a> for AlternateSet<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let glyph_count: u16 = cursor.read()?;
        let alternate_glyph_ids = cursor.read_array(glyph_count as usize)?;
        Ok(AlternateSet {
            alternate_glyph_ids,
        })
    }
}

// ---------------------------------------------------------------------
// Ligature substitution
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct LigatureSubstFormat1<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    ligature_set_offsets: BeArray<'a, Offset16<LigatureSet<'static>>>,
}

impl<'a> LigatureSubstFormat1<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn ligature_set_for_glyph(&self, gid: GlyphId) -> Option<LigatureSet<'a>> {
        let index = self.coverage()?.get(gid)?;
        let offset = self.ligature_set_offsets.get(index as usize)?;
        self.data.resolve_offset(offset).ok()
    }
}

impl<'a> FontRead<'a> for LigatureSubstFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let ligature_set_count: u16 = cursor.read()?;
        let ligature_set_offsets = cursor.read_array(ligature_set_count as usize)?;
        Ok(LigatureSubstFormat1 {
            data,
            coverage_offset,
            ligature_set_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct LigatureSet<'a> {
    data: FontData<'a>,
    ligature_offsets: BeArray<'a, Offset16<Ligature<'static>>>,
}

impl<'a> LigatureSet<'a> {
    /// Ligatures in preference order — the first whose component sequence
    /// matches the input wins.
    pub fn ligatures(&self) -> impl Iterator<Item = Ligature<'a>> + 'a {
        let data = self.data;
        self.ligature_offsets
            .iter()
            .filter_map(move |off| data.resolve_offset(off).ok())
    }
}

impl<'a> FontRead<'a> for LigatureSet<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let ligature_count: u16 = cursor.read()?;
        let ligature_offsets = cursor.read_array(ligature_count as usize)?;
        Ok(LigatureSet {
            data,
            ligature_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct Ligature<'a> {
    pub ligature_glyph: GlyphId,
    component_glyph_ids: BeArray<'a, GlyphId>,
}

impl<'a> Ligature<'a> {
    /// Component glyphs from the *second* position onward (the first was
    /// already confirmed by the ligature set's coverage index).
    pub fn component_glyph_ids(&self) -> BeArray<'a, GlyphId> {
        self.component_glyph_ids
    }
}

impl<'a> FontRead<'a> for Ligature<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let ligature_glyph = cursor.read()?;
        let component_count: u16 = cursor.read()?;
        let component_len = (component_count as usize).saturating_sub(1);
        let component_glyph_ids = cursor.read_array(component_len)?;
        Ok(Ligature {
            ligature_glyph,
            component_glyph_ids,
        })
    }
}

// ---------------------------------------------------------------------
// Extension
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct ExtensionSubstFormat1<'a> {
    data: FontData<'a>,
    pub extension_lookup_type: u16,
    extension_offset: Offset32<()>,
}

impl<'a> ExtensionSubstFormat1<'a> {
    pub fn inner(&self) -> SubstitutionLookup<'a> {
        let pos = self.extension_offset.to_usize();
        self.data
            .slice(pos..)
            .ok_or(ReadError::OutOfBounds)
            .and_then(|sub| read_subtable_with_type(sub, self.extension_lookup_type))
            .unwrap_or(SubstitutionLookup::Reverse(
                ReverseChainSingleSubstFormat1::empty(),
            ))
    }
}

impl<'a> FontRead<'a> for ExtensionSubstFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let extension_lookup_type = cursor.read()?;
        let extension_offset = cursor.read()?;
        Ok(ExtensionSubstFormat1 {
            data,
            extension_lookup_type,
            extension_offset,
        })
    }
}

pub type ExtensionSubtable<'a> = ExtensionSubstFormat1<'a>;

// ---------------------------------------------------------------------
// Reverse chaining contextual single substitution
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct ReverseChainSingleSubstFormat1<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    backtrack_coverage_offsets: BeArray<'a, Offset16<CoverageTable<'static>>>,
    lookahead_coverage_offsets: BeArray<'a, Offset16<CoverageTable<'static>>>,
    substitute_glyph_ids: BeArray<'a, GlyphId>,
}

impl<'a> ReverseChainSingleSubstFormat1<'a> {
    fn empty() -> Self {
        ReverseChainSingleSubstFormat1 {
            data: FontData::EMPTY,
            coverage_offset: Offset16::new(0),
            backtrack_coverage_offsets: FontData::EMPTY.cursor().read_array(0).unwrap(),
            lookahead_coverage_offsets: FontData::EMPTY.cursor().read_array(0).unwrap(),
            substitute_glyph_ids: FontData::EMPTY.cursor().read_array(0).unwrap(),
        }
    }

    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn backtrack_count(&self) -> usize {
        self.backtrack_coverage_offsets.len()
    }

    pub fn backtrack_coverage(&self, index: usize) -> Option<CoverageTable<'a>> {
        let offset = self.backtrack_coverage_offsets.get(index)?;
        self.data.resolve_offset(offset).ok()
    }

    pub fn lookahead_count(&self) -> usize {
        self.lookahead_coverage_offsets.len()
    }

    pub fn lookahead_coverage(&self, index: usize) -> Option<CoverageTable<'a>> {
        let offset = self.lookahead_coverage_offsets.get(index)?;
        self.data.resolve_offset(offset).ok()
    }

    pub fn map_glyph(&self, coverage_index: u16) -> Option<GlyphId> {
        self.substitute_glyph_ids.get(coverage_index as usize)
    }
}

impl<'a> FontRead<'a> for ReverseChainSingleSubstFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let backtrack_glyph_count: u16 = cursor.read()?;
        let backtrack_coverage_offsets = cursor.read_array(backtrack_glyph_count as usize)?;
        let lookahead_glyph_count: u16 = cursor.read()?;
        let lookahead_coverage_offsets = cursor.read_array(lookahead_glyph_count as usize)?;
        let glyph_count: u16 = cursor.read()?;
        let substitute_glyph_ids = cursor.read_array(glyph_count as usize)?;
        Ok(ReverseChainSingleSubstFormat1 {
            data,
            coverage_offset,
            backtrack_coverage_offsets,
            lookahead_coverage_offsets,
            substitute_glyph_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    #[test]
    fn single_subst_format2_maps_covered_glyphs_only() {
        // coverage {0x42} -> substitute [0x5A], header then coverage.
        let mut buf = Vec::new();
        push_u16(&mut buf, 2); // format
        push_u16(&mut buf, 8); // coverageOffset
        push_u16(&mut buf, 1); // glyphCount
        push_u16(&mut buf, 0x5A); // substituteGlyphIds[0]
        push_u16(&mut buf, 1); // coverage format 1
        push_u16(&mut buf, 1); // coverage glyphCount
        push_u16(&mut buf, 0x42); // coverage glyphArray[0]

        let table = SingleSubst::read(FontData::new(&buf)).unwrap();
        assert_eq!(table.map_glyph(GlyphId::new(0x41)), None);
        assert_eq!(table.map_glyph(GlyphId::new(0x42)), Some(GlyphId::new(0x5A)));
        assert_eq!(table.map_glyph(GlyphId::new(0x43)), None);
    }

    #[test]
    fn ligature_subst_collapses_fi_under_coverage() {
        // coverage {0x66} -> ligature set -> ligature(0xFB01, components=[0x69]).
        let mut buf = Vec::new();
        push_u16(&mut buf, 1); // format
        push_u16(&mut buf, 8); // coverageOffset
        push_u16(&mut buf, 1); // ligatureSetCount
        push_u16(&mut buf, 14); // ligatureSetOffsets[0]
        push_u16(&mut buf, 1); // coverage format 1
        push_u16(&mut buf, 1); // coverage glyphCount
        push_u16(&mut buf, 0x66); // coverage glyphArray[0]
        push_u16(&mut buf, 1); // ligatureSet.ligatureCount
        push_u16(&mut buf, 4); // ligatureSet.ligatureOffsets[0], relative to ligature set start
        push_u16(&mut buf, 0xFB01); // ligature.ligatureGlyph
        push_u16(&mut buf, 2); // ligature.componentCount (includes the coverage-matched first glyph)
        push_u16(&mut buf, 0x69); // ligature.componentGlyphIds[0]

        let table = LigatureSubstFormat1::read(FontData::new(&buf)).unwrap();
        assert_eq!(table.coverage().unwrap().get(GlyphId::new(0x66)), Some(0));
        let ligature_set = table.ligature_set_for_glyph(GlyphId::new(0x66)).unwrap();
        let ligature = ligature_set.ligatures().next().unwrap();
        assert_eq!(ligature.ligature_glyph, GlyphId::new(0xFB01));
        assert_eq!(
            ligature.component_glyph_ids().iter().collect::<Vec<_>>(),
            vec![GlyphId::new(0x69)]
        );
    }

    #[test]
    fn multiple_subst_expands_one_glyph_into_three() {
        // coverage {0x10} -> sequence [0xA0, 0xA1, 0xA2].
        let mut buf = Vec::new();
        push_u16(&mut buf, 1); // format
        push_u16(&mut buf, 8); // coverageOffset
        push_u16(&mut buf, 1); // sequenceCount
        push_u16(&mut buf, 14); // sequenceOffsets[0]
        push_u16(&mut buf, 1); // coverage format 1
        push_u16(&mut buf, 1); // coverage glyphCount
        push_u16(&mut buf, 0x10); // coverage glyphArray[0]
        push_u16(&mut buf, 3); // sequence glyphCount
        push_u16(&mut buf, 0xA0);
        push_u16(&mut buf, 0xA1);
        push_u16(&mut buf, 0xA2);

        let table = MultipleSubstFormat1::read(FontData::new(&buf)).unwrap();
        let sequence = table.sequence_for_glyph(GlyphId::new(0x10)).unwrap();
        assert_eq!(
            sequence.substitute_glyph_ids().iter().collect::<Vec<_>>(),
            vec![GlyphId::new(0xA0), GlyphId::new(0xA1), GlyphId::new(0xA2)]
        );
        assert!(table.sequence_for_glyph(GlyphId::new(0x11)).is_none());
    }
}
