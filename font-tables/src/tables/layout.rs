//! Tables shared by GSUB and GPOS: script/feature/lookup selection,
//! coverage, class definitions, and the context/chaining-context
//! subtable families.

use font_types::{FixedSize, GlyphId, Offset, Offset16, Scalar, Tag};

use crate::array::{BeArray, ReadRecord, RecordArray};
use crate::font_data::FontData;
use crate::read::{FontRead, FontReadWithArgs, ReadArgs, ReadError};

// ---------------------------------------------------------------------
// ScriptList / Script / LangSys
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct ScriptList<'a> {
    data: FontData<'a>,
    script_records: RecordArray<'a, ScriptRecord>,
}

impl<'a> ScriptList<'a> {
    pub fn script_records(&self) -> RecordArray<'a, ScriptRecord> {
        self.script_records
    }

    /// Find a script by tag, falling back to `DFLT` if present.
    pub fn find_script(&self, tag: Tag) -> Option<Script<'a>> {
        self.script_records
            .iter()
            .find(|rec| rec.script_tag == tag)
            .or_else(|| {
                self.script_records
                    .iter()
                    .find(|rec| rec.script_tag == font_types::DFLT_SCRIPT)
            })
            .and_then(|rec| self.data.resolve_offset(rec.script_offset).ok())
    }
}

impl<'a> FontRead<'a> for ScriptList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let script_count: u16 = cursor.read()?;
        let script_records = cursor.read_records(script_count as usize)?;
        Ok(ScriptList {
            data,
            script_records,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ScriptRecord {
    pub script_tag: Tag,
    pub script_offset: Offset16<Script<'static>>,
}

impl<'a> ReadRecord<'a> for ScriptRecord {
    const RECORD_LEN: usize = Tag::RAW_BYTE_LEN + u16::RAW_BYTE_LEN;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(ScriptRecord {
            script_tag: cursor.read()?,
            script_offset: cursor.read()?,
        })
    }
}

#[derive(Clone, Copy)]
pub struct Script<'a> {
    data: FontData<'a>,
    default_lang_sys_offset: Offset16<LangSys<'static>>,
    lang_sys_records: RecordArray<'a, LangSysRecord>,
}

impl<'a> Script<'a> {
    pub fn default_lang_sys(&self) -> Option<LangSys<'a>> {
        self.data
            .resolve_nullable_offset(self.default_lang_sys_offset)
            .ok()
            .flatten()
    }

    pub fn find_lang_sys(&self, tag: Tag) -> Option<LangSys<'a>> {
        self.lang_sys_records
            .iter()
            .find(|rec| rec.lang_sys_tag == tag)
            .and_then(|rec| self.data.resolve_offset(rec.lang_sys_offset).ok())
            .or_else(|| self.default_lang_sys())
    }
}

impl<'a> FontRead<'a> for Script<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let default_lang_sys_offset = cursor.read()?;
        let lang_sys_count: u16 = cursor.read()?;
        let lang_sys_records = cursor.read_records(lang_sys_count as usize)?;
        Ok(Script {
            data,
            default_lang_sys_offset,
            lang_sys_records,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LangSysRecord {
    pub lang_sys_tag: Tag,
    pub lang_sys_offset: Offset16<LangSys<'static>>,
}

impl<'a> ReadRecord<'a> for LangSysRecord {
    const RECORD_LEN: usize = Tag::RAW_BYTE_LEN + u16::RAW_BYTE_LEN;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(LangSysRecord {
            lang_sys_tag: cursor.read()?,
            lang_sys_offset: cursor.read()?,
        })
    }
}

#[derive(Clone, Copy)]
pub struct LangSys<'a> {
    required_feature_index: u16,
    feature_indices: BeArray<'a, u16>,
}

impl<'a> LangSys<'a> {
    pub const NO_REQUIRED_FEATURE: u16 = 0xFFFF;

    pub fn required_feature_index(&self) -> Option<u16> {
        (self.required_feature_index != Self::NO_REQUIRED_FEATURE)
            .then_some(self.required_feature_index)
    }

    pub fn feature_indices(&self) -> BeArray<'a, u16> {
        self.feature_indices
    }
}

impl<'a> FontRead<'a> for LangSys<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let _lookup_order_offset: u16 = cursor.read()?;
        let required_feature_index = cursor.read()?;
        let feature_index_count: u16 = cursor.read()?;
        let feature_indices = cursor.read_array(feature_index_count as usize)?;
        Ok(LangSys {
            required_feature_index,
            feature_indices,
        })
    }
}

// ---------------------------------------------------------------------
// FeatureList / Feature
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct FeatureList<'a> {
    data: FontData<'a>,
    feature_records: RecordArray<'a, FeatureRecord>,
}

impl<'a> FeatureList<'a> {
    pub fn feature_records(&self) -> RecordArray<'a, FeatureRecord> {
        self.feature_records
    }

    pub fn get(&self, index: u16) -> Option<Feature<'a>> {
        let rec = self.feature_records.get(index as usize)?;
        self.data
            .read_with_args(
                rec.feature_offset.to_usize()..self.data.len(),
                &rec.feature_tag,
            )
            .ok()
    }
}

impl<'a> FontRead<'a> for FeatureList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let feature_count: u16 = cursor.read()?;
        let feature_records = cursor.read_records(feature_count as usize)?;
        Ok(FeatureList {
            data,
            feature_records,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FeatureRecord {
    pub feature_tag: Tag,
    pub feature_offset: Offset16<()>,
}

impl<'a> ReadRecord<'a> for FeatureRecord {
    const RECORD_LEN: usize = Tag::RAW_BYTE_LEN + u16::RAW_BYTE_LEN;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(FeatureRecord {
            feature_tag: cursor.read()?,
            feature_offset: cursor.read()?,
        })
    }
}

#[derive(Clone, Copy)]
pub struct Feature<'a> {
    pub feature_tag: Tag,
    lookup_list_indices: BeArray<'a, u16>,
}

impl<'a> Feature<'a> {
    pub fn lookup_list_indices(&self) -> BeArray<'a, u16> {
        self.lookup_list_indices
    }
}

impl ReadArgs for Feature<'_> {
    type Args = Tag;
}

impl<'a> FontReadWithArgs<'a> for Feature<'a> {
    fn read_with_args(data: FontData<'a>, args: &Tag) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let _feature_params_offset: Offset16<()> = cursor.read()?;
        let lookup_index_count: u16 = cursor.read()?;
        let lookup_list_indices = cursor.read_array(lookup_index_count as usize)?;
        Ok(Feature {
            feature_tag: *args,
            lookup_list_indices,
        })
    }
}

// ---------------------------------------------------------------------
// LookupList / Lookup
// ---------------------------------------------------------------------

/// A `LookupList`, generic over the table stored at each subtable offset:
/// `gsub::SubstitutionLookup` or `gpos::PositionLookup`.
#[derive(Clone, Copy)]
pub struct LookupList<'a, T> {
    data: FontData<'a>,
    lookup_offsets: BeArray<'a, Offset16<T>>,
}

impl<'a, T: FontRead<'a>> LookupList<'a, T> {
    pub fn len(&self) -> usize {
        self.lookup_offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: u16) -> Option<T> {
        let offset = self.lookup_offsets.get(index as usize)?;
        self.data.resolve_offset(offset).ok()
    }
}

impl<'a, T: FontRead<'a>> FontRead<'a> for LookupList<'a, T> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let lookup_count: u16 = cursor.read()?;
        let lookup_offsets = cursor.read_array(lookup_count as usize)?;
        Ok(LookupList {
            data,
            lookup_offsets,
        })
    }
}

/// Lookup flag bits, shared by GSUB and GPOS lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LookupFlag(u16);

impl LookupFlag {
    pub const RIGHT_TO_LEFT: u16 = 0x0001;
    pub const IGNORE_BASE_GLYPHS: u16 = 0x0002;
    pub const IGNORE_LIGATURES: u16 = 0x0004;
    pub const IGNORE_MARKS: u16 = 0x0008;
    pub const USE_MARK_FILTERING_SET: u16 = 0x0010;
    pub const MARK_ATTACHMENT_TYPE_MASK: u16 = 0xFF00;

    pub fn new(bits: u16) -> Self {
        LookupFlag(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn right_to_left(self) -> bool {
        self.0 & Self::RIGHT_TO_LEFT != 0
    }

    pub fn ignore_base_glyphs(self) -> bool {
        self.0 & Self::IGNORE_BASE_GLYPHS != 0
    }

    pub fn ignore_ligatures(self) -> bool {
        self.0 & Self::IGNORE_LIGATURES != 0
    }

    pub fn ignore_marks(self) -> bool {
        self.0 & Self::IGNORE_MARKS != 0
    }

    pub fn use_mark_filtering_set(self) -> bool {
        self.0 & Self::USE_MARK_FILTERING_SET != 0
    }

    pub fn mark_attachment_type(self) -> u16 {
        (self.0 & Self::MARK_ATTACHMENT_TYPE_MASK) >> 8
    }
}

impl Scalar for LookupFlag {
    type Raw = [u8; 2];

    fn from_raw(raw: Self::Raw) -> Self {
        LookupFlag(u16::from_be_bytes(raw))
    }

    fn to_raw(self) -> Self::Raw {
        self.0.to_be_bytes()
    }
}

/// A single `Lookup` table, generic over the subtable type.
#[derive(Clone, Copy)]
pub struct Lookup<'a, T> {
    data: FontData<'a>,
    pub lookup_type: u16,
    pub lookup_flag: LookupFlag,
    subtable_offsets: BeArray<'a, Offset16<T>>,
    mark_filtering_set: Option<u16>,
}

impl<'a, T: FontRead<'a>> Lookup<'a, T> {
    pub fn subtable_count(&self) -> usize {
        self.subtable_offsets.len()
    }

    pub fn subtable(&self, index: usize) -> Option<T> {
        let offset = self.subtable_offsets.get(index)?;
        self.data.resolve_offset(offset).ok()
    }

    pub fn subtables(&self) -> impl Iterator<Item = T> + 'a {
        let data = self.data;
        self.subtable_offsets
            .iter()
            .filter_map(move |off| data.resolve_offset(off).ok())
    }

    pub fn mark_filtering_set(&self) -> Option<u16> {
        self.mark_filtering_set
    }

    /// The bytes the lookup's offsets are relative to. Exposed so that
    /// GSUB/GPOS can re-dispatch a subtable on `lookup_type` themselves,
    /// since that dispatch needs information `T`'s own `FontRead` impl
    /// does not have access to.
    pub fn table_data(&self) -> FontData<'a> {
        self.data
    }

    /// The raw (possibly null) byte offset of subtable `index`, relative to
    /// [`Self::table_data`].
    pub fn raw_subtable_offset(&self, index: usize) -> Option<usize> {
        self.subtable_offsets.get(index)?.non_null()
    }

    pub fn raw_subtable_offsets(&self) -> impl Iterator<Item = usize> + 'a {
        self.subtable_offsets
            .iter()
            .filter_map(|off| off.non_null())
    }
}

impl<'a, T: FontRead<'a>> FontRead<'a> for Lookup<'a, T> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let lookup_type: u16 = cursor.read()?;
        let lookup_flag: LookupFlag = cursor.read()?;
        let sub_table_count: u16 = cursor.read()?;
        let subtable_offsets = cursor.read_array(sub_table_count as usize)?;
        let mark_filtering_set = if lookup_flag.use_mark_filtering_set() {
            Some(cursor.read()?)
        } else {
            None
        };
        Ok(Lookup {
            data,
            lookup_type,
            lookup_flag,
            subtable_offsets,
            mark_filtering_set,
        })
    }
}

// ---------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub enum CoverageTable<'a> {
    Format1(CoverageFormat1<'a>),
    Format2(CoverageFormat2<'a>),
}

impl<'a> CoverageTable<'a> {
    /// Returns the coverage index of `gid`, or `None` if it is not covered.
    pub fn get(&self, gid: GlyphId) -> Option<u16> {
        match self {
            CoverageTable::Format1(t) => t.get(gid),
            CoverageTable::Format2(t) => t.get(gid),
        }
    }

    pub fn contains(&self, gid: GlyphId) -> bool {
        self.get(gid).is_some()
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = GlyphId> + 'a> {
        match self {
            CoverageTable::Format1(t) => Box::new(t.glyph_array.iter()),
            CoverageTable::Format2(t) => Box::new(t.range_records.iter().flat_map(|r| {
                (r.start_glyph_id.to_u16()..=r.end_glyph_id.to_u16()).map(GlyphId::new)
            })),
        }
    }
}

impl<'a> FontRead<'a> for CoverageTable<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => CoverageFormat1::read(data).map(CoverageTable::Format1),
            2 => CoverageFormat2::read(data).map(CoverageTable::Format2),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[derive(Clone, Copy)]
pub struct CoverageFormat1<'a> {
    glyph_array: BeArray<'a, GlyphId>,
}

impl<'a> CoverageFormat1<'a> {
    pub fn get(&self, gid: GlyphId) -> Option<u16> {
        self.glyph_array.binary_search(gid).ok().map(|i| i as u16)
    }
}

impl<'a> FontRead<'a> for CoverageFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let glyph_count: u16 = cursor.read()?;
        let glyph_array = cursor.read_array(glyph_count as usize)?;
        Ok(CoverageFormat1 { glyph_array })
    }
}

#[derive(Clone, Copy)]
pub struct CoverageFormat2<'a> {
    range_records: RecordArray<'a, RangeRecord>,
}

impl<'a> CoverageFormat2<'a> {
    pub fn get(&self, gid: GlyphId) -> Option<u16> {
        for rec in self.range_records.iter() {
            if gid.to_u16() >= rec.start_glyph_id.to_u16() && gid.to_u16() <= rec.end_glyph_id.to_u16() {
                return Some(rec.start_coverage_index + (gid.to_u16() - rec.start_glyph_id.to_u16()));
            }
        }
        None
    }
}

impl<'a> FontRead<'a> for CoverageFormat2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 2 {
            return Err(ReadError::InvalidFormat(format));
        }
        let range_count: u16 = cursor.read()?;
        let range_records = cursor.read_records(range_count as usize)?;
        Ok(CoverageFormat2 { range_records })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RangeRecord {
    pub start_glyph_id: GlyphId,
    pub end_glyph_id: GlyphId,
    pub start_coverage_index: u16,
}

impl<'a> ReadRecord<'a> for RangeRecord {
    const RECORD_LEN: usize = 6;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(RangeRecord {
            start_glyph_id: cursor.read()?,
            end_glyph_id: cursor.read()?,
            start_coverage_index: cursor.read()?,
        })
    }
}

// ---------------------------------------------------------------------
// ClassDef
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub enum ClassDef<'a> {
    Format1(ClassDefFormat1<'a>),
    Format2(ClassDefFormat2<'a>),
}

impl<'a> ClassDef<'a> {
    /// Glyphs not covered by any explicit entry belong to class 0.
    pub fn get(&self, gid: GlyphId) -> u16 {
        match self {
            ClassDef::Format1(t) => t.get(gid),
            ClassDef::Format2(t) => t.get(gid),
        }
    }
}

impl<'a> FontRead<'a> for ClassDef<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => ClassDefFormat1::read(data).map(ClassDef::Format1),
            2 => ClassDefFormat2::read(data).map(ClassDef::Format2),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[derive(Clone, Copy)]
pub struct ClassDefFormat1<'a> {
    start_glyph_id: GlyphId,
    class_value_array: BeArray<'a, u16>,
}

impl<'a> ClassDefFormat1<'a> {
    pub fn get(&self, gid: GlyphId) -> u16 {
        let start = self.start_glyph_id.to_u16();
        if gid.to_u16() < start {
            return 0;
        }
        self.class_value_array
            .get((gid.to_u16() - start) as usize)
            .unwrap_or(0)
    }
}

impl<'a> FontRead<'a> for ClassDefFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let start_glyph_id = cursor.read()?;
        let glyph_count: u16 = cursor.read()?;
        let class_value_array = cursor.read_array(glyph_count as usize)?;
        Ok(ClassDefFormat1 {
            start_glyph_id,
            class_value_array,
        })
    }
}

#[derive(Clone, Copy)]
pub struct ClassDefFormat2<'a> {
    class_range_records: RecordArray<'a, ClassRangeRecord>,
}

impl<'a> ClassDefFormat2<'a> {
    pub fn get(&self, gid: GlyphId) -> u16 {
        for rec in self.class_range_records.iter() {
            if gid.to_u16() >= rec.start_glyph_id.to_u16() && gid.to_u16() <= rec.end_glyph_id.to_u16() {
                return rec.class;
            }
        }
        0
    }
}

impl<'a> FontRead<'a> for ClassDefFormat2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 2 {
            return Err(ReadError::InvalidFormat(format));
        }
        let class_range_count: u16 = cursor.read()?;
        let class_range_records = cursor.read_records(class_range_count as usize)?;
        Ok(ClassDefFormat2 { class_range_records })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ClassRangeRecord {
    pub start_glyph_id: GlyphId,
    pub end_glyph_id: GlyphId,
    pub class: u16,
}

impl<'a> ReadRecord<'a> for ClassRangeRecord {
    const RECORD_LEN: usize = 6;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(ClassRangeRecord {
            start_glyph_id: cursor.read()?,
            end_glyph_id: cursor.read()?,
            class: cursor.read()?,
        })
    }
}

// ---------------------------------------------------------------------
// Sequence context (format 1/2/3) and chained sequence context
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
pub struct SequenceLookupRecord {
    pub sequence_index: u16,
    pub lookup_list_index: u16,
}

impl<'a> ReadRecord<'a> for SequenceLookupRecord {
    const RECORD_LEN: usize = 4;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(SequenceLookupRecord {
            sequence_index: cursor.read()?,
            lookup_list_index: cursor.read()?,
        })
    }
}

#[derive(Clone, Copy)]
pub enum SequenceContext<'a> {
    Format1(SequenceContextFormat1<'a>),
    Format2(SequenceContextFormat2<'a>),
    Format3(SequenceContextFormat3<'a>),
}

impl<'a> FontRead<'a> for SequenceContext<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => SequenceContextFormat1::read(data).map(SequenceContext::Format1),
            2 => SequenceContextFormat2::read(data).map(SequenceContext::Format2),
            3 => SequenceContextFormat3::read(data).map(SequenceContext::Format3),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[derive(Clone, Copy)]
pub struct SequenceContextFormat1<'a> {
    data: FontData<'a>,
    pub coverage_offset: Offset16<CoverageTable<'static>>,
    seq_rule_set_offsets: BeArray<'a, Offset16<SequenceRuleSet<'static>>>,
}

impl<'a> SequenceContextFormat1<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn rule_set(&self, coverage_index: u16) -> Option<SequenceRuleSet<'a>> {
        let offset = self.seq_rule_set_offsets.get(coverage_index as usize)?;
        self.data.resolve_nullable_offset(offset).ok().flatten()
    }
}

impl<'a> FontRead<'a> for SequenceContextFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let seq_rule_set_count: u16 = cursor.read()?;
        let seq_rule_set_offsets = cursor.read_array(seq_rule_set_count as usize)?;
        Ok(SequenceContextFormat1 {
            data,
            coverage_offset,
            seq_rule_set_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct SequenceRuleSet<'a> {
    data: FontData<'a>,
    seq_rule_offsets: BeArray<'a, Offset16<SequenceRule<'static>>>,
}

impl<'a> SequenceRuleSet<'a> {
    pub fn rules(&self) -> impl Iterator<Item = SequenceRule<'a>> + 'a {
        let data = self.data;
        self.seq_rule_offsets
            .iter()
            .filter_map(move |off| data.resolve_offset(off).ok())
    }
}

impl<'a> FontRead<'a> for SequenceRuleSet<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let seq_rule_count: u16 = cursor.read()?;
        let seq_rule_offsets = cursor.read_array(seq_rule_count as usize)?;
        Ok(SequenceRuleSet {
            data,
            seq_rule_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct SequenceRule<'a> {
    input_sequence: BeArray<'a, GlyphId>,
    seq_lookup_records: RecordArray<'a, SequenceLookupRecord>,
}

impl<'a> SequenceRule<'a> {
    /// Input glyphs from the *second* position onward (the first glyph was
    /// already confirmed by the rule set's coverage index).
    pub fn input_sequence(&self) -> BeArray<'a, GlyphId> {
        self.input_sequence
    }

    pub fn lookup_records(&self) -> RecordArray<'a, SequenceLookupRecord> {
        self.seq_lookup_records
    }
}

impl<'a> FontRead<'a> for SequenceRule<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let glyph_count: u16 = cursor.read()?;
        let seq_lookup_count: u16 = cursor.read()?;
        let input_len = (glyph_count as usize).saturating_sub(1);
        let input_sequence = cursor.read_array(input_len)?;
        let seq_lookup_records = cursor.read_records(seq_lookup_count as usize)?;
        Ok(SequenceRule {
            input_sequence,
            seq_lookup_records,
        })
    }
}

#[derive(Clone, Copy)]
pub struct SequenceContextFormat2<'a> {
    data: FontData<'a>,
    pub coverage_offset: Offset16<CoverageTable<'static>>,
    pub class_def_offset: Offset16<ClassDef<'static>>,
    class_seq_rule_set_offsets: BeArray<'a, Offset16<ClassSequenceRuleSet<'static>>>,
}

impl<'a> SequenceContextFormat2<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn class_def(&self) -> Option<ClassDef<'a>> {
        self.data.resolve_offset(self.class_def_offset).ok()
    }

    pub fn rule_set(&self, class: u16) -> Option<ClassSequenceRuleSet<'a>> {
        let offset = self.class_seq_rule_set_offsets.get(class as usize)?;
        self.data.resolve_nullable_offset(offset).ok().flatten()
    }
}

impl<'a> FontRead<'a> for SequenceContextFormat2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 2 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let class_def_offset = cursor.read()?;
        let class_seq_rule_set_count: u16 = cursor.read()?;
        let class_seq_rule_set_offsets = cursor.read_array(class_seq_rule_set_count as usize)?;
        Ok(SequenceContextFormat2 {
            data,
            coverage_offset,
            class_def_offset,
            class_seq_rule_set_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct ClassSequenceRuleSet<'a> {
    data: FontData<'a>,
    class_seq_rule_offsets: BeArray<'a, Offset16<ClassSequenceRule<'static>>>,
}

impl<'a> ClassSequenceRuleSet<'a> {
    pub fn rules(&self) -> impl Iterator<Item = ClassSequenceRule<'a>> + 'a {
        let data = self.data;
        self.class_seq_rule_offsets
            .iter()
            .filter_map(move |off| data.resolve_offset(off).ok())
    }
}

impl<'a> FontRead<'a> for ClassSequenceRuleSet<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let class_seq_rule_count: u16 = cursor.read()?;
        let class_seq_rule_offsets = cursor.read_array(class_seq_rule_count as usize)?;
        Ok(ClassSequenceRuleSet {
            data,
            class_seq_rule_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct ClassSequenceRule<'a> {
    input_sequence: BeArray<'a, u16>,
    seq_lookup_records: RecordArray<'a, SequenceLookupRecord>,
}

impl<'a> ClassSequenceRule<'a> {
    pub fn input_sequence(&self) -> BeArray<'a, u16> {
        self.input_sequence
    }

    pub fn lookup_records(&self) -> RecordArray<'a, SequenceLookupRecord> {
        self.seq_lookup_records
    }
}

impl<'a> FontRead<'a> for ClassSequenceRule<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let glyph_count: u16 = cursor.read()?;
        let seq_lookup_count: u16 = cursor.read()?;
        let input_len = (glyph_count as usize).saturating_sub(1);
        let input_sequence = cursor.read_array(input_len)?;
        let seq_lookup_records = cursor.read_records(seq_lookup_count as usize)?;
        Ok(ClassSequenceRule {
            input_sequence,
            seq_lookup_records,
        })
    }
}

#[derive(Clone, Copy)]
pub struct SequenceContextFormat3<'a> {
    data: FontData<'a>,
    coverage_offsets: BeArray<'a, Offset16<CoverageTable<'static>>>,
    seq_lookup_records: RecordArray<'a, SequenceLookupRecord>,
}

impl<'a> SequenceContextFormat3<'a> {
    pub fn glyph_count(&self) -> usize {
        self.coverage_offsets.len()
    }

    pub fn coverage(&self, index: usize) -> Option<CoverageTable<'a>> {
        let offset = self.coverage_offsets.get(index)?;
        self.data.resolve_offset(offset).ok()
    }

    pub fn lookup_records(&self) -> RecordArray<'a, SequenceLookupRecord> {
        self.seq_lookup_records
    }
}

impl<'a> FontRead<'a> for SequenceContextFormat3<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 3 {
            return Err(ReadError::InvalidFormat(format));
        }
        let glyph_count: u16 = cursor.read()?;
        let seq_lookup_count: u16 = cursor.read()?;
        let coverage_offsets = cursor.read_array(glyph_count as usize)?;
        let seq_lookup_records = cursor.read_records(seq_lookup_count as usize)?;
        Ok(SequenceContextFormat3 {
            data,
            coverage_offsets,
            seq_lookup_records,
        })
    }
}

#[derive(Clone, Copy)]
pub enum ChainedSequenceContext<'a> {
    Format1(ChainedSequenceContextFormat1<'a>),
    Format2(ChainedSequenceContextFormat2<'a>),
    Format3(ChainedSequenceContextFormat3<'a>),
}

impl<'a> FontRead<'a> for ChainedSequenceContext<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => ChainedSequenceContextFormat1::read(data).map(ChainedSequenceContext::Format1),
            2 => ChainedSequenceContextFormat2::read(data).map(ChainedSequenceContext::Format2),
            3 => ChainedSequenceContextFormat3::read(data).map(ChainedSequenceContext::Format3),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[derive(Clone, Copy)]
pub struct ChainedSequenceContextFormat1<'a> {
    data: FontData<'a>,
    pub coverage_offset: Offset16<CoverageTable<'static>>,
    chained_seq_rule_set_offsets: BeArray<'a, Offset16<ChainedSequenceRuleSet<'static>>>,
}

impl<'a> ChainedSequenceContextFormat1<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn rule_set(&self, coverage_index: u16) -> Option<ChainedSequenceRuleSet<'a>> {
        let offset = self
            .chained_seq_rule_set_offsets
            .get(coverage_index as usize)?;
        self.data.resolve_nullable_offset(offset).ok().flatten()
    }
}

impl<'a> FontRead<'a> for ChainedSequenceContextFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let count: u16 = cursor.read()?;
        let chained_seq_rule_set_offsets = cursor.read_array(count as usize)?;
        Ok(ChainedSequenceContextFormat1 {
            data,
            coverage_offset,
            chained_seq_rule_set_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct ChainedSequenceRuleSet<'a> {
    data: FontData<'a>,
    chained_seq_rule_offsets: BeArray<'a, Offset16<ChainedSequenceRule<'static>>>,
}

impl<'a> ChainedSequenceRuleSet<'a> {
    pub fn rules(&self) -> impl Iterator<Item = ChainedSequenceRule<'a>> + 'a {
        let data = self.data;
        self.chained_seq_rule_offsets
            .iter()
            .filter_map(move |off| data.resolve_offset(off).ok())
    }
}

impl<'a> FontRead<'a> for ChainedSequenceRuleSet<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let count: u16 = cursor.read()?;
        let chained_seq_rule_offsets = cursor.read_array(count as usize)?;
        Ok(ChainedSequenceRuleSet {
            data,
            chained_seq_rule_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct ChainedSequenceRule<'a> {
    backtrack_sequence: BeArray<'a, GlyphId>,
    input_sequence: BeArray<'a, GlyphId>,
    lookahead_sequence: BeArray<'a, GlyphId>,
    seq_lookup_records: RecordArray<'a, SequenceLookupRecord>,
}

impl<'a> ChainedSequenceRule<'a> {
    pub fn backtrack_sequence(&self) -> BeArray<'a, GlyphId> {
        self.backtrack_sequence
    }

    pub fn input_sequence(&self) -> BeArray<'a, GlyphId> {
        self.input_sequence
    }

    pub fn lookahead_sequence(&self) -> BeArray<'a, GlyphId> {
        self.lookahead_sequence
    }

    pub fn lookup_records(&self) -> RecordArray<'a, SequenceLookupRecord> {
        self.seq_lookup_records
    }
}

impl<'a> FontRead<'a> for ChainedSequenceRule<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let backtrack_glyph_count: u16 = cursor.read()?;
        let backtrack_sequence = cursor.read_array(backtrack_glyph_count as usize)?;
        let input_glyph_count: u16 = cursor.read()?;
        let input_len = (input_glyph_count as usize).saturating_sub(1);
        let input_sequence = cursor.read_array(input_len)?;
        let lookahead_glyph_count: u16 = cursor.read()?;
        let lookahead_sequence = cursor.read_array(lookahead_glyph_count as usize)?;
        let seq_lookup_count: u16 = cursor.read()?;
        let seq_lookup_records = cursor.read_records(seq_lookup_count as usize)?;
        Ok(ChainedSequenceRule {
            backtrack_sequence,
            input_sequence,
            lookahead_sequence,
            seq_lookup_records,
        })
    }
}

#[derive(Clone, Copy)]
pub struct ChainedSequenceContextFormat2<'a> {
    data: FontData<'a>,
    pub coverage_offset: Offset16<CoverageTable<'static>>,
    pub backtrack_class_def_offset: Offset16<ClassDef<'static>>,
    pub input_class_def_offset: Offset16<ClassDef<'static>>,
    pub lookahead_class_def_offset: Offset16<ClassDef<'static>>,
    chained_class_seq_rule_set_offsets: BeArray<'a, Offset16<ChainedClassSequenceRuleSet<'static>>>,
}

impl<'a> ChainedSequenceContextFormat2<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn backtrack_class_def(&self) -> Option<ClassDef<'a>> {
        self.data.resolve_offset(self.backtrack_class_def_offset).ok()
    }

    pub fn input_class_def(&self) -> Option<ClassDef<'a>> {
        self.data.resolve_offset(self.input_class_def_offset).ok()
    }

    pub fn lookahead_class_def(&self) -> Option<ClassDef<'a>> {
        self.data.resolve_offset(self.lookahead_class_def_offset).ok()
    }

    pub fn rule_set(&self, class: u16) -> Option<ChainedClassSequenceRuleSet<'a>> {
        let offset = self
            .chained_class_seq_rule_set_offsets
            .get(class as usize)?;
        self.data.resolve_nullable_offset(offset).ok().flatten()
    }
}

impl<'a> FontRead<'a> for ChainedSequenceContextFormat2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 2 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let backtrack_class_def_offset = cursor.read()?;
        let input_class_def_offset = cursor.read()?;
        let lookahead_class_def_offset = cursor.read()?;
        let count: u16 = cursor.read()?;
        let chained_class_seq_rule_set_offsets = cursor.read_array(count as usize)?;
        Ok(ChainedSequenceContextFormat2 {
            data,
            coverage_offset,
            backtrack_class_def_offset,
            input_class_def_offset,
            lookahead_class_def_offset,
            chained_class_seq_rule_set_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct ChainedClassSequenceRuleSet<'a> {
    data: FontData<'a>,
    chained_class_seq_rule_offsets: BeArray<'a, Offset16<ChainedClassSequenceRule<'static>>>,
}

impl<'a> ChainedClassSequenceRuleSet<'a> {
    pub fn rules(&self) -> impl Iterator<Item = ChainedClassSequenceRule<'a>> + 'a {
        let data = self.data;
        self.chained_class_seq_rule_offsets
            .iter()
            .filter_map(move |off| data.resolve_offset(off).ok())
    }
}

impl<'a> FontRead<'a> for ChainedClassSequenceRuleSet<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let count: u16 = cursor.read()?;
        let chained_class_seq_rule_offsets = cursor.read_array(count as usize)?;
        Ok(ChainedClassSequenceRuleSet {
            data,
            chained_class_seq_rule_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct ChainedClassSequenceRule<'a> {
    backtrack_sequence: BeArray<'a, u16>,
    input_sequence: BeArray<'a, u16>,
    lookahead_sequence: BeArray<'a, u16>,
    seq_lookup_records: RecordArray<'a, SequenceLookupRecord>,
}

impl<'a> ChainedClassSequenceRule<'a> {
    pub fn backtrack_sequence(&self) -> BeArray<'a, u16> {
        self.backtrack_sequence
    }

    pub fn input_sequence(&self) -> BeArray<'a, u16> {
        self.input_sequence
    }

    pub fn lookahead_sequence(&self) -> BeArray<'a, u16> {
        self.lookahead_sequence
    }

    pub fn lookup_records(&self) -> RecordArray<'a, SequenceLookupRecord> {
        self.seq_lookup_records
    }
}

impl<'a> FontRead<'a> for ChainedClassSequenceRule<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let backtrack_glyph_count: u16 = cursor.read()?;
        let backtrack_sequence = cursor.read_array(backtrack_glyph_count as usize)?;
        let input_glyph_count: u16 = cursor.read()?;
        let input_len = (input_glyph_count as usize).saturating_sub(1);
        let input_sequence = cursor.read_array(input_len)?;
        let lookahead_glyph_count: u16 = cursor.read()?;
        let lookahead_sequence = cursor.read_array(lookahead_glyph_count as usize)?;
        let seq_lookup_count: u16 = cursor.read()?;
        let seq_lookup_records = cursor.read_records(seq_lookup_count as usize)?;
        Ok(ChainedClassSequenceRule {
            backtrack_sequence,
            input_sequence,
            lookahead_sequence,
            seq_lookup_records,
        })
    }
}

#[derive(Clone, Copy)]
pub struct ChainedSequenceContextFormat3<'a> {
    data: FontData<'a>,
    backtrack_coverage_offsets: BeArray<'a, Offset16<CoverageTable<'static>>>,
    input_coverage_offsets: BeArray<'a, Offset16<CoverageTable<'static>>>,
    lookahead_coverage_offsets: BeArray<'a, Offset16<CoverageTable<'static>>>,
    seq_lookup_records: RecordArray<'a, SequenceLookupRecord>,
}

impl<'a> ChainedSequenceContextFormat3<'a> {
    pub fn backtrack_count(&self) -> usize {
        self.backtrack_coverage_offsets.len()
    }

    pub fn input_count(&self) -> usize {
        self.input_coverage_offsets.len()
    }

    pub fn lookahead_count(&self) -> usize {
        self.lookahead_coverage_offsets.len()
    }

    pub fn backtrack_coverage(&self, index: usize) -> Option<CoverageTable<'a>> {
        let offset = self.backtrack_coverage_offsets.get(index)?;
        self.data.resolve_offset(offset).ok()
    }

    pub fn input_coverage(&self, index: usize) -> Option<CoverageTable<'a>> {
        let offset = self.input_coverage_offsets.get(index)?;
        self.data.resolve_offset(offset).ok()
    }

    pub fn lookahead_coverage(&self, index: usize) -> Option<CoverageTable<'a>> {
        let offset = self.lookahead_coverage_offsets.get(index)?;
        self.data.resolve_offset(offset).ok()
    }

    pub fn lookup_records(&self) -> RecordArray<'a, SequenceLookupRecord> {
        self.seq_lookup_records
    }
}

impl<'a> FontRead<'a> for ChainedSequenceContextFormat3<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 3 {
            return Err(ReadError::InvalidFormat(format));
        }
        let backtrack_glyph_count: u16 = cursor.read()?;
        let backtrack_coverage_offsets = cursor.read_array(backtrack_glyph_count as usize)?;
        let input_glyph_count: u16 = cursor.read()?;
        let input_coverage_offsets = cursor.read_array(input_glyph_count as usize)?;
        let lookahead_glyph_count: u16 = cursor.read()?;
        let lookahead_coverage_offsets = cursor.read_array(lookahead_glyph_count as usize)?;
        let seq_lookup_count: u16 = cursor.read()?;
        let seq_lookup_records = cursor.read_records(seq_lookup_count as usize)?;
        Ok(ChainedSequenceContextFormat3 {
            data,
            backtrack_coverage_offsets,
            input_coverage_offsets,
            lookahead_coverage_offsets,
            seq_lookup_records,
        })
    }
}

// ---------------------------------------------------------------------
// Device table (static hinting deltas; no variable-font interpolation)
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct Device<'a> {
    pub start_size: u16,
    pub end_size: u16,
    pub delta_format: u16,
    delta_value: BeArray<'a, u16>,
}

impl<'a> Device<'a> {
    /// Looks up the hinting delta for `ppem`, or `0` if out of range or the
    /// format is a variable-font `VariationIndex` table (not evaluated here).
    pub fn delta_for_ppem(&self, ppem: u16) -> i32 {
        if ppem < self.start_size || ppem > self.end_size {
            return 0;
        }
        let (bits_per_value, values_per_word) = match self.delta_format {
            1 => (2u16, 8u16),
            2 => (4, 4),
            3 => (8, 2),
            _ => return 0,
        };
        let index = ppem - self.start_size;
        let word_index = (index / values_per_word) as usize;
        let Some(word) = self.delta_value.get(word_index) else {
            return 0;
        };
        let shift = 16 - (bits_per_value * ((index % values_per_word) + 1));
        let mask = (1u16 << bits_per_value) - 1;
        let raw = (word >> shift) & mask;
        let sign_bit = 1u16 << (bits_per_value - 1);
        if raw & sign_bit != 0 {
            (raw as i32) - ((mask as i32) + 1)
        } else {
            raw as i32
        }
    }
}

impl<'a> FontRead<'a> for Device<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let start_size: u16 = cursor.read()?;
        let end_size: u16 = cursor.read()?;
        let delta_format: u16 = cursor.read()?;
        let count = match delta_format {
            1 => ((end_size - start_size + 1) as usize + 7) / 8,
            2 => ((end_size - start_size + 1) as usize + 3) / 4,
            3 => ((end_size - start_size + 1) as usize + 1) / 2,
            _ => 0,
        };
        let delta_value = cursor.read_array(count)?;
        Ok(Device {
            start_size,
            end_size,
            delta_format,
            delta_value,
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
    fn coverage_format1_binary_searches_sorted_glyphs() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 1); // format
        push_u16(&mut buf, 3); // glyphCount
        push_u16(&mut buf, 0x10);
        push_u16(&mut buf, 0x20);
        push_u16(&mut buf, 0x30);
        let cov = CoverageTable::read(FontData::new(&buf)).unwrap();
        assert_eq!(cov.get(GlyphId::new(0x10)), Some(0));
        assert_eq!(cov.get(GlyphId::new(0x20)), Some(1));
        assert_eq!(cov.get(GlyphId::new(0x30)), Some(2));
        assert_eq!(cov.get(GlyphId::new(0x25)), None);
    }

    #[test]
    fn coverage_format2_range_lookup() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 2); // format
        push_u16(&mut buf, 1); // rangeCount
        push_u16(&mut buf, 0x40); // startGlyphId
        push_u16(&mut buf, 0x45); // endGlyphId
        push_u16(&mut buf, 0); // startCoverageIndex
        let cov = CoverageTable::read(FontData::new(&buf)).unwrap();
        assert_eq!(cov.get(GlyphId::new(0x40)), Some(0));
        assert_eq!(cov.get(GlyphId::new(0x43)), Some(3));
        assert_eq!(cov.get(GlyphId::new(0x45)), Some(5));
        assert_eq!(cov.get(GlyphId::new(0x46)), None);
    }

    #[test]
    fn class_def_format1_falls_back_to_class_zero_outside_array() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 1); // format
        push_u16(&mut buf, 0x10); // startGlyphId
        push_u16(&mut buf, 2); // glyphCount
        push_u16(&mut buf, 1); // class for 0x10
        push_u16(&mut buf, 2); // class for 0x11
        let class_def = ClassDef::read(FontData::new(&buf)).unwrap();
        assert_eq!(class_def.get(GlyphId::new(0x10)), 1);
        assert_eq!(class_def.get(GlyphId::new(0x11)), 2);
        assert_eq!(class_def.get(GlyphId::new(0x0F)), 0);
        assert_eq!(class_def.get(GlyphId::new(0x12)), 0);
    }

    #[test]
    fn class_def_format2_matches_containing_range() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 2); // format
        push_u16(&mut buf, 1); // classRangeCount
        push_u16(&mut buf, 0x50); // startGlyphId
        push_u16(&mut buf, 0x5F); // endGlyphId
        push_u16(&mut buf, 4); // class
        let class_def = ClassDef::read(FontData::new(&buf)).unwrap();
        assert_eq!(class_def.get(GlyphId::new(0x55)), 4);
        assert_eq!(class_def.get(GlyphId::new(0x60)), 0);
    }

    #[test]
    fn device_table_resolves_format1_two_bit_deltas() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 10); // startSize
        push_u16(&mut buf, 12); // endSize
        push_u16(&mut buf, 1); // deltaFormat (2-bit values, 8 per word)
        // Packed 2-bit deltas, MSB-first: ppem10=01 (1), ppem11=10 (-2),
        // ppem12=11 (-1), remaining unused slots zeroed.
        push_u16(&mut buf, 0x6C00);
        let device = Device::read(FontData::new(&buf)).unwrap();
        assert_eq!(device.delta_for_ppem(9), 0);
        assert_eq!(device.delta_for_ppem(13), 0);
        assert_eq!(device.delta_for_ppem(10), 1);
        assert_eq!(device.delta_for_ppem(11), -2);
        assert_eq!(device.delta_for_ppem(12), -1);
    }

    #[test]
    fn sequence_context_format1_resolves_rule_set_by_coverage_index() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 1); // format
        push_u16(&mut buf, 8); // coverageOffset
        push_u16(&mut buf, 1); // seqRuleSetCount
        push_u16(&mut buf, 14); // seqRuleSetOffsets[0]
        push_u16(&mut buf, 1); // coverage format
        push_u16(&mut buf, 1); // coverage glyphCount
        push_u16(&mut buf, 0x10); // coverage glyph
        push_u16(&mut buf, 1); // ruleSet seqRuleCount
        push_u16(&mut buf, 4); // ruleSet seqRuleOffsets[0], relative to ruleSet start
        push_u16(&mut buf, 2); // rule glyphCount (total input glyphs)
        push_u16(&mut buf, 1); // rule seqLookupCount
        push_u16(&mut buf, 0x11); // rule inputSequence[0]
        push_u16(&mut buf, 0); // lookupRecord.sequenceIndex
        push_u16(&mut buf, 5); // lookupRecord.lookupListIndex

        let ctx = SequenceContextFormat1::read(FontData::new(&buf)).unwrap();
        let coverage = ctx.coverage().unwrap();
        let index = coverage.get(GlyphId::new(0x10)).unwrap();
        let rule_set = ctx.rule_set(index).unwrap();
        let rules: Vec<_> = rule_set.rules().collect();
        assert_eq!(rules.len(), 1);
        let input: Vec<_> = rules[0].input_sequence().iter().collect();
        assert_eq!(input, vec![GlyphId::new(0x11)]);
        let records: Vec<_> = rules[0].lookup_records().iter().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence_index, 0);
        assert_eq!(records[0].lookup_list_index, 5);
    }
}
