//! The `GPOS` table: glyph positioning lookups (single, pair, cursive,
//! mark-to-base, mark-to-ligature, mark-to-mark, context, chaining
//! context, extension).

use font_types::{GlyphId, MajorMinor, Offset16, Offset32, Tag};

use crate::array::{BeArray, ReadRecord, RecordArray};
use crate::font_data::FontData;
use crate::read::{ComputeSize, FontRead, FontReadWithArgs, ReadArgs, ReadError};
use crate::tables::layout::{
    ChainedSequenceContext, CoverageTable, Device, FeatureList, Lookup, LookupList, ScriptList,
    SequenceContext,
};

pub const TAG: Tag = Tag::new(b"GPOS");

#[derive(Clone, Copy)]
pub struct Gpos<'a> {
    data: FontData<'a>,
    pub version: MajorMinor,
    script_list_offset: Offset16<ScriptList<'static>>,
    feature_list_offset: Offset16<FeatureList<'static>>,
    lookup_list_offset: Offset16<LookupList<'static, Lookup<'static, PositionLookup<'static>>>>,
}

impl<'a> Gpos<'a> {
    pub fn script_list(&self) -> Option<ScriptList<'a>> {
        self.data.resolve_offset(self.script_list_offset).ok()
    }

    pub fn feature_list(&self) -> Option<FeatureList<'a>> {
        self.data.resolve_offset(self.feature_list_offset).ok()
    }

    pub fn lookup_list(&self) -> Option<LookupList<'a, Lookup<'a, PositionLookup<'a>>>> {
        self.data.resolve_offset(self.lookup_list_offset).ok()
    }
}

impl<'a> FontRead<'a> for Gpos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: MajorMinor = cursor.read()?;
        let script_list_offset = cursor.read()?;
        let feature_list_offset = cursor.read()?;
        let lookup_list_offset = cursor.read()?;
        Ok(Gpos {
            data,
            version,
            script_list_offset,
            feature_list_offset,
            lookup_list_offset,
        })
    }
}

// ---------------------------------------------------------------------
// ValueFormat / ValueRecord
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ValueFormat(u16);

impl ValueFormat {
    pub const X_PLACEMENT: u16 = 0x0001;
    pub const Y_PLACEMENT: u16 = 0x0002;
    pub const X_ADVANCE: u16 = 0x0004;
    pub const Y_ADVANCE: u16 = 0x0008;
    pub const X_PLACEMENT_DEVICE: u16 = 0x0010;
    pub const Y_PLACEMENT_DEVICE: u16 = 0x0020;
    pub const X_ADVANCE_DEVICE: u16 = 0x0040;
    pub const Y_ADVANCE_DEVICE: u16 = 0x0080;

    pub fn bits(self) -> u16 {
        self.0
    }

    fn has(self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    /// The number of 16-bit fields a `ValueRecord` in this format occupies.
    pub fn record_len_bytes(self) -> usize {
        self.0.count_ones() as usize * 2
    }
}

impl font_types::Scalar for ValueFormat {
    type Raw = [u8; 2];

    fn from_raw(raw: Self::Raw) -> Self {
        ValueFormat(u16::from_be_bytes(raw))
    }

    fn to_raw(self) -> Self::Raw {
        self.0.to_be_bytes()
    }
}

/// A positioning adjustment. Device-table (non-variable hinting) offsets
/// are resolved lazily via [`Self::x_placement_device`] and friends rather
/// than eagerly, since most records omit them.
#[derive(Clone, Copy)]
pub struct ValueRecord<'a> {
    data: Option<FontData<'a>>,
    format: ValueFormat,
    pub x_placement: i16,
    pub y_placement: i16,
    pub x_advance: i16,
    pub y_advance: i16,
    x_placement_device_offset: Offset16<Device<'static>>,
    y_placement_device_offset: Offset16<Device<'static>>,
    x_advance_device_offset: Offset16<Device<'static>>,
    y_advance_device_offset: Offset16<Device<'static>>,
}

impl<'a> Default for ValueRecord<'a> {
    fn default() -> Self {
        ValueRecord {
            data: None,
            format: ValueFormat::default(),
            x_placement: 0,
            y_placement: 0,
            x_advance: 0,
            y_advance: 0,
            x_placement_device_offset: Offset16::new(0),
            y_placement_device_offset: Offset16::new(0),
            x_advance_device_offset: Offset16::new(0),
            y_advance_device_offset: Offset16::new(0),
        }
    }
}

impl<'a> ValueRecord<'a> {
    fn device(&self, offset: Offset16<Device<'static>>) -> Option<Device<'a>> {
        self.data?.resolve_nullable_offset(offset).ok().flatten()
    }

    pub fn x_placement_device(&self) -> Option<Device<'a>> {
        self.device(self.x_placement_device_offset)
    }

    pub fn y_placement_device(&self) -> Option<Device<'a>> {
        self.device(self.y_placement_device_offset)
    }

    pub fn x_advance_device(&self) -> Option<Device<'a>> {
        self.device(self.x_advance_device_offset)
    }

    pub fn y_advance_device(&self) -> Option<Device<'a>> {
        self.device(self.y_advance_device_offset)
    }
}

impl ReadArgs for ValueRecord<'_> {
    type Args = ValueFormat;
}

impl ComputeSize for ValueRecord<'_> {
    fn compute_size(args: &ValueFormat) -> usize {
        args.record_len_bytes()
    }
}

impl<'a> FontReadWithArgs<'a> for ValueRecord<'a> {
    fn read_with_args(data: FontData<'a>, args: &ValueFormat) -> Result<Self, ReadError> {
        let format = *args;
        let mut cursor = data.cursor();
        let mut record = ValueRecord {
            data: Some(data),
            format,
            ..Default::default()
        };
        if format.has(ValueFormat::X_PLACEMENT) {
            record.x_placement = cursor.read()?;
        }
        if format.has(ValueFormat::Y_PLACEMENT) {
            record.y_placement = cursor.read()?;
        }
        if format.has(ValueFormat::X_ADVANCE) {
            record.x_advance = cursor.read()?;
        }
        if format.has(ValueFormat::Y_ADVANCE) {
            record.y_advance = cursor.read()?;
        }
        if format.has(ValueFormat::X_PLACEMENT_DEVICE) {
            record.x_placement_device_offset = cursor.read()?;
        }
        if format.has(ValueFormat::Y_PLACEMENT_DEVICE) {
            record.y_placement_device_offset = cursor.read()?;
        }
        if format.has(ValueFormat::X_ADVANCE_DEVICE) {
            record.x_advance_device_offset = cursor.read()?;
        }
        if format.has(ValueFormat::Y_ADVANCE_DEVICE) {
            record.y_advance_device_offset = cursor.read()?;
        }
        Ok(record)
    }
}

impl<'a> crate::array::ReadRecordWithArgs<'a> for ValueRecord<'a> {
    fn compute_len(args: &ValueFormat) -> usize {
        args.record_len_bytes()
    }

    fn read_record_with_args(data: FontData<'a>, args: &ValueFormat) -> Result<Self, ReadError> {
        Self::read_with_args(data, args)
    }
}

// ---------------------------------------------------------------------
// Anchor tables
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub enum AnchorTable<'a> {
    Format1 {
        x_coordinate: i16,
        y_coordinate: i16,
    },
    Format2 {
        x_coordinate: i16,
        y_coordinate: i16,
        anchor_point: u16,
    },
    Format3 {
        x_coordinate: i16,
        y_coordinate: i16,
        x_device: Option<Device<'a>>,
        y_device: Option<Device<'a>>,
    },
}

impl<'a> AnchorTable<'a> {
    pub fn coordinates(&self) -> (i16, i16) {
        match *self {
            AnchorTable::Format1 {
                x_coordinate,
                y_coordinate,
            } => (x_coordinate, y_coordinate),
            AnchorTable::Format2 {
                x_coordinate,
                y_coordinate,
                ..
            } => (x_coordinate, y_coordinate),
            AnchorTable::Format3 {
                x_coordinate,
                y_coordinate,
                ..
            } => (x_coordinate, y_coordinate),
        }
    }
}

impl<'a> FontRead<'a> for AnchorTable<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        match format {
            1 => Ok(AnchorTable::Format1 {
                x_coordinate: cursor.read()?,
                y_coordinate: cursor.read()?,
            }),
            2 => Ok(AnchorTable::Format2 {
                x_coordinate: cursor.read()?,
                y_coordinate: cursor.read()?,
                anchor_point: cursor.read()?,
            }),
            3 => {
                let x_coordinate = cursor.read()?;
                let y_coordinate = cursor.read()?;
                let x_device_offset: Offset16<Device<'static>> = cursor.read()?;
                let y_device_offset: Offset16<Device<'static>> = cursor.read()?;
                Ok(AnchorTable::Format3 {
                    x_coordinate,
                    y_coordinate,
                    x_device: data.resolve_nullable_offset(x_device_offset).ok().flatten(),
                    y_device: data.resolve_nullable_offset(y_device_offset).ok().flatten(),
                })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

// ---------------------------------------------------------------------
// MarkArray
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct MarkArray<'a> {
    data: FontData<'a>,
    mark_records: RecordArray<'a, MarkRecord>,
}

impl<'a> MarkArray<'a> {
    pub fn get(&self, index: u16) -> Option<(u16, AnchorTable<'a>)> {
        let rec = self.mark_records.get(index as usize)?;
        let anchor = self.data.resolve_offset(rec.mark_anchor_offset).ok()?;
        Some((rec.mark_class, anchor))
    }
}

impl<'a> FontRead<'a> for MarkArray<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let mark_count: u16 = cursor.read()?;
        let mark_records = cursor.read_records(mark_count as usize)?;
        Ok(MarkArray { data, mark_records })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MarkRecord {
    pub mark_class: u16,
    pub mark_anchor_offset: Offset16<AnchorTable<'static>>,
}

impl<'a> ReadRecord<'a> for MarkRecord {
    const RECORD_LEN: usize = 4;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(MarkRecord {
            mark_class: cursor.read()?,
            mark_anchor_offset: cursor.read()?,
        })
    }
}

// ---------------------------------------------------------------------
// PositionLookup dispatch
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub enum PositionLookup<'a> {
    Single(SinglePos<'a>),
    Pair(PairPos<'a>),
    Cursive(CursivePosFormat1<'a>),
    MarkToBase(MarkBasePosFormat1<'a>),
    MarkToLig(MarkLigPosFormat1<'a>),
    MarkToMark(MarkMarkPosFormat1<'a>),
    Contextual(SequenceContext<'a>),
    ChainContextual(ChainedSequenceContext<'a>),
    Extension(ExtensionPosFormat1<'a>),
}

impl<'a> PositionLookup<'a> {
    pub fn resolve_extension(self) -> Self {
        match self {
            PositionLookup::Extension(ext) => ext.inner(),
            other => other,
        }
    }
}

impl<'a> FontRead<'a> for PositionLookup<'a> {
    fn read(_data: FontData<'a>) -> Result<Self, ReadError> {
        Err(ReadError::MalformedData(
            "position subtables must be read via read_subtable_with_type",
        ))
    }
}

pub fn read_subtable_with_type(
    data: FontData<'_>,
    lookup_type: u16,
) -> Result<PositionLookup<'_>, ReadError> {
    match lookup_type {
        1 => SinglePos::read(data).map(PositionLookup::Single),
        2 => PairPos::read(data).map(PositionLookup::Pair),
        3 => CursivePosFormat1::read(data).map(PositionLookup::Cursive),
        4 => MarkBasePosFormat1::read(data).map(PositionLookup::MarkToBase),
        5 => MarkLigPosFormat1::read(data).map(PositionLookup::MarkToLig),
        6 => MarkMarkPosFormat1::read(data).map(PositionLookup::MarkToMark),
        7 => SequenceContext::read(data).map(PositionLookup::Contextual),
        8 => ChainedSequenceContext::read(data).map(PositionLookup::ChainContextual),
        9 => ExtensionPosFormat1::read(data).map(PositionLookup::Extension),
        other => Err(ReadError::InvalidFormat(other)),
    }
}

impl<'a> Lookup<'a, PositionLookup<'a>> {
    pub fn gpos_subtable(&self, index: usize) -> Option<PositionLookup<'a>> {
        let offset = self.raw_subtable_offset(index)?;
        let sub = self.table_data().slice(offset..)?;
        read_subtable_with_type(sub, self.lookup_type).ok()
    }

    pub fn gpos_subtables(&self) -> impl Iterator<Item = PositionLookup<'a>> + 'a {
        let lookup_type = self.lookup_type;
        let data = self.table_data();
        self.raw_subtable_offsets()
            .filter_map(move |off| data.slice(off..))
            .filter_map(move |sub| read_subtable_with_type(sub, lookup_type).ok())
    }
}

// ---------------------------------------------------------------------
// Single positioning
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub enum SinglePos<'a> {
    Format1(SinglePosFormat1<'a>),
    Format2(SinglePosFormat2<'a>),
}

impl<'a> SinglePos<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        match self {
            SinglePos::Format1(t) => t.coverage(),
            SinglePos::Format2(t) => t.coverage(),
        }
    }

    pub fn value_for_glyph(&self, gid: GlyphId) -> Option<ValueRecord<'a>> {
        match self {
            SinglePos::Format1(t) => t.coverage()?.get(gid).map(|_| t.value_record),
            SinglePos::Format2(t) => {
                let index = t.coverage()?.get(gid)?;
                t.value_records.get(index as usize)
            }
        }
    }
}

impl<'a> FontRead<'a> for SinglePos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => SinglePosFormat1::read(data).map(SinglePos::Format1),
            2 => SinglePosFormat2::read(data).map(SinglePos::Format2),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[derive(Clone, Copy)]
pub struct SinglePosFormat1<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    value_record: ValueRecord<'a>,
}

impl<'a> SinglePosFormat1<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }
}

impl<'a> FontRead<'a> for SinglePosFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let value_format: ValueFormat = cursor.read()?;
        let remaining = cursor.remaining().ok_or(ReadError::OutOfBounds)?;
        let value_record = ValueRecord::read_with_args(
            remaining
                .slice(0..value_format.record_len_bytes())
                .ok_or(ReadError::OutOfBounds)?,
            &value_format,
        )?;
        Ok(SinglePosFormat1 {
            data,
            coverage_offset,
            value_record,
        })
    }
}

#[derive(Clone, Copy)]
pub struct SinglePosFormat2<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    value_records: crate::array::ComputedRecordArray<'a, ValueRecord<'a>>,
}

impl<'a> SinglePosFormat2<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }
}

impl<'a> FontRead<'a> for SinglePosFormat2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 2 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let value_format: ValueFormat = cursor.read()?;
        let value_count: u16 = cursor.read()?;
        let value_records = cursor.read_computed_records(value_count as usize, value_format)?;
        Ok(SinglePosFormat2 {
            data,
            coverage_offset,
            value_records,
        })
    }
}

// ---------------------------------------------------------------------
// Pair positioning
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub enum PairPos<'a> {
    Format1(PairPosFormat1<'a>),
    Format2(PairPosFormat2<'a>),
}

impl<'a> FontRead<'a> for PairPos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => PairPosFormat1::read(data).map(PairPos::Format1),
            2 => PairPosFormat2::read(data).map(PairPos::Format2),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

impl<'a> PairPos<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        match self {
            PairPos::Format1(t) => t.coverage(),
            PairPos::Format2(t) => t.coverage(),
        }
    }
}

#[derive(Clone, Copy)]
pub struct PairPosFormat1<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    value_format1: ValueFormat,
    value_format2: ValueFormat,
    pair_set_offsets: BeArray<'a, Offset16<PairSet<'static>>>,
}

impl<'a> PairPosFormat1<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn pair_set_for_glyph(&self, gid: GlyphId) -> Option<PairSet<'a>> {
        let index = self.coverage()?.get(gid)?;
        let offset = self.pair_set_offsets.get(index as usize)?;
        self.data
            .read_with_args(
                offset.to_usize()..self.data.len(),
                &(self.value_format1, self.value_format2),
            )
            .ok()
    }
}

impl<'a> FontRead<'a> for PairPosFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let value_format1 = cursor.read()?;
        let value_format2 = cursor.read()?;
        let pair_set_count: u16 = cursor.read()?;
        let pair_set_offsets = cursor.read_array(pair_set_count as usize)?;
        Ok(PairPosFormat1 {
            data,
            coverage_offset,
            value_format1,
            value_format2,
            pair_set_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct PairSet<'a> {
    pair_value_records: crate::array::ComputedRecordArray<'a, PairValueRecord<'a>>,
}

impl<'a> PairSet<'a> {
    pub fn find(&self, second_glyph: GlyphId) -> Option<PairValueRecord<'a>> {
        (0..self.pair_value_records.len())
            .filter_map(|i| self.pair_value_records.get(i))
            .find(|rec| rec.second_glyph == second_glyph)
    }
}

impl ReadArgs for PairSet<'_> {
    type Args = (ValueFormat, ValueFormat);
}

impl<'a> FontReadWithArgs<'a> for PairSet<'a> {
    fn read_with_args(
        data: FontData<'a>,
        args: &(ValueFormat, ValueFormat),
    ) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let pair_value_count: u16 = cursor.read()?;
        let pair_value_records =
            cursor.read_computed_records(pair_value_count as usize, *args)?;
        Ok(PairSet {
            pair_value_records,
        })
    }
}

#[derive(Clone, Copy)]
pub struct PairValueRecord<'a> {
    pub second_glyph: GlyphId,
    pub value_record1: ValueRecord<'a>,
    pub value_record2: ValueRecord<'a>,
}

impl ReadArgs for PairValueRecord<'_> {
    type Args = (ValueFormat, ValueFormat);
}

impl<'a> crate::array::ReadRecordWithArgs<'a> for PairValueRecord<'a> {
    fn compute_len(args: &(ValueFormat, ValueFormat)) -> usize {
        2 + args.0.record_len_bytes() + args.1.record_len_bytes()
    }

    fn read_record_with_args(
        data: FontData<'a>,
        args: &(ValueFormat, ValueFormat),
    ) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let second_glyph = cursor.read()?;
        let remaining = cursor.remaining().ok_or(ReadError::OutOfBounds)?;
        let len1 = args.0.record_len_bytes();
        let len2 = args.1.record_len_bytes();
        let value_record1 = ValueRecord::read_with_args(
            remaining.slice(0..len1).ok_or(ReadError::OutOfBounds)?,
            &args.0,
        )?;
        let value_record2 = ValueRecord::read_with_args(
            remaining
                .slice(len1..len1 + len2)
                .ok_or(ReadError::OutOfBounds)?,
            &args.1,
        )?;
        Ok(PairValueRecord {
            second_glyph,
            value_record1,
            value_record2,
        })
    }
}

#[derive(Clone, Copy)]
pub struct PairPosFormat2<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    class_def1_offset: Offset16<crate::tables::layout::ClassDef<'static>>,
    class_def2_offset: Offset16<crate::tables::layout::ClassDef<'static>>,
    class1_count: u16,
    class2_count: u16,
    value_format1: ValueFormat,
    value_format2: ValueFormat,
    class1_records_data: FontData<'a>,
}

impl<'a> PairPosFormat2<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn class_def1(&self) -> Option<crate::tables::layout::ClassDef<'a>> {
        self.data.resolve_offset(self.class_def1_offset).ok()
    }

    pub fn class_def2(&self) -> Option<crate::tables::layout::ClassDef<'a>> {
        self.data.resolve_offset(self.class_def2_offset).ok()
    }

    pub fn value_for_classes(
        &self,
        class1: u16,
        class2: u16,
    ) -> Option<(ValueRecord<'a>, ValueRecord<'a>)> {
        if class1 >= self.class1_count || class2 >= self.class2_count {
            return None;
        }
        let class2_record_len =
            self.value_format1.record_len_bytes() + self.value_format2.record_len_bytes();
        let class1_record_len = class2_record_len * self.class2_count as usize;
        let class1_start = class1 as usize * class1_record_len;
        let class2_start = class1_start + class2 as usize * class2_record_len;
        let remaining = self
            .class1_records_data
            .slice(class2_start..class2_start + class2_record_len)?;
        let len1 = self.value_format1.record_len_bytes();
        let len2 = self.value_format2.record_len_bytes();
        let v1 =
            ValueRecord::read_with_args(remaining.slice(0..len1)?, &self.value_format1).ok()?;
        let v2 = ValueRecord::read_with_args(
            remaining.slice(len1..len1 + len2)?,
            &self.value_format2,
        )
        .ok()?;
        Some((v1, v2))
    }
}

impl<'a> FontRead<'a> for PairPosFormat2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 2 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let value_format1: ValueFormat = cursor.read()?;
        let value_format2: ValueFormat = cursor.read()?;
        let class_def1_offset = cursor.read()?;
        let class_def2_offset = cursor.read()?;
        let class1_count: u16 = cursor.read()?;
        let class2_count: u16 = cursor.read()?;
        let class1_records_data = cursor.remaining().ok_or(ReadError::OutOfBounds)?;
        Ok(PairPosFormat2 {
            data,
            coverage_offset,
            class_def1_offset,
            class_def2_offset,
            class1_count,
            class2_count,
            value_format1,
            value_format2,
            class1_records_data,
        })
    }
}

// ---------------------------------------------------------------------
// Cursive attachment
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct CursivePosFormat1<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    entry_exit_record: RecordArray<'a, EntryExitRecord>,
}

impl<'a> CursivePosFormat1<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn entry_exit(&self, coverage_index: u16) -> Option<(Option<AnchorTable<'a>>, Option<AnchorTable<'a>>)> {
        let rec = self.entry_exit_record.get(coverage_index as usize)?;
        let entry = self
            .data
            .resolve_nullable_offset(rec.entry_anchor_offset)
            .ok()
            .flatten();
        let exit = self
            .data
            .resolve_nullable_offset(rec.exit_anchor_offset)
            .ok()
            .flatten();
        Some((entry, exit))
    }
}

impl<'a> FontRead<'a> for CursivePosFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset = cursor.read()?;
        let entry_exit_count: u16 = cursor.read()?;
        let entry_exit_record = cursor.read_records(entry_exit_count as usize)?;
        Ok(CursivePosFormat1 {
            data,
            coverage_offset,
            entry_exit_record,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EntryExitRecord {
    pub entry_anchor_offset: Offset16<AnchorTable<'static>>,
    pub exit_anchor_offset: Offset16<AnchorTable<'static>>,
}

impl<'a> ReadRecord<'a> for EntryExitRecord {
    const RECORD_LEN: usize = 4;

    fn read_record(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(EntryExitRecord {
            entry_anchor_offset: cursor.read()?,
            exit_anchor_offset: cursor.read()?,
        })
    }
}

// ---------------------------------------------------------------------
// Mark-to-base
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct MarkBasePosFormat1<'a> {
    data: FontData<'a>,
    mark_coverage_offset: Offset16<CoverageTable<'static>>,
    base_coverage_offset: Offset16<CoverageTable<'static>>,
    pub mark_class_count: u16,
    mark_array_offset: Offset16<MarkArray<'static>>,
    base_array_offset: Offset16<()>,
}

impl<'a> MarkBasePosFormat1<'a> {
    pub fn mark_coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.mark_coverage_offset).ok()
    }

    pub fn base_coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.base_coverage_offset).ok()
    }

    pub fn mark_array(&self) -> Option<MarkArray<'a>> {
        self.data.resolve_offset(self.mark_array_offset).ok()
    }

    pub fn base_array(&self) -> Option<BaseArray<'a>> {
        self.data
            .read_with_args(
                self.base_array_offset.to_usize()..self.data.len(),
                &self.mark_class_count,
            )
            .ok()
    }
}

impl<'a> FontRead<'a> for MarkBasePosFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let mark_coverage_offset = cursor.read()?;
        let base_coverage_offset = cursor.read()?;
        let mark_class_count = cursor.read()?;
        let mark_array_offset = cursor.read()?;
        let base_array_offset = cursor.read()?;
        Ok(MarkBasePosFormat1 {
            data,
            mark_coverage_offset,
            base_coverage_offset,
            mark_class_count,
            mark_array_offset,
            base_array_offset,
        })
    }
}

#[derive(Clone, Copy)]
pub struct BaseArray<'a> {
    data: FontData<'a>,
    mark_class_count: u16,
    base_records_data: FontData<'a>,
    base_count: u16,
}

impl<'a> BaseArray<'a> {
    pub fn base_anchor(&self, base_index: u16, mark_class: u16) -> Option<AnchorTable<'a>> {
        if base_index >= self.base_count || mark_class >= self.mark_class_count {
            return None;
        }
        let record_len = self.mark_class_count as usize * 2;
        let start = base_index as usize * record_len + mark_class as usize * 2;
        let offset: Offset16<AnchorTable<'static>> =
            self.base_records_data.read_at(start).ok()?;
        self.data.resolve_nullable_offset(offset).ok().flatten()
    }
}

impl ReadArgs for BaseArray<'_> {
    type Args = u16;
}

impl<'a> FontReadWithArgs<'a> for BaseArray<'a> {
    fn read_with_args(data: FontData<'a>, args: &u16) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let base_count: u16 = cursor.read()?;
        let base_records_data = cursor.remaining().ok_or(ReadError::OutOfBounds)?;
        Ok(BaseArray {
            data,
            mark_class_count: *args,
            base_records_data,
            base_count,
        })
    }
}

// ---------------------------------------------------------------------
// Mark-to-ligature
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct MarkLigPosFormat1<'a> {
    data: FontData<'a>,
    mark_coverage_offset: Offset16<CoverageTable<'static>>,
    ligature_coverage_offset: Offset16<CoverageTable<'static>>,
    pub mark_class_count: u16,
    mark_array_offset: Offset16<MarkArray<'static>>,
    ligature_array_offset: Offset16<()>,
}

impl<'a> MarkLigPosFormat1<'a> {
    pub fn mark_coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.mark_coverage_offset).ok()
    }

    pub fn ligature_coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.ligature_coverage_offset).ok()
    }

    pub fn mark_array(&self) -> Option<MarkArray<'a>> {
        self.data.resolve_offset(self.mark_array_offset).ok()
    }

    pub fn ligature_array(&self) -> Option<LigatureArray<'a>> {
        self.data
            .read_with_args(
                self.ligature_array_offset.to_usize()..self.data.len(),
                &self.mark_class_count,
            )
            .ok()
    }
}

impl<'a> FontRead<'a> for MarkLigPosFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let mark_coverage_offset = cursor.read()?;
        let ligature_coverage_offset = cursor.read()?;
        let mark_class_count = cursor.read()?;
        let mark_array_offset = cursor.read()?;
        let ligature_array_offset = cursor.read()?;
        Ok(MarkLigPosFormat1 {
            data,
            mark_coverage_offset,
            ligature_coverage_offset,
            mark_class_count,
            mark_array_offset,
            ligature_array_offset,
        })
    }
}

#[derive(Clone, Copy)]
pub struct LigatureArray<'a> {
    data: FontData<'a>,
    mark_class_count: u16,
    ligature_attach_offsets: BeArray<'a, Offset16<()>>,
}

impl<'a> LigatureArray<'a> {
    pub fn ligature_attach(&self, ligature_index: u16) -> Option<LigatureAttach<'a>> {
        let offset = self.ligature_attach_offsets.get(ligature_index as usize)?;
        self.data
            .read_with_args(offset.to_usize()..self.data.len(), &self.mark_class_count)
            .ok()
    }
}

impl ReadArgs for LigatureArray<'_> {
    type Args = u16;
}

impl<'a> FontReadWithArgs<'a> for LigatureArray<'a> {
    fn read_with_args(data: FontData<'a>, args: &u16) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let ligature_count: u16 = cursor.read()?;
        let ligature_attach_offsets = cursor.read_array(ligature_count as usize)?;
        Ok(LigatureArray {
            data,
            mark_class_count: *args,
            ligature_attach_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct LigatureAttach<'a> {
    data: FontData<'a>,
    mark_class_count: u16,
    component_records_data: FontData<'a>,
    component_count: u16,
}

impl<'a> LigatureAttach<'a> {
    pub fn component_anchor(&self, component_index: u16, mark_class: u16) -> Option<AnchorTable<'a>> {
        if component_index >= self.component_count || mark_class >= self.mark_class_count {
            return None;
        }
        let record_len = self.mark_class_count as usize * 2;
        let start = component_index as usize * record_len + mark_class as usize * 2;
        let offset: Offset16<AnchorTable<'static>> =
            self.component_records_data.read_at(start).ok()?;
        self.data.resolve_nullable_offset(offset).ok().flatten()
    }
}

impl ReadArgs for LigatureAttach<'_> {
    type Args = u16;
}

impl<'a> FontReadWithArgs<'a> for LigatureAttach<'a> {
    fn read_with_args(data: FontData<'a>, args: &u16) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let component_count: u16 = cursor.read()?;
        let component_records_data = cursor.remaining().ok_or(ReadError::OutOfBounds)?;
        Ok(LigatureAttach {
            data,
            mark_class_count: *args,
            component_records_data,
            component_count,
        })
    }
}

// ---------------------------------------------------------------------
// Mark-to-mark
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct MarkMarkPosFormat1<'a> {
    data: FontData<'a>,
    mark1_coverage_offset: Offset16<CoverageTable<'static>>,
    mark2_coverage_offset: Offset16<CoverageTable<'static>>,
    pub mark_class_count: u16,
    mark1_array_offset: Offset16<MarkArray<'static>>,
    mark2_array_offset: Offset16<()>,
}

impl<'a> MarkMarkPosFormat1<'a> {
    pub fn mark1_coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.mark1_coverage_offset).ok()
    }

    pub fn mark2_coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.mark2_coverage_offset).ok()
    }

    pub fn mark1_array(&self) -> Option<MarkArray<'a>> {
        self.data.resolve_offset(self.mark1_array_offset).ok()
    }

    pub fn mark2_array(&self) -> Option<Mark2Array<'a>> {
        self.data
            .read_with_args(
                self.mark2_array_offset.to_usize()..self.data.len(),
                &self.mark_class_count,
            )
            .ok()
    }
}

impl<'a> FontRead<'a> for MarkMarkPosFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let mark1_coverage_offset = cursor.read()?;
        let mark2_coverage_offset = cursor.read()?;
        let mark_class_count = cursor.read()?;
        let mark1_array_offset = cursor.read()?;
        let mark2_array_offset = cursor.read()?;
        Ok(MarkMarkPosFormat1 {
            data,
            mark1_coverage_offset,
            mark2_coverage_offset,
            mark_class_count,
            mark1_array_offset,
            mark2_array_offset,
        })
    }
}

#[derive(Clone, Copy)]
pub struct Mark2Array<'a> {
    data: FontData<'a>,
    mark_class_count: u16,
    mark2_records_data: FontData<'a>,
    mark2_count: u16,
}

impl<'a> Mark2Array<'a> {
    pub fn mark2_anchor(&self, mark2_index: u16, mark_class: u16) -> Option<AnchorTable<'a>> {
        if mark2_index >= self.mark2_count || mark_class >= self.mark_class_count {
            return None;
        }
        let record_len = self.mark_class_count as usize * 2;
        let start = mark2_index as usize * record_len + mark_class as usize * 2;
        let offset: Offset16<AnchorTable<'static>> = self.mark2_records_data.read_at(start).ok()?;
        self.data.resolve_nullable_offset(offset).ok().flatten()
    }
}

impl ReadArgs for Mark2Array<'_> {
    type Args = u16;
}

impl<'a> FontReadWithArgs<'a> for Mark2Array<'a> {
    fn read_with_args(data: FontData<'a>, args: &u16) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let mark2_count: u16 = cursor.read()?;
        let mark2_records_data = cursor.remaining().ok_or(ReadError::OutOfBounds)?;
        Ok(Mark2Array {
            data,
            mark_class_count: *args,
            mark2_records_data,
            mark2_count,
        })
    }
}

// ---------------------------------------------------------------------
// Extension
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct ExtensionPosFormat1<'a> {
    data: FontData<'a>,
    pub extension_lookup_type: u16,
    extension_offset: Offset32<()>,
}

impl<'a> ExtensionPosFormat1<'a> {
    pub fn inner(&self) -> PositionLookup<'a> {
        let pos = self.extension_offset.to_usize();
        self.data
            .slice(pos..)
            .ok_or(ReadError::OutOfBounds)
            .and_then(|sub| read_subtable_with_type(sub, self.extension_lookup_type))
            .unwrap_or(PositionLookup::Single(SinglePos::Format1(
                SinglePosFormat1::empty(),
            )))
    }
}

impl<'a> FontRead<'a> for ExtensionPosFormat1<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let extension_lookup_type = cursor.read()?;
        let extension_offset = cursor.read()?;
        Ok(ExtensionPosFormat1 {
            data,
            extension_lookup_type,
            extension_offset,
        })
    }
}

impl<'a> SinglePosFormat1<'a> {
    fn empty() -> Self {
        SinglePosFormat1 {
            data: FontData::EMPTY,
            coverage_offset: Offset16::new(0),
            value_record: ValueRecord::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::layout::ChainedSequenceContext;

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    #[test]
    fn value_record_reads_present_fields_in_format_order() {
        let format = ValueFormat(ValueFormat::X_PLACEMENT | ValueFormat::Y_ADVANCE);
        let mut buf = Vec::new();
        push_u16(&mut buf, (-5i16) as u16); // x_placement
        push_u16(&mut buf, 200); // y_advance
        let record = ValueRecord::read_with_args(FontData::new(&buf), &format).unwrap();
        assert_eq!(record.x_placement, -5);
        assert_eq!(record.y_placement, 0);
        assert_eq!(record.x_advance, 0);
        assert_eq!(record.y_advance, 200);
    }

    #[test]
    fn single_pos_format1_reads_value_record_for_covered_glyph() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 1); // format
        push_u16(&mut buf, 8); // coverageOffset
        push_u16(&mut buf, ValueFormat::X_ADVANCE); // valueFormat
        push_u16(&mut buf, 120); // x_advance
        push_u16(&mut buf, 1); // coverage format
        push_u16(&mut buf, 1); // coverage glyphCount
        push_u16(&mut buf, 0x30); // coverage glyph

        let single = SinglePos::read(FontData::new(&buf)).unwrap();
        let value = single.value_for_glyph(GlyphId::new(0x30)).unwrap();
        assert_eq!(value.x_advance, 120);
        assert!(single.value_for_glyph(GlyphId::new(0x31)).is_none());
    }

    #[test]
    fn pair_pos_format2_resolves_class_based_kerning_values() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 2); // format
        push_u16(&mut buf, 24); // coverageOffset
        push_u16(&mut buf, ValueFormat::X_ADVANCE); // valueFormat1
        push_u16(&mut buf, 0); // valueFormat2 (empty)
        push_u16(&mut buf, 30); // classDef1Offset
        push_u16(&mut buf, 38); // classDef2Offset
        push_u16(&mut buf, 2); // class1Count
        push_u16(&mut buf, 2); // class2Count
        // class1/class2 records, row-major [class1][class2], one x_advance each
        push_u16(&mut buf, 0); // (0,0)
        push_u16(&mut buf, 5); // (0,1)
        push_u16(&mut buf, 10); // (1,0)
        push_u16(&mut buf, (-1i16) as u16); // (1,1)
        // coverage (format 1) at 24
        push_u16(&mut buf, 1);
        push_u16(&mut buf, 1);
        push_u16(&mut buf, 0x10);
        // classDef1 (format 1) at 30
        push_u16(&mut buf, 1);
        push_u16(&mut buf, 0x10); // startGlyphId
        push_u16(&mut buf, 1); // glyphCount
        push_u16(&mut buf, 1); // class for 0x10
        // classDef2 (format 2) at 38
        push_u16(&mut buf, 2);
        push_u16(&mut buf, 1); // rangeCount
        push_u16(&mut buf, 0x20); // startGlyphId
        push_u16(&mut buf, 0x2F); // endGlyphId
        push_u16(&mut buf, 1); // class

        let pair = PairPosFormat2::read(FontData::new(&buf)).unwrap();
        assert_eq!(pair.class_def1().unwrap().get(GlyphId::new(0x10)), 1);
        assert_eq!(pair.class_def1().unwrap().get(GlyphId::new(0x11)), 0);
        assert_eq!(pair.class_def2().unwrap().get(GlyphId::new(0x25)), 1);
        assert_eq!(pair.class_def2().unwrap().get(GlyphId::new(0x30)), 0);

        let (v00, _) = pair.value_for_classes(0, 0).unwrap();
        let (v01, _) = pair.value_for_classes(0, 1).unwrap();
        let (v10, _) = pair.value_for_classes(1, 0).unwrap();
        let (v11, _) = pair.value_for_classes(1, 1).unwrap();
        assert_eq!(v00.x_advance, 0);
        assert_eq!(v01.x_advance, 5);
        assert_eq!(v10.x_advance, 10);
        assert_eq!(v11.x_advance, -1);
        assert!(pair.value_for_classes(2, 0).is_none());
    }

    #[test]
    fn anchor_format3_resolves_x_device_table_delta() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 3); // format
        push_u16(&mut buf, 10); // x_coordinate
        push_u16(&mut buf, 20); // y_coordinate
        push_u16(&mut buf, 10); // x_device_offset
        push_u16(&mut buf, 0); // y_device_offset (null)
        // device table at offset 10
        push_u16(&mut buf, 10); // startSize
        push_u16(&mut buf, 10); // endSize
        push_u16(&mut buf, 1); // deltaFormat
        push_u16(&mut buf, 0x4000); // delta word: ppem10 -> 1

        let anchor = AnchorTable::read(FontData::new(&buf)).unwrap();
        let AnchorTable::Format3 { x_device, y_device, .. } = anchor else {
            panic!("expected format 3 anchor");
        };
        assert_eq!(x_device.unwrap().delta_for_ppem(10), 1);
        assert!(y_device.is_none());
    }

    #[test]
    fn read_subtable_with_type_parses_chain_context_format3_for_lookup_type_8() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 3); // format
        push_u16(&mut buf, 0); // backtrackGlyphCount
        push_u16(&mut buf, 1); // inputGlyphCount
        push_u16(&mut buf, 16); // inputCoverageOffsets[0]
        push_u16(&mut buf, 0); // lookaheadGlyphCount
        push_u16(&mut buf, 1); // seqLookupCount
        push_u16(&mut buf, 0); // lookupRecord.sequenceIndex
        push_u16(&mut buf, 0); // lookupRecord.lookupListIndex
        // coverage (format 1) at 16
        push_u16(&mut buf, 1);
        push_u16(&mut buf, 1);
        push_u16(&mut buf, 0x77);

        let parsed = read_subtable_with_type(FontData::new(&buf), 8).unwrap();
        match parsed {
            PositionLookup::ChainContextual(ChainedSequenceContext::Format3(ctx)) => {
                assert_eq!(ctx.input_count(), 1);
                let cov = ctx.input_coverage(0).unwrap();
                assert_eq!(cov.get(GlyphId::new(0x77)), Some(0));
                assert_eq!(ctx.lookup_records().iter().count(), 1);
            }
            _ => panic!("expected chained sequence context format 3"),
        }
    }
}
