//! The `GDEF` table: glyph class definitions, attachment points, ligature
//! carets and mark glyph sets.

use font_types::{GlyphId, MajorMinor, Offset16, Offset32};

use crate::array::BeArray;
use crate::font_data::FontData;
use crate::read::{FontRead, ReadError};
use crate::tables::layout::{ClassDef, CoverageTable, Device};

/// Glyph classes recorded in `GDEF.GlyphClassDef`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphClassDef {
    Base,
    Ligature,
    Mark,
    Component,
}

impl GlyphClassDef {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(GlyphClassDef::Base),
            2 => Some(GlyphClassDef::Ligature),
            3 => Some(GlyphClassDef::Mark),
            4 => Some(GlyphClassDef::Component),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
pub struct Gdef<'a> {
    data: FontData<'a>,
    pub version: MajorMinor,
    glyph_class_def_offset: Offset16<ClassDef<'static>>,
    attach_list_offset: Offset16<AttachList<'static>>,
    lig_caret_list_offset: Offset16<LigCaretList<'static>>,
    mark_attach_class_def_offset: Offset16<ClassDef<'static>>,
    mark_glyph_sets_def_offset: Offset16<MarkGlyphSets<'static>>,
}

impl<'a> Gdef<'a> {
    pub fn glyph_class_def(&self) -> Option<ClassDef<'a>> {
        self.data
            .resolve_nullable_offset(self.glyph_class_def_offset)
            .ok()
            .flatten()
    }

    /// Convenience wrapper returning the typed [`GlyphClassDef`] for `gid`,
    /// or `None` if the glyph is unclassified or there is no `GlyphClassDef`
    /// subtable at all.
    pub fn glyph_class(&self, gid: GlyphId) -> Option<GlyphClassDef> {
        let class_def = self.glyph_class_def()?;
        GlyphClassDef::from_u16(class_def.get(gid))
    }

    pub fn attach_list(&self) -> Option<AttachList<'a>> {
        self.data
            .resolve_nullable_offset(self.attach_list_offset)
            .ok()
            .flatten()
    }

    pub fn lig_caret_list(&self) -> Option<LigCaretList<'a>> {
        self.data
            .resolve_nullable_offset(self.lig_caret_list_offset)
            .ok()
            .flatten()
    }

    pub fn mark_attach_class_def(&self) -> Option<ClassDef<'a>> {
        self.data
            .resolve_nullable_offset(self.mark_attach_class_def_offset)
            .ok()
            .flatten()
    }

    pub fn mark_glyph_sets_def(&self) -> Option<MarkGlyphSets<'a>> {
        if self.version < MajorMinor::VERSION_1_2 {
            return None;
        }
        self.data
            .resolve_nullable_offset(self.mark_glyph_sets_def_offset)
            .ok()
            .flatten()
    }
}

impl<'a> FontRead<'a> for Gdef<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: MajorMinor = cursor.read()?;
        let glyph_class_def_offset = cursor.read()?;
        let attach_list_offset = cursor.read()?;
        let lig_caret_list_offset = cursor.read()?;
        let mark_attach_class_def_offset = cursor.read()?;
        let mark_glyph_sets_def_offset = if version >= MajorMinor::VERSION_1_2 {
            cursor.read()?
        } else {
            Offset16::new(0)
        };
        Ok(Gdef {
            data,
            version,
            glyph_class_def_offset,
            attach_list_offset,
            lig_caret_list_offset,
            mark_attach_class_def_offset,
            mark_glyph_sets_def_offset,
        })
    }
}

#[derive(Clone, Copy)]
pub struct AttachList<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    attach_point_offsets: BeArray<'a, Offset16<AttachPoint<'static>>>,
}

impl<'a> AttachList<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn attach_point(&self, coverage_index: u16) -> Option<AttachPoint<'a>> {
        let offset = self.attach_point_offsets.get(coverage_index as usize)?;
        self.data.resolve_offset(offset).ok()
    }
}

impl<'a> FontRead<'a> for AttachList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let coverage_offset = cursor.read()?;
        let glyph_count: u16 = cursor.read()?;
        let attach_point_offsets = cursor.read_array(glyph_count as usize)?;
        Ok(AttachList {
            data,
            coverage_offset,
            attach_point_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct AttachPoint<'a> {
    point_indices: BeArray<'a, u16>,
}

impl<'a> AttachPoint<'a> {
    pub fn point_indices(&self) -> BeArray<'a, u16> {
        self.point_indices
    }
}

impl<'a> FontRead<'a> for AttachPoint<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let point_count: u16 = cursor.read()?;
        let point_indices = cursor.read_array(point_count as usize)?;
        Ok(AttachPoint { point_indices })
    }
}

#[derive(Clone, Copy)]
pub struct LigCaretList<'a> {
    data: FontData<'a>,
    coverage_offset: Offset16<CoverageTable<'static>>,
    lig_glyph_offsets: BeArray<'a, Offset16<LigGlyph<'static>>>,
}

impl<'a> LigCaretList<'a> {
    pub fn coverage(&self) -> Option<CoverageTable<'a>> {
        self.data.resolve_offset(self.coverage_offset).ok()
    }

    pub fn lig_glyph(&self, coverage_index: u16) -> Option<LigGlyph<'a>> {
        let offset = self.lig_glyph_offsets.get(coverage_index as usize)?;
        self.data.resolve_offset(offset).ok()
    }
}

impl<'a> FontRead<'a> for LigCaretList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let coverage_offset = cursor.read()?;
        let lig_glyph_count: u16 = cursor.read()?;
        let lig_glyph_offsets = cursor.read_array(lig_glyph_count as usize)?;
        Ok(LigCaretList {
            data,
            coverage_offset,
            lig_glyph_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub struct LigGlyph<'a> {
    data: FontData<'a>,
    caret_value_offsets: BeArray<'a, Offset16<CaretValue<'static>>>,
}

impl<'a> LigGlyph<'a> {
    pub fn carets(&self) -> impl Iterator<Item = CaretValue<'a>> + 'a {
        let data = self.data;
        self.caret_value_offsets
            .iter()
            .filter_map(move |off| data.resolve_offset(off).ok())
    }
}

impl<'a> FontRead<'a> for LigGlyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let caret_count: u16 = cursor.read()?;
        let caret_value_offsets = cursor.read_array(caret_count as usize)?;
        Ok(LigGlyph {
            data,
            caret_value_offsets,
        })
    }
}

#[derive(Clone, Copy)]
pub enum CaretValue<'a> {
    Format1 { coordinate: i16 },
    Format2 { caret_value_point_index: u16 },
    Format3 { coordinate: i16, device: Option<Device<'a>> },
}

impl<'a> FontRead<'a> for CaretValue<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        match format {
            1 => Ok(CaretValue::Format1 {
                coordinate: cursor.read()?,
            }),
            2 => Ok(CaretValue::Format2 {
                caret_value_point_index: cursor.read()?,
            }),
            3 => {
                let coordinate: i16 = cursor.read()?;
                let device_offset: Offset16<Device<'static>> = cursor.read()?;
                let device = data.resolve_nullable_offset(device_offset).ok().flatten();
                Ok(CaretValue::Format3 { coordinate, device })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[derive(Clone, Copy)]
pub struct MarkGlyphSets<'a> {
    data: FontData<'a>,
    coverage_offsets: BeArray<'a, Offset32<CoverageTable<'static>>>,
}

impl<'a> MarkGlyphSets<'a> {
    pub fn set_count(&self) -> usize {
        self.coverage_offsets.len()
    }

    pub fn coverage(&self, set_index: u16) -> Option<CoverageTable<'a>> {
        let offset = self.coverage_offsets.get(set_index as usize)?;
        self.data.resolve_offset(offset).ok()
    }
}

impl<'a> FontRead<'a> for MarkGlyphSets<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let mark_glyph_set_count: u16 = cursor.read()?;
        let coverage_offsets = cursor.read_array(mark_glyph_set_count as usize)?;
        Ok(MarkGlyphSets {
            data,
            coverage_offsets,
        })
    }
}
