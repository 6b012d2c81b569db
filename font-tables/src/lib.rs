//! Zero-copy parsing of the OpenType layout tables used by complex text
//! shaping: `GDEF`, `GSUB`, `GPOS`, and the shared layout common tables
//! (`ScriptList`, `FeatureList`, `LookupList`, `Coverage`, `ClassDef`,
//! context and chaining-context subtables) that sit underneath them.
//!
//! Every type here borrows directly from the font's own byte buffer: no
//! table is copied out, and a malformed or truncated subtable produces a
//! [`ReadError`](read::ReadError) rather than a panic.

pub mod array;
pub mod font_data;
pub mod read;

pub mod tables {
    pub mod gdef;
    pub mod gpos;
    pub mod gsub;
    pub mod layout;
}

pub use font_data::FontData;
pub use read::{ComputeSize, FontRead, FontReadWithArgs, ReadArgs, ReadError};

pub use tables::gdef::Gdef;
pub use tables::gpos::Gpos;
pub use tables::gsub::Gsub;
pub use tables::layout::{ClassDef, CoverageTable, FeatureList, LookupList, ScriptList};
