//! Common scalar data types used in OpenType font tables.
//!
//! See the [OpenType spec's data types chapter][data types] for the
//! authoritative description of each of these.
//!
//! [data types]: https://docs.microsoft.com/en-us/typography/opentype/spec/otff#data-types

mod glyph_id;
mod offset;
mod raw;
mod tag;
mod uint24;
mod version;

pub use glyph_id::GlyphId;
pub use offset::{Offset, Offset16, Offset24, Offset32};
pub use raw::{BigEndian, FixedSize, Scalar};
pub use tag::{InvalidTag, Tag};
pub use uint24::Uint24;
pub use version::MajorMinor;

/// The tag reserved for "don't care" script/language selection.
pub const DFLT_SCRIPT: Tag = Tag::new(b"DFLT");
/// The tag reserved for "don't care" language selection.
pub const DFLT_LANG: Tag = Tag::new(b"dflt");
