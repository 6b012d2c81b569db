//! Error types surfaced across the shaping pipeline's public entry points.
//!
//! Per the core's error taxonomy, malformed font data never escapes as a
//! hard failure: a subtable that cannot be parsed degrades to "this rule
//! does not match" inside the dispatcher and context matcher. The errors
//! here are for the handful of places that *do* have a caller-visible
//! failure mode: resource exhaustion and the font protocol boundary.

/// Errors a [`crate::processor::TextProcessor`] run can report to its caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("allocation failed while growing the album")]
    AllocationFailed,
    #[error("font protocol error: {0}")]
    Font(#[from] FontError),
}

/// Errors from the [`crate::font::Font`] protocol boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FontError {
    #[error("the {0} table is missing from this font")]
    TableMissing(&'static str),
    #[error("font table data is malformed: {0}")]
    Malformed(&'static str),
}
