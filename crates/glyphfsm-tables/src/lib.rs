//! Decoded layout tables consumed by the glyphfsm compiler.
//!
//! These are immutable, already-decoded representations of the OpenType
//! structures a lookup is made of. Binary decoding of the font container is
//! done elsewhere; this crate only validates what it is handed and answers
//! queries about it.
//!
//! - [`coverage`] -- coverage tables (glyph list / glyph ranges)
//! - [`class_def`] -- glyph class definitions (class list / class ranges)
//! - [`lookup_flag`] -- lookup flags and glyph categories
//! - [`value`] -- value records and anchors used by positioning lookups
//! - [`transform`] -- the closed set of substitution and positioning payloads

pub mod class_def;
pub mod coverage;
pub mod lookup_flag;
pub mod transform;
pub mod value;

pub use class_def::{ClassRange, GlyphClassDefinition};
pub use coverage::{CoverageRange, CoverageTable};
pub use lookup_flag::{GlyphCategory, LookupFlag};
pub use transform::{Transformation, TransformationTable};
pub use value::{Anchor, ValueRecord};

/// Error raised when a decoded table violates its structural invariants.
///
/// Tables are validated when they are constructed (or deserialized); a
/// malformed table is never partially built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("malformed {table}: {detail}")]
    Malformed { table: &'static str, detail: String },
    #[error("malformed {table}: payload has {actual} entries, coverage expects {expected}")]
    PayloadLength {
        table: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl TableError {
    pub(crate) fn malformed(table: &'static str, detail: impl Into<String>) -> Self {
        TableError::Malformed {
            table,
            detail: detail.into(),
        }
    }

    /// Fail with [`TableError::PayloadLength`] unless `actual == expected`.
    pub(crate) fn check_len(
        table: &'static str,
        expected: usize,
        actual: usize,
    ) -> Result<(), TableError> {
        if expected == actual {
            Ok(())
        } else {
            Err(TableError::PayloadLength {
                table,
                expected,
                actual,
            })
        }
    }
}
