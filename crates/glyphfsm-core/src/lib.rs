//! Shared types for the glyphfsm layout-rule compiler.
//!
//! - [`glyph`] -- glyph ids, position adjustments and shaped glyphs
//! - [`direction`] -- processing direction of an automaton
//! - [`sequence`] -- the mutable, bidirectionally navigable glyph run

pub mod direction;
pub mod glyph;
pub mod sequence;

pub use direction::ProcessingDirection;
pub use glyph::{GlyphId, GlyphPosition, ShapedGlyph};
pub use sequence::GlyphSequence;
