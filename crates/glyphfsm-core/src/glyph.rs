// Glyph ids and the per-glyph positioning state carried through simulation.

use serde::{Deserialize, Serialize};

/// Numeric id of a glyph in a font, distinct from any Unicode code point.
pub type GlyphId = u16;

/// Accumulated position adjustment of a shaped glyph, in font units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlyphPosition {
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_advance: i32,
    pub y_advance: i32,
}

impl GlyphPosition {
    /// Returns `true` if no adjustment has been applied.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// One element of a glyph run: the glyph id plus its position adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapedGlyph {
    pub id: GlyphId,
    #[serde(default)]
    pub position: GlyphPosition,
}

impl ShapedGlyph {
    /// Create an unpositioned glyph.
    pub fn new(id: GlyphId) -> Self {
        Self {
            id,
            position: GlyphPosition::default(),
        }
    }
}

impl From<GlyphId> for ShapedGlyph {
    fn from(id: GlyphId) -> Self {
        Self::new(id)
    }
}
