// Value records and anchors used by positioning payloads.

use glyphfsm_core::GlyphPosition;
use serde::{Deserialize, Serialize};

/// Placement and advance deltas applied to one glyph, in font units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueRecord {
    pub x_placement: i16,
    pub y_placement: i16,
    pub x_advance: i16,
    pub y_advance: i16,
}

impl ValueRecord {
    /// A record that only changes the horizontal advance.
    pub fn advance(x_advance: i16) -> Self {
        Self {
            x_advance,
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Add this record's deltas onto `position`.
    pub fn apply_to(&self, position: &mut GlyphPosition) {
        position.x_offset += i32::from(self.x_placement);
        position.y_offset += i32::from(self.y_placement);
        position.x_advance += i32::from(self.x_advance);
        position.y_advance += i32::from(self.y_advance);
    }
}

/// An attachment point on a glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub x: i16,
    pub y: i16,
}

impl Anchor {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}
