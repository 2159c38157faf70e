//! Lookup flags and the glyph categories they filter on.
//!
//! Flags are a bit set with an embedded mark attachment class, so they are
//! implemented by hand rather than as a plain enumeration.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::class_def::GlyphClassDefinition;
use glyphfsm_core::GlyphId;

/// Lookup flag bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub struct LookupFlag(u16);

impl From<u16> for LookupFlag {
    fn from(bits: u16) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl From<LookupFlag> for u16 {
    fn from(flags: LookupFlag) -> Self {
        flags.0
    }
}

impl BitOr for LookupFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LookupFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl LookupFlag {
    /// Cursive attachment positions the last glyph of a sequence on the baseline.
    pub const RIGHT_TO_LEFT: Self = LookupFlag(0x0001);
    /// Skip base glyphs.
    pub const IGNORE_BASE_GLYPHS: Self = LookupFlag(0x0002);
    /// Skip ligatures.
    pub const IGNORE_LIGATURES: Self = LookupFlag(0x0004);
    /// Skip all combining marks.
    pub const IGNORE_MARKS: Self = LookupFlag(0x0008);
    /// A mark filtering set follows the lookup. Stored, not interpreted.
    pub const USE_MARK_FILTERING_SET: Self = LookupFlag(0x0010);

    const FLAG_MASK: Self = LookupFlag(0x1F);

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Construct from raw bits, discarding the reserved ones.
    pub fn from_bits_truncate(bits: u16) -> Self {
        const VALID_BITS: u16 = !0x00E0;
        Self(bits & VALID_BITS)
    }

    pub fn to_bits(self) -> u16 {
        self.0
    }

    /// Returns `true` if all of the flags in `other` are set in `self`.
    #[inline]
    pub const fn contains(&self, other: Self) -> bool {
        let other = other.0 & Self::FLAG_MASK.0;
        (self.0 & other) == other
    }

    /// Whether a glyph of `category` is passed over by a lookup with these flags.
    pub fn skips(self, category: GlyphCategory) -> bool {
        match category {
            GlyphCategory::Base => self.contains(Self::IGNORE_BASE_GLYPHS),
            GlyphCategory::Ligature => self.contains(Self::IGNORE_LIGATURES),
            GlyphCategory::Mark => self.contains(Self::IGNORE_MARKS),
            GlyphCategory::Unclassified | GlyphCategory::Component => false,
        }
    }

    /// Whether any flag affecting glyph skipping is set.
    pub fn filters_glyphs(self) -> bool {
        self.0 & (Self::IGNORE_BASE_GLYPHS.0 | Self::IGNORE_LIGATURES.0 | Self::IGNORE_MARKS.0) != 0
    }
}

/// Glyph category as assigned by a glyph-category class definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlyphCategory {
    Unclassified,
    Base,
    Ligature,
    Mark,
    Component,
}

impl GlyphCategory {
    /// Map a category class id (1 base, 2 ligature, 3 mark, 4 component).
    pub fn from_class(class: u16) -> Self {
        match class {
            1 => GlyphCategory::Base,
            2 => GlyphCategory::Ligature,
            3 => GlyphCategory::Mark,
            4 => GlyphCategory::Component,
            _ => GlyphCategory::Unclassified,
        }
    }

    /// Look up the category of `glyph` in a category class definition.
    pub fn of(categories: &GlyphClassDefinition, glyph: GlyphId) -> Self {
        Self::from_class(categories.class_of(glyph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_def::ClassRange;

    #[test]
    fn union_and_contains() {
        let flags = LookupFlag::IGNORE_MARKS | LookupFlag::IGNORE_LIGATURES;
        assert!(flags.contains(LookupFlag::IGNORE_MARKS));
        assert!(!flags.contains(LookupFlag::IGNORE_BASE_GLYPHS));
        assert!(flags.filters_glyphs());
        assert!(!LookupFlag::RIGHT_TO_LEFT.filters_glyphs());
    }

    #[test]
    fn truncate_reserved_bits() {
        assert_eq!(LookupFlag::from_bits_truncate(0x00FF).to_bits(), 0x001F);
    }

    #[test]
    fn skipping_by_category() {
        let categories = GlyphClassDefinition::ranges(vec![
            ClassRange::new(10, 19, 1),
            ClassRange::new(20, 29, 3),
        ])
        .unwrap();
        let flags = LookupFlag::IGNORE_MARKS;
        assert!(flags.skips(GlyphCategory::of(&categories, 25)));
        assert!(!flags.skips(GlyphCategory::of(&categories, 15)));
        assert!(!flags.skips(GlyphCategory::of(&categories, 99)));
    }
}
