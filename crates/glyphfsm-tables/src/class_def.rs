// Glyph class definitions: a partition of glyphs into numbered classes.

use std::collections::BTreeMap;

use glyphfsm_core::GlyphId;
use serde::{Deserialize, Serialize};

use crate::TableError;

const TABLE: &str = "class definition";

/// Glyphs `min_glyph_id..=max_glyph_id` all belong to `class`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassRange {
    pub min_glyph_id: GlyphId,
    pub max_glyph_id: GlyphId,
    pub class: u16,
}

impl ClassRange {
    pub fn new(min_glyph_id: GlyphId, max_glyph_id: GlyphId, class: u16) -> Self {
        Self {
            min_glyph_id,
            max_glyph_id,
            class,
        }
    }
}

/// The two on-disk shapes of a class definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassDefFormat {
    /// `classes[i]` is the class of glyph `first_glyph_id + i`.
    List {
        first_glyph_id: GlyphId,
        classes: Vec<u16>,
    },
    /// Ascending, non-overlapping glyph ranges, one class each.
    Range { ranges: Vec<ClassRange> },
}

/// A validated glyph class definition.
///
/// Glyphs not mentioned by the definition are in class 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ClassDefFormat", into = "ClassDefFormat")]
pub struct GlyphClassDefinition {
    format: ClassDefFormat,
}

impl GlyphClassDefinition {
    /// Build a list class definition.
    pub fn list(first_glyph_id: GlyphId, classes: Vec<u16>) -> Result<Self, TableError> {
        if !classes.is_empty() && first_glyph_id as usize + classes.len() - 1 > u16::MAX as usize {
            return Err(TableError::malformed(
                TABLE,
                format!(
                    "{} classes starting at glyph {} run past the last glyph id",
                    classes.len(),
                    first_glyph_id
                ),
            ));
        }
        Ok(Self {
            format: ClassDefFormat::List {
                first_glyph_id,
                classes,
            },
        })
    }

    /// Build a range class definition. Ranges must be ascending and must not
    /// overlap.
    pub fn ranges(ranges: Vec<ClassRange>) -> Result<Self, TableError> {
        for range in &ranges {
            if range.min_glyph_id > range.max_glyph_id {
                return Err(TableError::malformed(
                    TABLE,
                    format!(
                        "range {}..={} has min above max",
                        range.min_glyph_id, range.max_glyph_id
                    ),
                ));
            }
        }
        if let Some(pair) = ranges
            .windows(2)
            .find(|w| w[1].min_glyph_id <= w[0].max_glyph_id)
        {
            return Err(TableError::malformed(
                TABLE,
                format!(
                    "range {}..={} overlaps or precedes {}..={}",
                    pair[1].min_glyph_id,
                    pair[1].max_glyph_id,
                    pair[0].min_glyph_id,
                    pair[0].max_glyph_id
                ),
            ));
        }
        Ok(Self {
            format: ClassDefFormat::Range { ranges },
        })
    }

    /// A definition that assigns no glyph to any class.
    pub fn empty() -> Self {
        Self {
            format: ClassDefFormat::Range { ranges: Vec::new() },
        }
    }

    pub fn format(&self) -> &ClassDefFormat {
        &self.format
    }

    /// Class of `glyph`; 0 when the definition does not mention it.
    pub fn class_of(&self, glyph: GlyphId) -> u16 {
        match &self.format {
            ClassDefFormat::List {
                first_glyph_id,
                classes,
            } => glyph
                .checked_sub(*first_glyph_id)
                .and_then(|offset| classes.get(offset as usize))
                .copied()
                .unwrap_or(0),
            ClassDefFormat::Range { ranges } => {
                let pos = ranges.partition_point(|r| r.max_glyph_id < glyph);
                match ranges.get(pos) {
                    Some(range) if range.min_glyph_id <= glyph => range.class,
                    _ => 0,
                }
            }
        }
    }

    /// Iterate every explicitly assigned `(glyph, class)` pair in glyph order.
    /// Range entries are expanded into individual glyphs.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (GlyphId, u16)> + '_> {
        match &self.format {
            ClassDefFormat::List {
                first_glyph_id,
                classes,
            } => {
                let first = *first_glyph_id;
                Box::new(
                    classes
                        .iter()
                        .enumerate()
                        .map(move |(i, &class)| (first + i as u16, class)),
                )
            }
            ClassDefFormat::Range { ranges } => Box::new(
                ranges
                    .iter()
                    .flat_map(|r| (r.min_glyph_id..=r.max_glyph_id).map(move |g| (g, r.class))),
            ),
        }
    }

    /// Group glyph ids by class id.
    ///
    /// An empty definition yields an empty grouping. Members of a group are
    /// listed in ascending glyph order.
    pub fn class_assignments(&self) -> BTreeMap<u16, Vec<GlyphId>> {
        let mut groups: BTreeMap<u16, Vec<GlyphId>> = BTreeMap::new();
        for (glyph, class) in self.iter() {
            groups.entry(class).or_default().push(glyph);
        }
        groups
    }

    /// Largest class id used; 0 for an empty definition.
    pub fn max_class(&self) -> u16 {
        self.iter().map(|(_, class)| class).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        match &self.format {
            ClassDefFormat::List { classes, .. } => classes.is_empty(),
            ClassDefFormat::Range { ranges } => ranges.is_empty(),
        }
    }
}

impl Default for GlyphClassDefinition {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<ClassDefFormat> for GlyphClassDefinition {
    type Error = TableError;

    fn try_from(format: ClassDefFormat) -> Result<Self, Self::Error> {
        match format {
            ClassDefFormat::List {
                first_glyph_id,
                classes,
            } => Self::list(first_glyph_id, classes),
            ClassDefFormat::Range { ranges } => Self::ranges(ranges),
        }
    }
}

impl From<GlyphClassDefinition> for ClassDefFormat {
    fn from(def: GlyphClassDefinition) -> Self {
        def.format
    }
}
