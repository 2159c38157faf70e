// Coverage tables: the contiguous index over the glyphs a lookup affects.

use std::collections::BTreeMap;

use glyphfsm_core::GlyphId;
use serde::{Deserialize, Serialize};

use crate::TableError;

const TABLE: &str = "coverage table";

/// One record of a range coverage: glyphs `min_glyph_id..=max_glyph_id`
/// receive consecutive coverage indices starting at `first_coverage_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverageRange {
    pub first_coverage_index: u16,
    pub min_glyph_id: GlyphId,
    pub max_glyph_id: GlyphId,
}

impl CoverageRange {
    pub fn new(first_coverage_index: u16, min_glyph_id: GlyphId, max_glyph_id: GlyphId) -> Self {
        Self {
            first_coverage_index,
            min_glyph_id,
            max_glyph_id,
        }
    }

    /// Number of glyphs in the range. Only meaningful once validated.
    fn glyph_count(&self) -> usize {
        (self.max_glyph_id - self.min_glyph_id) as usize + 1
    }

    fn iter(&self) -> impl Iterator<Item = (u16, GlyphId)> + '_ {
        (self.min_glyph_id..=self.max_glyph_id)
            .map(move |glyph| (self.first_coverage_index + (glyph - self.min_glyph_id), glyph))
    }
}

/// The two on-disk shapes of a coverage table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageFormat {
    /// Ascending, distinct glyph ids; the coverage index is the list position.
    List { glyphs: Vec<GlyphId> },
    /// Ascending, non-overlapping glyph ranges with explicit start indices.
    Range { ranges: Vec<CoverageRange> },
}

/// A validated coverage table.
///
/// Construction checks the format's invariants, so every instance has
/// unique, increasing coverage indices and non-overlapping glyph ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CoverageFormat", into = "CoverageFormat")]
pub struct CoverageTable {
    format: CoverageFormat,
}

impl CoverageTable {
    /// Build a list coverage from ascending, distinct glyph ids.
    pub fn list(glyphs: Vec<GlyphId>) -> Result<Self, TableError> {
        if let Some(pair) = glyphs.windows(2).find(|w| w[0] >= w[1]) {
            return Err(TableError::malformed(
                TABLE,
                format!(
                    "glyph list is not strictly ascending ({} followed by {})",
                    pair[0], pair[1]
                ),
            ));
        }
        if glyphs.len() > u16::MAX as usize + 1 {
            return Err(TableError::malformed(TABLE, "more glyphs than coverage indices"));
        }
        Ok(Self {
            format: CoverageFormat::List { glyphs },
        })
    }

    /// Build a range coverage.
    ///
    /// Ranges must be in ascending glyph order without overlap, and each
    /// range's indices must start after the previous range's last index.
    pub fn ranges(ranges: Vec<CoverageRange>) -> Result<Self, TableError> {
        let mut previous: Option<&CoverageRange> = None;
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
            let last_index = range.first_coverage_index as usize + range.glyph_count() - 1;
            if last_index > u16::MAX as usize {
                return Err(TableError::malformed(
                    TABLE,
                    format!("range starting at glyph {} overflows coverage indices", range.min_glyph_id),
                ));
            }
            if let Some(prev) = previous {
                if range.min_glyph_id <= prev.max_glyph_id {
                    return Err(TableError::malformed(
                        TABLE,
                        format!(
                            "range {}..={} overlaps or precedes {}..={}",
                            range.min_glyph_id,
                            range.max_glyph_id,
                            prev.min_glyph_id,
                            prev.max_glyph_id
                        ),
                    ));
                }
                let prev_end = prev.first_coverage_index as usize + prev.glyph_count();
                if (range.first_coverage_index as usize) < prev_end {
                    return Err(TableError::malformed(
                        TABLE,
                        format!(
                            "coverage index {} repeats or decreases after index {}",
                            range.first_coverage_index,
                            prev_end - 1
                        ),
                    ));
                }
            }
            previous = Some(range);
        }
        Ok(Self {
            format: CoverageFormat::Range { ranges },
        })
    }

    /// The underlying format.
    pub fn format(&self) -> &CoverageFormat {
        &self.format
    }

    /// Iterate `(coverage index, glyph)` pairs in coverage-index order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (u16, GlyphId)> + '_> {
        match &self.format {
            CoverageFormat::List { glyphs } => {
                Box::new(glyphs.iter().enumerate().map(|(i, &g)| (i as u16, g)))
            }
            CoverageFormat::Range { ranges } => Box::new(ranges.iter().flat_map(CoverageRange::iter)),
        }
    }

    /// Covered glyphs in coverage-index order.
    pub fn glyphs(&self) -> impl Iterator<Item = GlyphId> + '_ {
        self.iter().map(|(_, glyph)| glyph)
    }

    /// The coverage-index to glyph mapping.
    ///
    /// Deterministic and side-effect free; repeated calls return equal maps.
    pub fn covered_glyph_ids(&self) -> BTreeMap<u16, GlyphId> {
        self.iter().collect()
    }

    /// Coverage index of `glyph`, if covered.
    pub fn coverage_index(&self, glyph: GlyphId) -> Option<u16> {
        match &self.format {
            CoverageFormat::List { glyphs } => glyphs.binary_search(&glyph).ok().map(|i| i as u16),
            CoverageFormat::Range { ranges } => {
                let pos = ranges.partition_point(|r| r.max_glyph_id < glyph);
                let range = ranges.get(pos)?;
                (range.min_glyph_id <= glyph)
                    .then(|| range.first_coverage_index + (glyph - range.min_glyph_id))
            }
        }
    }

    pub fn contains(&self, glyph: GlyphId) -> bool {
        self.coverage_index(glyph).is_some()
    }

    /// Number of covered glyphs.
    pub fn glyph_count(&self) -> usize {
        match &self.format {
            CoverageFormat::List { glyphs } => glyphs.len(),
            CoverageFormat::Range { ranges } => ranges.iter().map(CoverageRange::glyph_count).sum(),
        }
    }

    /// One past the largest coverage index. Index-addressed payloads must
    /// have exactly this many entries.
    pub fn index_bound(&self) -> usize {
        match &self.format {
            CoverageFormat::List { glyphs } => glyphs.len(),
            CoverageFormat::Range { ranges } => ranges
                .last()
                .map(|r| r.first_coverage_index as usize + r.glyph_count())
                .unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.glyph_count() == 0
    }
}

impl TryFrom<CoverageFormat> for CoverageTable {
    type Error = TableError;

    fn try_from(format: CoverageFormat) -> Result<Self, Self::Error> {
        match format {
            CoverageFormat::List { glyphs } => Self::list(glyphs),
            CoverageFormat::Range { ranges } => Self::ranges(ranges),
        }
    }
}

impl From<CoverageTable> for CoverageFormat {
    fn from(table: CoverageTable) -> Self {
        table.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_coverage_indices() {
        let table = CoverageTable::list(vec![5, 9, 12, 20]).unwrap();
        let expected: BTreeMap<u16, GlyphId> = [(0, 5), (1, 9), (2, 12), (3, 20)].into();
        assert_eq!(table.covered_glyph_ids(), expected);
        assert_eq!(table.index_bound(), 4);
    }

    #[test]
    fn range_coverage_indices() {
        let table = CoverageTable::ranges(vec![
            CoverageRange::new(5, 10, 12),
            CoverageRange::new(10, 20, 22),
        ])
        .unwrap();
        let expected: BTreeMap<u16, GlyphId> =
            [(5, 10), (6, 11), (7, 12), (10, 20), (11, 21), (12, 22)].into();
        assert_eq!(table.covered_glyph_ids(), expected);
        // repeated calls are stable
        assert_eq!(table.covered_glyph_ids(), expected);
        assert_eq!(table.glyph_count(), 6);
        assert_eq!(table.index_bound(), 13);
    }

    #[test]
    fn lookup_by_glyph() {
        let table = CoverageTable::ranges(vec![
            CoverageRange::new(0, 10, 12),
            CoverageRange::new(3, 20, 22),
        ])
        .unwrap();
        assert_eq!(table.coverage_index(11), Some(1));
        assert_eq!(table.coverage_index(22), Some(5));
        assert_eq!(table.coverage_index(15), None);
        assert_eq!(table.coverage_index(9), None);
        assert_eq!(table.coverage_index(23), None);

        let list = CoverageTable::list(vec![3, 8]).unwrap();
        assert_eq!(list.coverage_index(8), Some(1));
        assert!(!list.contains(4));
    }

    #[test]
    fn reject_unsorted_list() {
        let err = CoverageTable::list(vec![5, 3]).unwrap_err();
        assert!(matches!(err, TableError::Malformed { .. }));
        assert!(CoverageTable::list(vec![5, 5]).is_err());
    }

    #[test]
    fn reject_overlapping_ranges() {
        let err = CoverageTable::ranges(vec![
            CoverageRange::new(0, 10, 15),
            CoverageRange::new(6, 15, 20),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::Malformed { .. }));
    }

    #[test]
    fn reject_repeated_indices() {
        let err = CoverageTable::ranges(vec![
            CoverageRange::new(0, 10, 12),
            CoverageRange::new(2, 20, 22),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("coverage index"));
    }

    #[test]
    fn reject_inverted_range() {
        assert!(CoverageTable::ranges(vec![CoverageRange::new(0, 12, 10)]).is_err());
    }

    #[test]
    fn empty_coverage() {
        let table = CoverageTable::ranges(Vec::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.index_bound(), 0);
        assert!(table.covered_glyph_ids().is_empty());
    }

    #[test]
    fn deserialize_validates() {
        let ok: CoverageTable = serde_json::from_str(r#"{"List":{"glyphs":[1,2,3]}}"#).unwrap();
        assert_eq!(ok.glyph_count(), 3);

        let bad = serde_json::from_str::<CoverageTable>(r#"{"List":{"glyphs":[3,2]}}"#);
        assert!(bad.is_err());
    }
}
