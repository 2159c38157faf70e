// Transformation tables: one lookup's coverage, flags and subtype payload.
//
// The subtype set is closed: single/multiple/ligature/reverse-chaining
// substitution and single/pair/class-pair/cursive/mark-to-base positioning.
// Every payload is validated against its coverage before a
// `TransformationTable` can exist, whether built in code or deserialized.

use glyphfsm_core::{GlyphId, ProcessingDirection};
use serde::{Deserialize, Serialize};

use crate::TableError;
use crate::class_def::GlyphClassDefinition;
use crate::coverage::CoverageTable;
use crate::lookup_flag::LookupFlag;
use crate::value::{Anchor, ValueRecord};

/// Routes a payload's serde through a plain field mirror so deserialized
/// values pass the same `validate` as the constructor.
macro_rules! validated_serde {
    ($table:ident, $repr:ident { $($field:ident: $ty:ty),* $(,)? }) => {
        #[derive(Serialize, Deserialize)]
        struct $repr {
            $($field: $ty),*
        }

        impl TryFrom<$repr> for $table {
            type Error = TableError;

            fn try_from(repr: $repr) -> Result<Self, Self::Error> {
                let table = Self {
                    $($field: repr.$field),*
                };
                table.validate()?;
                Ok(table)
            }
        }

        impl From<$table> for $repr {
            fn from(table: $table) -> Self {
                Self {
                    $($field: table.$field),*
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Substitution payloads
// ---------------------------------------------------------------------------

/// Single substitution by adding a constant to the glyph id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SingleDeltaRepr", into = "SingleDeltaRepr")]
pub struct SingleDelta {
    coverage: CoverageTable,
    delta: i16,
}

impl SingleDelta {
    pub fn new(coverage: CoverageTable, delta: i16) -> Result<Self, TableError> {
        Ok(Self { coverage, delta })
    }

    pub fn coverage(&self) -> &CoverageTable {
        &self.coverage
    }

    pub fn delta(&self) -> i16 {
        self.delta
    }

    fn validate(&self) -> Result<(), TableError> {
        Ok(())
    }
}

validated_serde!(SingleDelta, SingleDeltaRepr {
    coverage: CoverageTable,
    delta: i16,
});

/// Single substitution by explicit replacement, one substitute per coverage index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SingleReplaceRepr", into = "SingleReplaceRepr")]
pub struct SingleReplace {
    coverage: CoverageTable,
    substitutes: Vec<GlyphId>,
}

impl SingleReplace {
    pub fn new(coverage: CoverageTable, substitutes: Vec<GlyphId>) -> Result<Self, TableError> {
        let table = Self {
            coverage,
            substitutes,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn coverage(&self) -> &CoverageTable {
        &self.coverage
    }

    pub fn substitute(&self, glyph: GlyphId) -> Option<GlyphId> {
        let index = self.coverage.coverage_index(glyph)?;
        self.substitutes.get(index as usize).copied()
    }

    /// `(covered glyph, substitute)` pairs in coverage order.
    pub fn pairs(&self) -> impl Iterator<Item = (GlyphId, GlyphId)> + '_ {
        self.coverage
            .iter()
            .map(|(index, glyph)| (glyph, self.substitutes[index as usize]))
    }

    fn validate(&self) -> Result<(), TableError> {
        TableError::check_len(
            "single substitution",
            self.coverage.index_bound(),
            self.substitutes.len(),
        )
    }
}

validated_serde!(SingleReplace, SingleReplaceRepr {
    coverage: CoverageTable,
    substitutes: Vec<GlyphId>,
});

/// One-to-many substitution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MultipleSubstRepr", into = "MultipleSubstRepr")]
pub struct MultipleSubst {
    coverage: CoverageTable,
    sequences: Vec<Vec<GlyphId>>,
}

impl MultipleSubst {
    pub fn new(coverage: CoverageTable, sequences: Vec<Vec<GlyphId>>) -> Result<Self, TableError> {
        let table = Self {
            coverage,
            sequences,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn coverage(&self) -> &CoverageTable {
        &self.coverage
    }

    /// `(covered glyph, replacement sequence)` pairs in coverage order.
    pub fn sequences(&self) -> impl Iterator<Item = (GlyphId, &[GlyphId])> + '_ {
        self.coverage
            .iter()
            .map(|(index, glyph)| (glyph, self.sequences[index as usize].as_slice()))
    }

    fn validate(&self) -> Result<(), TableError> {
        TableError::check_len(
            "multiple substitution",
            self.coverage.index_bound(),
            self.sequences.len(),
        )
    }
}

validated_serde!(MultipleSubst, MultipleSubstRepr {
    coverage: CoverageTable,
    sequences: Vec<Vec<GlyphId>>,
});

/// A ligature: the covered first glyph followed by `components` forms `glyph`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ligature {
    pub glyph: GlyphId,
    /// Components after the first (covered) one.
    pub components: Vec<GlyphId>,
}

impl Ligature {
    pub fn new(glyph: GlyphId, components: Vec<GlyphId>) -> Self {
        Self { glyph, components }
    }

    /// Total component count including the first glyph.
    pub fn component_count(&self) -> usize {
        self.components.len() + 1
    }
}

/// Many-to-one substitution. Ligature sets are tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LigatureSubstRepr", into = "LigatureSubstRepr")]
pub struct LigatureSubst {
    coverage: CoverageTable,
    ligature_sets: Vec<Vec<Ligature>>,
}

impl LigatureSubst {
    pub fn new(coverage: CoverageTable, ligature_sets: Vec<Vec<Ligature>>) -> Result<Self, TableError> {
        let table = Self {
            coverage,
            ligature_sets,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn coverage(&self) -> &CoverageTable {
        &self.coverage
    }

    /// `(first glyph, ligature set)` pairs in coverage order.
    pub fn ligature_sets(&self) -> impl Iterator<Item = (GlyphId, &[Ligature])> + '_ {
        self.coverage
            .iter()
            .map(|(index, glyph)| (glyph, self.ligature_sets[index as usize].as_slice()))
    }

    fn validate(&self) -> Result<(), TableError> {
        TableError::check_len(
            "ligature substitution",
            self.coverage.index_bound(),
            self.ligature_sets.len(),
        )?;
        let too_long = self
            .ligature_sets
            .iter()
            .flatten()
            .find(|lig| lig.component_count() > u16::MAX as usize);
        match too_long {
            Some(lig) => Err(TableError::malformed(
                "ligature substitution",
                format!("ligature {} has too many components", lig.glyph),
            )),
            None => Ok(()),
        }
    }
}

validated_serde!(LigatureSubst, LigatureSubstRepr {
    coverage: CoverageTable,
    ligature_sets: Vec<Vec<Ligature>>,
});

/// Reverse-chaining contextual single substitution.
///
/// `backtrack[i]` must match the glyph `i + 1` positions before the covered
/// glyph, `lookahead[i]` the glyph `i + 1` positions after it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ReverseChainSingleSubstRepr", into = "ReverseChainSingleSubstRepr")]
pub struct ReverseChainSingleSubst {
    coverage: CoverageTable,
    backtrack: Vec<CoverageTable>,
    lookahead: Vec<CoverageTable>,
    substitutes: Vec<GlyphId>,
}

impl ReverseChainSingleSubst {
    pub fn new(
        coverage: CoverageTable,
        backtrack: Vec<CoverageTable>,
        lookahead: Vec<CoverageTable>,
        substitutes: Vec<GlyphId>,
    ) -> Result<Self, TableError> {
        let table = Self {
            coverage,
            backtrack,
            lookahead,
            substitutes,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn coverage(&self) -> &CoverageTable {
        &self.coverage
    }

    pub fn backtrack(&self) -> &[CoverageTable] {
        &self.backtrack
    }

    pub fn lookahead(&self) -> &[CoverageTable] {
        &self.lookahead
    }

    pub fn pairs(&self) -> impl Iterator<Item = (GlyphId, GlyphId)> + '_ {
        self.coverage
            .iter()
            .map(|(index, glyph)| (glyph, self.substitutes[index as usize]))
    }

    fn validate(&self) -> Result<(), TableError> {
        TableError::check_len(
            "reverse chaining substitution",
            self.coverage.index_bound(),
            self.substitutes.len(),
        )?;
        if self.backtrack.len() > i16::MAX as usize || self.lookahead.len() > i16::MAX as usize {
            return Err(TableError::malformed(
                "reverse chaining substitution",
                "context is longer than the probe range",
            ));
        }
        Ok(())
    }
}

validated_serde!(ReverseChainSingleSubst, ReverseChainSingleSubstRepr {
    coverage: CoverageTable,
    backtrack: Vec<CoverageTable>,
    lookahead: Vec<CoverageTable>,
    substitutes: Vec<GlyphId>,
});

// ---------------------------------------------------------------------------
// Positioning payloads
// ---------------------------------------------------------------------------

/// Values of a single adjustment: one shared record or one per coverage index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SinglePositionValues {
    Shared(ValueRecord),
    PerGlyph(Vec<ValueRecord>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SinglePositionRepr", into = "SinglePositionRepr")]
pub struct SinglePosition {
    coverage: CoverageTable,
    values: SinglePositionValues,
}

impl SinglePosition {
    pub fn new(coverage: CoverageTable, values: SinglePositionValues) -> Result<Self, TableError> {
        let table = Self { coverage, values };
        table.validate()?;
        Ok(table)
    }

    pub fn coverage(&self) -> &CoverageTable {
        &self.coverage
    }

    pub fn values(&self) -> &SinglePositionValues {
        &self.values
    }

    /// `(covered glyph, record)` pairs in coverage order.
    pub fn records(&self) -> impl Iterator<Item = (GlyphId, ValueRecord)> + '_ {
        self.coverage.iter().map(|(index, glyph)| {
            let record = match &self.values {
                SinglePositionValues::Shared(record) => *record,
                SinglePositionValues::PerGlyph(records) => records[index as usize],
            };
            (glyph, record)
        })
    }

    fn validate(&self) -> Result<(), TableError> {
        match &self.values {
            SinglePositionValues::Shared(_) => Ok(()),
            SinglePositionValues::PerGlyph(records) => TableError::check_len(
                "single positioning",
                self.coverage.index_bound(),
                records.len(),
            ),
        }
    }
}

validated_serde!(SinglePosition, SinglePositionRepr {
    coverage: CoverageTable,
    values: SinglePositionValues,
});

/// Adjustment for one specific glyph pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairValue {
    pub second_glyph: GlyphId,
    #[serde(default)]
    pub first: ValueRecord,
    #[serde(default)]
    pub second: ValueRecord,
}

/// Pair positioning with individual pair records per first glyph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PairPositionRepr", into = "PairPositionRepr")]
pub struct PairPosition {
    coverage: CoverageTable,
    pair_sets: Vec<Vec<PairValue>>,
}

impl PairPosition {
    pub fn new(coverage: CoverageTable, pair_sets: Vec<Vec<PairValue>>) -> Result<Self, TableError> {
        let table = Self {
            coverage,
            pair_sets,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn coverage(&self) -> &CoverageTable {
        &self.coverage
    }

    /// `(first glyph, pair set)` pairs in coverage order.
    pub fn pair_sets(&self) -> impl Iterator<Item = (GlyphId, &[PairValue])> + '_ {
        self.coverage
            .iter()
            .map(|(index, glyph)| (glyph, self.pair_sets[index as usize].as_slice()))
    }

    fn validate(&self) -> Result<(), TableError> {
        TableError::check_len(
            "pair positioning",
            self.coverage.index_bound(),
            self.pair_sets.len(),
        )
    }
}

validated_serde!(PairPosition, PairPositionRepr {
    coverage: CoverageTable,
    pair_sets: Vec<Vec<PairValue>>,
});

/// Adjustment for one (class1, class2) cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassPairValue {
    pub first: ValueRecord,
    pub second: ValueRecord,
}

impl ClassPairValue {
    pub fn is_zero(&self) -> bool {
        self.first.is_zero() && self.second.is_zero()
    }
}

/// Pair positioning by glyph class: `records[class1][class2]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ClassPairPositionRepr", into = "ClassPairPositionRepr")]
pub struct ClassPairPosition {
    coverage: CoverageTable,
    first_classes: GlyphClassDefinition,
    second_classes: GlyphClassDefinition,
    records: Vec<Vec<ClassPairValue>>,
}

impl ClassPairPosition {
    pub fn new(
        coverage: CoverageTable,
        first_classes: GlyphClassDefinition,
        second_classes: GlyphClassDefinition,
        records: Vec<Vec<ClassPairValue>>,
    ) -> Result<Self, TableError> {
        let table = Self {
            coverage,
            first_classes,
            second_classes,
            records,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn coverage(&self) -> &CoverageTable {
        &self.coverage
    }

    pub fn first_classes(&self) -> &GlyphClassDefinition {
        &self.first_classes
    }

    pub fn second_classes(&self) -> &GlyphClassDefinition {
        &self.second_classes
    }

    pub fn class1_count(&self) -> usize {
        self.records.len()
    }

    pub fn class2_count(&self) -> usize {
        self.records.first().map_or(0, Vec::len)
    }

    pub fn record(&self, class1: u16, class2: u16) -> Option<&ClassPairValue> {
        self.records.get(class1 as usize)?.get(class2 as usize)
    }

    fn validate(&self) -> Result<(), TableError> {
        const TABLE: &str = "class pair positioning";
        let columns = self.class2_count();
        if let Some(row) = self.records.iter().position(|r| r.len() != columns) {
            return Err(TableError::malformed(
                TABLE,
                format!("class row {row} does not have {columns} columns"),
            ));
        }
        if self.class1_count() == 0 {
            return Ok(());
        }
        if self.first_classes.max_class() as usize >= self.class1_count() {
            return Err(TableError::malformed(
                TABLE,
                format!(
                    "first class {} has no row in a {}-row matrix",
                    self.first_classes.max_class(),
                    self.class1_count()
                ),
            ));
        }
        if self.second_classes.max_class() as usize >= columns {
            return Err(TableError::malformed(
                TABLE,
                format!(
                    "second class {} has no column in a {columns}-column matrix",
                    self.second_classes.max_class()
                ),
            ));
        }
        Ok(())
    }
}

validated_serde!(ClassPairPosition, ClassPairPositionRepr {
    coverage: CoverageTable,
    first_classes: GlyphClassDefinition,
    second_classes: GlyphClassDefinition,
    records: Vec<Vec<ClassPairValue>>,
});

/// Entry and exit anchors of one cursive glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryExit {
    pub entry: Option<Anchor>,
    pub exit: Option<Anchor>,
}

/// Cursive attachment: the exit anchor of one glyph links to the entry anchor
/// of the next.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CursiveAttachmentRepr", into = "CursiveAttachmentRepr")]
pub struct CursiveAttachment {
    coverage: CoverageTable,
    entry_exits: Vec<EntryExit>,
}

impl CursiveAttachment {
    pub fn new(coverage: CoverageTable, entry_exits: Vec<EntryExit>) -> Result<Self, TableError> {
        let table = Self {
            coverage,
            entry_exits,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn coverage(&self) -> &CoverageTable {
        &self.coverage
    }

    pub fn entry_exit(&self, glyph: GlyphId) -> Option<&EntryExit> {
        let index = self.coverage.coverage_index(glyph)?;
        self.entry_exits.get(index as usize)
    }

    /// Covered glyphs that have an exit anchor, ascending.
    pub fn glyphs_with_exit(&self) -> Vec<GlyphId> {
        self.glyphs_where(|ee| ee.exit.is_some())
    }

    /// Covered glyphs that have an entry anchor, ascending.
    pub fn glyphs_with_entry(&self) -> Vec<GlyphId> {
        self.glyphs_where(|ee| ee.entry.is_some())
    }

    fn glyphs_where(&self, pred: impl Fn(&EntryExit) -> bool) -> Vec<GlyphId> {
        let mut glyphs: Vec<GlyphId> = self
            .coverage
            .iter()
            .filter(|(index, _)| pred(&self.entry_exits[*index as usize]))
            .map(|(_, glyph)| glyph)
            .collect();
        glyphs.sort_unstable();
        glyphs
    }

    fn validate(&self) -> Result<(), TableError> {
        TableError::check_len(
            "cursive attachment",
            self.coverage.index_bound(),
            self.entry_exits.len(),
        )
    }
}

validated_serde!(CursiveAttachment, CursiveAttachmentRepr {
    coverage: CoverageTable,
    entry_exits: Vec<EntryExit>,
});

/// Class and anchor of one mark glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkRecord {
    pub class: u16,
    pub anchor: Anchor,
}

/// Mark-to-base attachment.
///
/// `bases[i][class]` is the anchor on base glyph `i` (by base coverage index)
/// that marks of `class` attach to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MarkToBaseRepr", into = "MarkToBaseRepr")]
pub struct MarkToBase {
    mark_coverage: CoverageTable,
    base_coverage: CoverageTable,
    class_count: u16,
    marks: Vec<MarkRecord>,
    bases: Vec<Vec<Option<Anchor>>>,
}

impl MarkToBase {
    pub fn new(
        mark_coverage: CoverageTable,
        base_coverage: CoverageTable,
        class_count: u16,
        marks: Vec<MarkRecord>,
        bases: Vec<Vec<Option<Anchor>>>,
    ) -> Result<Self, TableError> {
        let table = Self {
            mark_coverage,
            base_coverage,
            class_count,
            marks,
            bases,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn mark_coverage(&self) -> &CoverageTable {
        &self.mark_coverage
    }

    pub fn base_coverage(&self) -> &CoverageTable {
        &self.base_coverage
    }

    pub fn class_count(&self) -> u16 {
        self.class_count
    }

    pub fn mark(&self, glyph: GlyphId) -> Option<&MarkRecord> {
        let index = self.mark_coverage.coverage_index(glyph)?;
        self.marks.get(index as usize)
    }

    /// Anchor on `base` for marks of `class`.
    pub fn base_anchor(&self, base: GlyphId, class: u16) -> Option<Anchor> {
        let index = self.base_coverage.coverage_index(base)?;
        *self.bases.get(index as usize)?.get(class as usize)?
    }

    fn validate(&self) -> Result<(), TableError> {
        const TABLE: &str = "mark-to-base attachment";
        TableError::check_len(TABLE, self.mark_coverage.index_bound(), self.marks.len())?;
        TableError::check_len(TABLE, self.base_coverage.index_bound(), self.bases.len())?;
        if let Some(mark) = self.marks.iter().find(|m| m.class >= self.class_count) {
            return Err(TableError::malformed(
                TABLE,
                format!(
                    "mark class {} is outside the {} declared classes",
                    mark.class, self.class_count
                ),
            ));
        }
        if let Some(row) = self
            .bases
            .iter()
            .position(|anchors| anchors.len() != self.class_count as usize)
        {
            return Err(TableError::malformed(
                TABLE,
                format!("base record {row} does not have {} anchors", self.class_count),
            ));
        }
        Ok(())
    }
}

validated_serde!(MarkToBase, MarkToBaseRepr {
    mark_coverage: CoverageTable,
    base_coverage: CoverageTable,
    class_count: u16,
    marks: Vec<MarkRecord>,
    bases: Vec<Vec<Option<Anchor>>>,
});

// ---------------------------------------------------------------------------
// Transformation
// ---------------------------------------------------------------------------

/// The closed set of lookup payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transformation {
    SingleDelta(SingleDelta),
    SingleReplace(SingleReplace),
    Multiple(MultipleSubst),
    Ligature(LigatureSubst),
    ReverseChainSingle(ReverseChainSingleSubst),
    SinglePosition(SinglePosition),
    PairPosition(PairPosition),
    ClassPairPosition(ClassPairPosition),
    CursiveAttachment(CursiveAttachment),
    MarkToBase(MarkToBase),
}

impl Transformation {
    /// Short name of the subtype, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Transformation::SingleDelta(_) => "single delta substitution",
            Transformation::SingleReplace(_) => "single substitution",
            Transformation::Multiple(_) => "multiple substitution",
            Transformation::Ligature(_) => "ligature substitution",
            Transformation::ReverseChainSingle(_) => "reverse chaining substitution",
            Transformation::SinglePosition(_) => "single positioning",
            Transformation::PairPosition(_) => "pair positioning",
            Transformation::ClassPairPosition(_) => "class pair positioning",
            Transformation::CursiveAttachment(_) => "cursive attachment",
            Transformation::MarkToBase(_) => "mark-to-base attachment",
        }
    }

    /// The direction a lookup of this subtype is processed in.
    pub fn natural_direction(&self) -> ProcessingDirection {
        match self {
            Transformation::ReverseChainSingle(_) => ProcessingDirection::Backward,
            _ => ProcessingDirection::Forward,
        }
    }

    /// The coverage of the glyph the lookup is anchored on (the mark, for
    /// mark-to-base).
    pub fn coverage(&self) -> &CoverageTable {
        match self {
            Transformation::SingleDelta(t) => t.coverage(),
            Transformation::SingleReplace(t) => t.coverage(),
            Transformation::Multiple(t) => t.coverage(),
            Transformation::Ligature(t) => t.coverage(),
            Transformation::ReverseChainSingle(t) => t.coverage(),
            Transformation::SinglePosition(t) => t.coverage(),
            Transformation::PairPosition(t) => t.coverage(),
            Transformation::ClassPairPosition(t) => t.coverage(),
            Transformation::CursiveAttachment(t) => t.coverage(),
            Transformation::MarkToBase(t) => t.mark_coverage(),
        }
    }

    fn validate(&self) -> Result<(), TableError> {
        match self {
            Transformation::SingleDelta(t) => t.validate(),
            Transformation::SingleReplace(t) => t.validate(),
            Transformation::Multiple(t) => t.validate(),
            Transformation::Ligature(t) => t.validate(),
            Transformation::ReverseChainSingle(t) => t.validate(),
            Transformation::SinglePosition(t) => t.validate(),
            Transformation::PairPosition(t) => t.validate(),
            Transformation::ClassPairPosition(t) => t.validate(),
            Transformation::CursiveAttachment(t) => t.validate(),
            Transformation::MarkToBase(t) => t.validate(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TransformationRepr {
    #[serde(default)]
    flags: LookupFlag,
    kind: Transformation,
}

/// One active lookup: flags plus a validated payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TransformationRepr", into = "TransformationRepr")]
pub struct TransformationTable {
    flags: LookupFlag,
    kind: Transformation,
}

impl TransformationTable {
    pub fn new(flags: LookupFlag, kind: Transformation) -> Result<Self, TableError> {
        kind.validate()?;
        Ok(Self { flags, kind })
    }

    pub fn flags(&self) -> LookupFlag {
        self.flags
    }

    pub fn kind(&self) -> &Transformation {
        &self.kind
    }
}

impl TryFrom<TransformationRepr> for TransformationTable {
    type Error = TableError;

    fn try_from(repr: TransformationRepr) -> Result<Self, Self::Error> {
        Self::new(repr.flags, repr.kind)
    }
}

impl From<TransformationTable> for TransformationRepr {
    fn from(table: TransformationTable) -> Self {
        Self {
            flags: table.flags,
            kind: table.kind,
        }
    }
}
