// Rule expander: one lookup payload to an ordered list of transition paths.
//
// Each path is one rule: context probes first (lookahead in logical forward
// order, then lookback in logical reverse order), then the match transitions
// that consume glyphs and carry the actions, then an accept transition.
// Path order is rule priority.

use std::sync::Arc;

use glyphfsm_core::ProcessingDirection;
use glyphfsm_tables::transform::{
    ClassPairPosition, CursiveAttachment, LigatureSubst, MarkToBase, PairPosition,
    ReverseChainSingleSubst, SinglePosition, SinglePositionValues,
};
use glyphfsm_tables::{CoverageTable, LookupFlag, Transformation, TransformationTable};

use crate::ExpandError;
use crate::transition::{Action, GlyphMap, GlyphMatcher, GlyphSet, TransitionLabel, TransitionPath};

/// Expands lookups for an automaton processed in one fixed direction.
#[derive(Debug, Clone, Copy)]
pub struct RuleExpander {
    direction: ProcessingDirection,
}

impl RuleExpander {
    pub fn new(direction: ProcessingDirection) -> Self {
        Self { direction }
    }

    pub fn direction(&self) -> ProcessingDirection {
        self.direction
    }

    /// Expand one lookup into its rules, highest priority first.
    ///
    /// Fails if the lookup's subtype cannot run in this expander's direction.
    pub fn expand(&self, table: &TransformationTable) -> Result<Vec<TransitionPath>, ExpandError> {
        let kind = table.kind();
        let required = kind.natural_direction();
        if required != self.direction {
            return Err(ExpandError::DirectionMismatch {
                kind: kind.kind_name(),
                required,
                requested: self.direction,
            });
        }

        let flags = table.flags();
        let paths = match kind {
            Transformation::SingleDelta(t) => {
                single_action(t.coverage(), flags, Action::Delta(t.delta()))
            }
            Transformation::SingleReplace(t) => {
                let map: GlyphMap = t.pairs().collect();
                single_action(t.coverage(), flags, Action::Replace(Arc::new(map)))
            }
            Transformation::Multiple(t) => t
                .sequences()
                .map(|(glyph, sequence)| {
                    vec![
                        TransitionLabel::acting(
                            GlyphMatcher::Glyph(glyph),
                            flags,
                            Action::Expand(sequence.into()),
                        ),
                        TransitionLabel::accept(),
                    ]
                })
                .collect(),
            Transformation::Ligature(t) => expand_ligatures(t, flags),
            Transformation::ReverseChainSingle(t) => expand_reverse_chain(t, flags),
            Transformation::SinglePosition(t) => expand_single_position(t, flags),
            Transformation::PairPosition(t) => expand_pairs(t, flags),
            Transformation::ClassPairPosition(t) => expand_class_pairs(t, flags),
            Transformation::CursiveAttachment(t) => expand_cursive(t, flags),
            Transformation::MarkToBase(t) => expand_mark_to_base(t, flags),
        };
        log::trace!("expanded {} into {} paths", kind.kind_name(), paths.len());
        Ok(paths)
    }
}

fn coverage_set(coverage: &CoverageTable) -> GlyphMatcher {
    GlyphMatcher::Set(GlyphSet::new(coverage.glyphs()))
}

/// One rule applying `action` to any covered glyph.
fn single_action(coverage: &CoverageTable, flags: LookupFlag, action: Action) -> Vec<TransitionPath> {
    if coverage.is_empty() {
        return Vec::new();
    }
    vec![vec![
        TransitionLabel::acting(coverage_set(coverage), flags, action),
        TransitionLabel::accept(),
    ]]
}

fn expand_ligatures(table: &LigatureSubst, flags: LookupFlag) -> Vec<TransitionPath> {
    let mut paths = Vec::new();
    for (first, ligatures) in table.ligature_sets() {
        for ligature in ligatures {
            let action = Action::Ligate {
                glyph: ligature.glyph,
                components: ligature.component_count() as u16,
            };
            let glyphs = std::iter::once(first).chain(ligature.components.iter().copied());
            let mut path = Vec::with_capacity(ligature.component_count() + 1);
            let last = ligature.component_count() - 1;
            for (i, glyph) in glyphs.enumerate() {
                let matcher = GlyphMatcher::Glyph(glyph);
                path.push(if i == last {
                    TransitionLabel::acting(matcher, flags, action.clone())
                } else {
                    TransitionLabel::matching(matcher, flags)
                });
            }
            path.push(TransitionLabel::accept());
            paths.push(path);
        }
    }
    paths
}

fn expand_reverse_chain(table: &ReverseChainSingleSubst, flags: LookupFlag) -> Vec<TransitionPath> {
    if table.coverage().is_empty() {
        return Vec::new();
    }
    let mut path = Vec::new();
    // The input is a single glyph, so lookahead starts one past the match start.
    for (i, coverage) in table.lookahead().iter().enumerate() {
        path.push(TransitionLabel::probe(1 + i as i16, coverage_set(coverage), flags));
    }
    for (i, coverage) in table.backtrack().iter().enumerate() {
        path.push(TransitionLabel::probe(-1 - i as i16, coverage_set(coverage), flags));
    }
    let map: GlyphMap = table.pairs().collect();
    path.push(TransitionLabel::acting(
        coverage_set(table.coverage()),
        flags,
        Action::Replace(Arc::new(map)),
    ));
    path.push(TransitionLabel::accept());
    vec![path]
}

fn expand_single_position(table: &SinglePosition, flags: LookupFlag) -> Vec<TransitionPath> {
    match table.values() {
        SinglePositionValues::Shared(record) => {
            single_action(table.coverage(), flags, Action::Position(*record))
        }
        SinglePositionValues::PerGlyph(_) => table
            .records()
            .map(|(glyph, record)| {
                vec![
                    TransitionLabel::acting(GlyphMatcher::Glyph(glyph), flags, Action::Position(record)),
                    TransitionLabel::accept(),
                ]
            })
            .collect(),
    }
}

fn expand_pairs(table: &PairPosition, flags: LookupFlag) -> Vec<TransitionPath> {
    let mut paths = Vec::new();
    for (first, pairs) in table.pair_sets() {
        for pair in pairs {
            paths.push(vec![
                TransitionLabel::matching(GlyphMatcher::Glyph(first), flags),
                TransitionLabel::acting(
                    GlyphMatcher::Glyph(pair.second_glyph),
                    flags,
                    Action::PairAdjust {
                        first: pair.first,
                        second: pair.second,
                    },
                ),
                TransitionLabel::accept(),
            ]);
        }
    }
    paths
}

fn expand_class_pairs(table: &ClassPairPosition, flags: LookupFlag) -> Vec<TransitionPath> {
    let second_classes = Arc::new(table.second_classes().clone());
    let mut by_first_class: std::collections::BTreeMap<u16, Vec<u16>> = Default::default();
    for glyph in table.coverage().glyphs() {
        by_first_class
            .entry(table.first_classes().class_of(glyph))
            .or_default()
            .push(glyph);
    }

    let mut paths = Vec::new();
    for (class1, glyphs) in by_first_class {
        let first = GlyphMatcher::Set(GlyphSet::new(glyphs));
        for class2 in 0..table.class2_count() as u16 {
            let Some(record) = table.record(class1, class2) else {
                continue;
            };
            paths.push(vec![
                TransitionLabel::matching(first.clone(), flags),
                TransitionLabel::acting(
                    GlyphMatcher::Class {
                        classes: second_classes.clone(),
                        class: class2,
                    },
                    flags,
                    Action::PairAdjust {
                        first: record.first,
                        second: record.second,
                    },
                ),
                TransitionLabel::accept(),
            ]);
        }
    }
    paths
}

fn expand_cursive(table: &CursiveAttachment, flags: LookupFlag) -> Vec<TransitionPath> {
    let exits = table.glyphs_with_exit();
    let entries = table.glyphs_with_entry();
    if exits.is_empty() || entries.is_empty() {
        return Vec::new();
    }
    vec![vec![
        TransitionLabel::matching(GlyphMatcher::Set(GlyphSet::new(exits)), flags),
        TransitionLabel::acting(
            GlyphMatcher::Set(GlyphSet::new(entries)),
            flags,
            Action::CursiveLink(Arc::new(table.clone())),
        ),
        TransitionLabel::accept(),
    ]]
}

fn expand_mark_to_base(table: &MarkToBase, flags: LookupFlag) -> Vec<TransitionPath> {
    if table.mark_coverage().is_empty() || table.base_coverage().is_empty() {
        return Vec::new();
    }
    vec![vec![
        TransitionLabel::probe(
            -1,
            coverage_set(table.base_coverage()),
            flags | LookupFlag::IGNORE_MARKS,
        ),
        TransitionLabel::acting(
            coverage_set(table.mark_coverage()),
            flags,
            Action::MarkAttach(Arc::new(table.clone())),
        ),
        TransitionLabel::accept(),
    ]]
}
