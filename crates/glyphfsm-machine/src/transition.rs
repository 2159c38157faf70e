// Transitions: a predicate over the glyph run, an optional action, a target.
//
// The (predicate, action) pair is the identity of a transition. The builder
// shares prefixes on it, the optimizer and the comparator test it for
// equality. Shared payloads are behind `Arc` so a finished automaton can be
// read from several threads.

use std::collections::BTreeMap;
use std::sync::Arc;

use glyphfsm_core::GlyphId;
use glyphfsm_tables::transform::{CursiveAttachment, MarkToBase};
use glyphfsm_tables::{GlyphClassDefinition, LookupFlag, ValueRecord};

use crate::machine::StateId;

/// A sorted, duplicate-free set of glyph ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlyphSet(Arc<[GlyphId]>);

impl GlyphSet {
    pub fn new(glyphs: impl IntoIterator<Item = GlyphId>) -> Self {
        let mut glyphs: Vec<GlyphId> = glyphs.into_iter().collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        Self(glyphs.into())
    }

    pub fn contains(&self, glyph: GlyphId) -> bool {
        self.0.binary_search(&glyph).is_ok()
    }

    pub fn as_slice(&self) -> &[GlyphId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Membership test applied to a single glyph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlyphMatcher {
    Glyph(GlyphId),
    Set(GlyphSet),
    /// The glyph's class in `classes` equals `class`. Class 0 matches every
    /// glyph the definition does not assign.
    Class {
        classes: Arc<GlyphClassDefinition>,
        class: u16,
    },
}

impl GlyphMatcher {
    #[inline]
    pub fn matches(&self, glyph: GlyphId) -> bool {
        match self {
            GlyphMatcher::Glyph(g) => *g == glyph,
            GlyphMatcher::Set(set) => set.contains(glyph),
            GlyphMatcher::Class { classes, class } => classes.class_of(glyph) == *class,
        }
    }
}

/// What a transition tests before it may be taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Context-only test of the glyph `offset` non-skipped positions away from
    /// the match start (negative: lookback). Consumes nothing.
    Probe {
        offset: i16,
        matcher: GlyphMatcher,
        flags: LookupFlag,
    },
    /// Tests the next non-skipped glyph at the consumption position and
    /// consumes it.
    Match {
        matcher: GlyphMatcher,
        flags: LookupFlag,
    },
    /// End of a rule. Taking it accepts the path walked so far.
    Accept,
}

impl Predicate {
    pub fn is_accept(&self) -> bool {
        matches!(self, Predicate::Accept)
    }

    pub fn is_probe(&self) -> bool {
        matches!(self, Predicate::Probe { .. })
    }
}

/// Glyph-to-glyph replacement map.
pub type GlyphMap = BTreeMap<GlyphId, GlyphId>;

/// A transformation bound to the glyph consumed by its transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Add a constant to the glyph id, wrapping at 16 bits.
    Delta(i16),
    /// Replace the glyph through a map; unmapped glyphs are left alone.
    Replace(Arc<GlyphMap>),
    /// Replace the glyph with a sequence.
    Expand(Arc<[GlyphId]>),
    /// Merge the last `components` consumed glyphs into `glyph`.
    Ligate { glyph: GlyphId, components: u16 },
    /// Adjust the glyph's position.
    Position(ValueRecord),
    /// Adjust the previous consumed glyph by `first` and this one by `second`.
    PairAdjust {
        first: ValueRecord,
        second: ValueRecord,
    },
    /// Link the previous consumed glyph's exit anchor to this glyph's entry anchor.
    CursiveLink(Arc<CursiveAttachment>),
    /// Attach this mark to the base found by the lookback probe at offset -1.
    MarkAttach(Arc<MarkToBase>),
}

impl Action {
    /// Whether the last consumed glyph stays available to the next match.
    ///
    /// A pair adjustment that leaves the second glyph untouched and a cursive
    /// link both let the second glyph start the next pair or chain.
    pub fn retains_last(&self) -> bool {
        match self {
            Action::PairAdjust { second, .. } => second.is_zero(),
            Action::CursiveLink(_) => true,
            _ => false,
        }
    }
}

/// The identity of a transition: predicate plus optional action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionLabel {
    pub predicate: Predicate,
    pub action: Option<Action>,
}

impl TransitionLabel {
    pub fn probe(offset: i16, matcher: GlyphMatcher, flags: LookupFlag) -> Self {
        Self {
            predicate: Predicate::Probe {
                offset,
                matcher,
                flags,
            },
            action: None,
        }
    }

    pub fn matching(matcher: GlyphMatcher, flags: LookupFlag) -> Self {
        Self {
            predicate: Predicate::Match { matcher, flags },
            action: None,
        }
    }

    pub fn acting(matcher: GlyphMatcher, flags: LookupFlag, action: Action) -> Self {
        Self {
            predicate: Predicate::Match { matcher, flags },
            action: Some(action),
        }
    }

    pub fn accept() -> Self {
        Self {
            predicate: Predicate::Accept,
            action: None,
        }
    }
}

/// One rule as an ordered list of transition labels.
pub type TransitionPath = Vec<TransitionLabel>;

/// A directed edge of the automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    pub label: TransitionLabel,
    pub target: StateId,
}

impl Transition {
    pub fn new(label: TransitionLabel, target: StateId) -> Self {
        Self { label, target }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.label.predicate
    }

    pub fn action(&self) -> Option<&Action> {
        self.label.action.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphfsm_tables::ClassRange;

    #[test]
    fn glyph_set_sorted_and_deduplicated() {
        let set = GlyphSet::new([9, 3, 9, 5]);
        assert_eq!(set.as_slice(), &[3, 5, 9]);
        assert!(set.contains(5));
        assert!(!set.contains(4));
    }

    #[test]
    fn class_matcher_zero_is_unassigned() {
        let classes = Arc::new(
            GlyphClassDefinition::ranges(vec![ClassRange::new(10, 12, 1)]).unwrap(),
        );
        let one = GlyphMatcher::Class {
            classes: classes.clone(),
            class: 1,
        };
        let zero = GlyphMatcher::Class { classes, class: 0 };
        assert!(one.matches(11));
        assert!(!one.matches(13));
        assert!(zero.matches(13));
        assert!(!zero.matches(10));
    }

    #[test]
    fn label_identity_includes_action() {
        let matcher = GlyphMatcher::Glyph(4);
        let plain = TransitionLabel::matching(matcher.clone(), LookupFlag::empty());
        let acting =
            TransitionLabel::acting(matcher.clone(), LookupFlag::empty(), Action::Delta(1));
        let other_flags = TransitionLabel::matching(matcher, LookupFlag::IGNORE_MARKS);
        assert_ne!(plain, acting);
        assert_ne!(plain, other_flags);
        assert_eq!(plain.clone(), plain);
    }

    #[test]
    fn retaining_actions() {
        let zero = ValueRecord::default();
        let kern = ValueRecord::advance(-40);
        assert!(
            Action::PairAdjust {
                first: kern,
                second: zero
            }
            .retains_last()
        );
        assert!(
            !Action::PairAdjust {
                first: kern,
                second: kern
            }
            .retains_last()
        );
        assert!(!Action::Delta(1).retains_last());
    }
}
