// Automaton equality by synchronized breadth-first traversal.

use std::collections::VecDeque;

use hashbrown::HashSet;

use crate::machine::{StateId, StateMachine};

/// Whether two automata behave identically.
///
/// Walks both machines from their entry states in lockstep. Paired states
/// must have the same number of outgoing transitions with pairwise-equal
/// labels in the same order; their targets are paired in turn. Each
/// `(left, right)` pair is visited once, so the walk terminates on cyclic
/// machines and still notices a left state reached with two different right
/// partners.
pub fn machines_equal(left: &StateMachine, right: &StateMachine) -> bool {
    if left.direction() != right.direction() {
        return false;
    }

    let mut visited: HashSet<(StateId, StateId)> = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert((left.entry(), right.entry()));
    queue.push_back((left.entry(), right.entry()));

    while let Some((l, r)) = queue.pop_front() {
        let lt = left.transitions(l);
        let rt = right.transitions(r);
        if lt.len() != rt.len() {
            log::trace!("{l} and {r} differ in transition count");
            return false;
        }
        for (a, b) in lt.iter().zip(rt) {
            if a.label != b.label {
                log::trace!("{l} and {r} differ in a transition label");
                return false;
            }
            let pair = (a.target, b.target);
            if visited.insert(pair) {
                queue.push_back(pair);
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::Optimizer;
    use crate::transition::{Action, GlyphMatcher, TransitionLabel};
    use glyphfsm_core::ProcessingDirection;
    use glyphfsm_tables::LookupFlag;

    fn glyph(g: u16) -> TransitionLabel {
        TransitionLabel::matching(GlyphMatcher::Glyph(g), LookupFlag::empty())
    }

    fn cycle() -> StateMachine {
        let mut machine = StateMachine::default();
        let entry = machine.entry();
        let a = machine.add_state();
        let b = machine.add_state();
        machine.push_transition(entry, glyph(1), a);
        machine.push_transition(a, glyph(2), b);
        machine.push_transition(b, glyph(3), entry);
        machine.push_transition(b, glyph(4), b);
        machine
    }

    #[test]
    fn cyclic_machine_equals_itself() {
        let machine = cycle();
        assert!(machines_equal(&machine, &machine));
    }

    #[test]
    fn unrolled_cycle_is_equal() {
        // entry -1-> a -2-> entry, against entry -1-> a -2-> c -1-> a
        let mut folded = StateMachine::default();
        let entry = folded.entry();
        let a = folded.add_state();
        folded.push_transition(entry, glyph(1), a);
        folded.push_transition(a, glyph(2), entry);

        let mut unrolled = StateMachine::default();
        let entry = unrolled.entry();
        let a = unrolled.add_state();
        let c = unrolled.add_state();
        unrolled.push_transition(entry, glyph(1), a);
        unrolled.push_transition(a, glyph(2), c);
        unrolled.push_transition(c, glyph(1), a);

        assert!(machines_equal(&folded, &unrolled));
    }

    #[test]
    fn different_labels_are_unequal() {
        let left = cycle();
        let mut right = cycle();
        let entry = right.entry();
        let extra = right.add_state();
        right.push_transition(entry, glyph(9), extra);
        assert!(!machines_equal(&left, &right));

        let mut acting = StateMachine::default();
        let end = acting.add_state();
        acting.push_transition(
            acting.entry(),
            TransitionLabel::acting(GlyphMatcher::Glyph(1), LookupFlag::empty(), Action::Delta(1)),
            end,
        );
        let mut plain = StateMachine::default();
        let end = plain.add_state();
        plain.push_transition(plain.entry(), glyph(1), end);
        assert!(!machines_equal(&acting, &plain));
    }

    #[test]
    fn transition_order_is_significant() {
        let mut left = StateMachine::default();
        let end = left.add_state();
        left.push_transition(left.entry(), glyph(1), end);
        left.push_transition(left.entry(), glyph(2), end);
        let mut right = StateMachine::default();
        let end = right.add_state();
        right.push_transition(right.entry(), glyph(2), end);
        right.push_transition(right.entry(), glyph(1), end);
        assert!(!machines_equal(&left, &right));
    }

    #[test]
    fn direction_is_compared() {
        let forward = StateMachine::new(ProcessingDirection::Forward);
        let backward = StateMachine::new(ProcessingDirection::Backward);
        assert!(!machines_equal(&forward, &backward));
    }

    #[test]
    fn optimized_machine_equals_original() {
        let original = cycle();
        let mut optimized = original.clone();
        Optimizer::new().optimize(&mut optimized);
        assert!(machines_equal(&original, &optimized));
    }
}
