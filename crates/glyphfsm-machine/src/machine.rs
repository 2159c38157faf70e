// State arena and the automaton type.
//
// States live in a `Vec` and refer to each other by `StateId` handle, so the
// graph may share nodes and contain cycles without owning references.

use std::collections::VecDeque;

use glyphfsm_core::ProcessingDirection;

use crate::transition::{Transition, TransitionLabel};

/// Handle of a state inside its [`StateMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        Self(index as u32)
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A state: its outgoing transitions in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    transitions: Vec<Transition>,
}

impl State {
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

/// A glyph automaton: an entry state, every state it owns, and the direction
/// it consumes glyphs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachine {
    states: Vec<State>,
    entry: StateId,
    direction: ProcessingDirection,
}

impl StateMachine {
    /// A machine with a single, transition-less entry state.
    pub fn new(direction: ProcessingDirection) -> Self {
        Self {
            states: vec![State::default()],
            entry: StateId(0),
            direction,
        }
    }

    pub fn entry(&self) -> StateId {
        self.entry
    }

    pub fn direction(&self) -> ProcessingDirection {
        self.direction
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this machine.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn transitions(&self, id: StateId) -> &[Transition] {
        &self.states[id.index()].transitions
    }

    /// Number of states in the arena, reachable or not.
    pub fn arena_len(&self) -> usize {
        self.states.len()
    }

    /// States reachable from the entry, in breadth-first discovery order.
    pub fn reachable_states(&self) -> Vec<StateId> {
        let mut visited = vec![false; self.states.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        visited[self.entry.index()] = true;
        queue.push_back(self.entry);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for transition in self.transitions(id) {
                let target = transition.target.index();
                if !visited[target] {
                    visited[target] = true;
                    queue.push_back(transition.target);
                }
            }
        }
        order
    }

    /// Number of states reachable from the entry.
    pub fn state_count(&self) -> usize {
        self.reachable_states().len()
    }

    /// Number of transitions leaving reachable states.
    pub fn transition_count(&self) -> usize {
        self.reachable_states()
            .into_iter()
            .map(|id| self.transitions(id).len())
            .sum()
    }

    /// Whether the machine has no rules at all.
    pub fn is_empty(&self) -> bool {
        self.transitions(self.entry).is_empty()
    }

    // -- Crate-internal mutation: used by the builder, the optimizer, and
    //    tests that need shapes the builder never produces (cycles).

    pub(crate) fn add_state(&mut self) -> StateId {
        let id = StateId::from_index(self.states.len());
        self.states.push(State::default());
        id
    }

    pub(crate) fn push_transition(&mut self, from: StateId, label: TransitionLabel, target: StateId) {
        debug_assert!(target.index() < self.states.len(), "dangling target {target}");
        self.states[from.index()]
            .transitions
            .push(Transition::new(label, target));
    }

    pub(crate) fn set_direction(&mut self, direction: ProcessingDirection) {
        self.direction = direction;
    }

    /// Assemble a machine from an already-linked arena.
    pub(crate) fn from_parts(
        states: Vec<Vec<Transition>>,
        entry: StateId,
        direction: ProcessingDirection,
    ) -> Self {
        debug_assert!(entry.index() < states.len());
        debug_assert!(
            states
                .iter()
                .flatten()
                .all(|t| t.target.index() < states.len()),
            "dangling target in assembled machine"
        );
        Self {
            states: states
                .into_iter()
                .map(|transitions| State { transitions })
                .collect(),
            entry,
            direction,
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(ProcessingDirection::Forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::GlyphMatcher;
    use glyphfsm_tables::LookupFlag;

    fn glyph(g: u16) -> TransitionLabel {
        TransitionLabel::matching(GlyphMatcher::Glyph(g), LookupFlag::empty())
    }

    #[test]
    fn new_machine_is_empty() {
        let machine = StateMachine::default();
        assert!(machine.is_empty());
        assert_eq!(machine.state_count(), 1);
        assert_eq!(machine.transition_count(), 0);
    }

    #[test]
    fn unreachable_states_are_not_counted() {
        let mut machine = StateMachine::default();
        let a = machine.add_state();
        let _orphan = machine.add_state();
        machine.push_transition(machine.entry(), glyph(1), a);
        assert_eq!(machine.arena_len(), 3);
        assert_eq!(machine.state_count(), 2);
    }

    #[test]
    fn reachability_terminates_on_cycles() {
        let mut machine = StateMachine::default();
        let entry = machine.entry();
        let a = machine.add_state();
        machine.push_transition(entry, glyph(1), a);
        machine.push_transition(a, glyph(2), entry);
        machine.push_transition(a, glyph(3), a);
        assert_eq!(machine.reachable_states(), vec![entry, a]);
        assert_eq!(machine.transition_count(), 3);
    }
}
