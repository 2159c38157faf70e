// Flat plain-old-data tables for a finished automaton.
//
// States and transitions become fixed-size records that can be written out
// byte for byte. Matchers and actions are too varied for a fixed record, so
// they go into deduplicated pools that the records index into.

use bytemuck::{Pod, Zeroable};
use glyphfsm_core::ProcessingDirection;
use glyphfsm_tables::LookupFlag;
use hashbrown::HashMap;

use crate::machine::{StateId, StateMachine};
use crate::transition::{Action, GlyphMatcher, Predicate, Transition, TransitionLabel};

/// A state (8 bytes): a run of `transition_count` transitions starting at
/// `first_transition`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct PackedState {
    pub first_transition: u32,
    pub transition_count: u32,
}

/// A transition (20 bytes).
///
/// - `kind`: [`KIND_PROBE`], [`KIND_MATCH`] or [`KIND_ACCEPT`]
/// - `offset`: probe offset, 0 otherwise
/// - `flags`: raw lookup flag bits
/// - `matcher`: index into the matcher pool, [`NO_INDEX`] for accept
/// - `action`: index into the action pool, [`NO_INDEX`] for none
/// - `target`: target state index
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct PackedTransition {
    pub kind: u8,
    pub _reserved: u8,
    pub offset: i16,
    pub flags: u16,
    pub _padding: u16,
    pub matcher: u32,
    pub action: u32,
    pub target: u32,
}

const _: () = assert!(size_of::<PackedState>() == 8);
const _: () = assert!(size_of::<PackedTransition>() == 20);

pub const KIND_PROBE: u8 = 0;
pub const KIND_MATCH: u8 = 1;
pub const KIND_ACCEPT: u8 = 2;

/// Pool index meaning "absent".
pub const NO_INDEX: u32 = u32::MAX;

/// An automaton flattened into state and transition tables.
///
/// States are numbered breadth-first from the entry, which is always state 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedMachine {
    direction: ProcessingDirection,
    states: Vec<PackedState>,
    transitions: Vec<PackedTransition>,
    matchers: Vec<GlyphMatcher>,
    actions: Vec<Action>,
}

/// Index of `value` in `pool`, adding it on first sight.
fn intern<T: Clone + Eq + std::hash::Hash>(
    pool: &mut Vec<T>,
    index: &mut HashMap<T, u32>,
    value: &T,
) -> u32 {
    if let Some(&i) = index.get(value) {
        return i;
    }
    let i = pool.len() as u32;
    pool.push(value.clone());
    index.insert(value.clone(), i);
    i
}

impl PackedMachine {
    /// Flatten the states reachable from `machine`'s entry.
    pub fn pack(machine: &StateMachine) -> Self {
        let order = machine.reachable_states();
        let mut number = vec![0u32; machine.arena_len()];
        for (i, id) in order.iter().enumerate() {
            number[id.index()] = i as u32;
        }

        let mut states = Vec::with_capacity(order.len());
        let mut transitions = Vec::with_capacity(machine.transition_count());
        let mut matchers = Vec::new();
        let mut matcher_index = HashMap::new();
        let mut actions = Vec::new();
        let mut action_index = HashMap::new();

        for &id in &order {
            states.push(PackedState {
                first_transition: transitions.len() as u32,
                transition_count: machine.transitions(id).len() as u32,
            });
            for transition in machine.transitions(id) {
                let (kind, offset, flags, matcher) = match transition.predicate() {
                    Predicate::Probe {
                        offset,
                        matcher,
                        flags,
                    } => (KIND_PROBE, *offset, *flags, Some(matcher)),
                    Predicate::Match { matcher, flags } => (KIND_MATCH, 0, *flags, Some(matcher)),
                    Predicate::Accept => (KIND_ACCEPT, 0, LookupFlag::empty(), None),
                };
                transitions.push(PackedTransition {
                    kind,
                    _reserved: 0,
                    offset,
                    flags: flags.to_bits(),
                    _padding: 0,
                    matcher: matcher.map_or(NO_INDEX, |m| intern(&mut matchers, &mut matcher_index, m)),
                    action: transition
                        .action()
                        .map_or(NO_INDEX, |a| intern(&mut actions, &mut action_index, a)),
                    target: number[transition.target.index()],
                });
            }
        }

        log::debug!(
            "packed automaton: {} states, {} transitions, {} matchers, {} actions",
            states.len(),
            transitions.len(),
            matchers.len(),
            actions.len()
        );
        Self {
            direction: machine.direction(),
            states,
            transitions,
            matchers,
            actions,
        }
    }

    pub fn direction(&self) -> ProcessingDirection {
        self.direction
    }

    pub fn states(&self) -> &[PackedState] {
        &self.states
    }

    pub fn transitions(&self) -> &[PackedTransition] {
        &self.transitions
    }

    pub fn matchers(&self) -> &[GlyphMatcher] {
        &self.matchers
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The state table as raw bytes.
    pub fn state_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.states)
    }

    /// The transition table as raw bytes.
    pub fn transition_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transitions)
    }

    /// Rebuild the graph form.
    pub fn unpack(&self) -> StateMachine {
        let arena = self
            .states
            .iter()
            .map(|state| {
                let first = state.first_transition as usize;
                let run = &self.transitions[first..first + state.transition_count as usize];
                run.iter().map(|t| self.unpack_transition(t)).collect()
            })
            .collect();
        StateMachine::from_parts(arena, StateId::from_index(0), self.direction)
    }

    fn unpack_transition(&self, packed: &PackedTransition) -> Transition {
        let flags = LookupFlag::from_bits_truncate(packed.flags);
        let matcher = || self.matchers[packed.matcher as usize].clone();
        let predicate = match packed.kind {
            KIND_PROBE => Predicate::Probe {
                offset: packed.offset,
                matcher: matcher(),
                flags,
            },
            KIND_MATCH => Predicate::Match {
                matcher: matcher(),
                flags,
            },
            _ => Predicate::Accept,
        };
        let action = (packed.action != NO_INDEX).then(|| self.actions[packed.action as usize].clone());
        Transition::new(
            TransitionLabel { predicate, action },
            StateId::from_index(packed.target as usize),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateMachineBuilder;
    use crate::compare::machines_equal;

    fn sample() -> StateMachine {
        let flags = LookupFlag::IGNORE_MARKS;
        let mut builder = StateMachineBuilder::new();
        builder.add_path(&[
            TransitionLabel::probe(-1, GlyphMatcher::Glyph(3), flags),
            TransitionLabel::acting(GlyphMatcher::Glyph(1), flags, Action::Delta(4)),
            TransitionLabel::accept(),
        ]);
        builder.add_path(&[
            TransitionLabel::matching(GlyphMatcher::Glyph(1), flags),
            TransitionLabel::acting(GlyphMatcher::Glyph(2), flags, Action::Delta(4)),
            TransitionLabel::accept(),
        ]);
        builder.into_state_machine()
    }

    #[test]
    fn record_sizes() {
        let packed = PackedMachine::pack(&sample());
        assert_eq!(packed.state_bytes().len(), packed.states().len() * 8);
        assert_eq!(packed.transition_bytes().len(), packed.transitions().len() * 20);
    }

    #[test]
    fn pools_are_deduplicated() {
        let packed = PackedMachine::pack(&sample());
        // glyphs 3, 1, 2; one shared delta
        assert_eq!(packed.matchers().len(), 3);
        assert_eq!(packed.actions().len(), 1);
        let accepts = packed
            .transitions()
            .iter()
            .filter(|t| t.kind == KIND_ACCEPT)
            .count();
        assert_eq!(accepts, 2);
    }

    #[test]
    fn entry_is_state_zero() {
        let packed = PackedMachine::pack(&sample());
        assert_eq!(packed.states()[0].first_transition, 0);
        assert_eq!(packed.states()[0].transition_count, 2);
    }

    #[test]
    fn unpack_restores_behavior() {
        let machine = sample();
        let packed = PackedMachine::pack(&machine);
        assert!(machines_equal(&machine, &packed.unpack()));
    }

    #[test]
    fn bytes_cast_back() {
        let packed = PackedMachine::pack(&sample());
        let raw = packed.transition_bytes().to_vec();
        let restored: Vec<PackedTransition> = raw
            .chunks_exact(size_of::<PackedTransition>())
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(restored, packed.transitions());
    }
}
