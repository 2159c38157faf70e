// Order-preserving state minimization.
//
// Moore-style partition refinement: start with every reachable state in one
// class, then split classes by signature (own class, outgoing labels in
// priority order, target classes) until the class count stops changing.
// The result is the coarsest partition where merged states have identical
// transition lists up to equivalent targets, which is exactly "same future
// behavior" for a simulator that tries transitions in order.
//
// Candidate states are bucketed by a 64-bit key, but a bucket only ever
// groups states whose signatures compare equal, so key collisions cost time
// and never correctness.

use std::collections::VecDeque;
use std::hash::BuildHasher;

use hashbrown::{DefaultHashBuilder, HashMap};

use crate::machine::{StateId, StateMachine};
use crate::transition::{Transition, TransitionLabel};

/// What a state looks like to one refinement round.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateSignature<'a> {
    /// Class of the state in the previous round.
    pub class: usize,
    /// Outgoing labels in priority order with the previous-round class of
    /// their targets.
    pub transitions: Vec<(&'a TransitionLabel, usize)>,
}

/// Bucket key for equivalence candidates.
///
/// Keys only need to agree for equal signatures; unequal signatures may share
/// a key.
pub trait EquivalenceKey {
    fn key(&self, signature: &StateSignature<'_>) -> u64;
}

/// The default key: a hash of the whole signature.
#[derive(Clone, Default)]
pub struct HashKey {
    hasher: DefaultHashBuilder,
}

impl EquivalenceKey for HashKey {
    fn key(&self, signature: &StateSignature<'_>) -> u64 {
        self.hasher.hash_one(signature)
    }
}

/// Summary of one optimization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeReport {
    pub states_before: usize,
    pub states_after: usize,
    pub rounds: usize,
}

impl OptimizeReport {
    pub fn merged(&self) -> usize {
        self.states_before - self.states_after
    }
}

/// State minimizer.
#[derive(Debug, Clone, Default)]
pub struct Optimizer<K = HashKey> {
    keyer: K,
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: EquivalenceKey> Optimizer<K> {
    /// An optimizer bucketing candidates with a custom key.
    pub fn with_key(keyer: K) -> Self {
        Self { keyer }
    }

    /// Replace `machine` with its minimized equivalent.
    ///
    /// Unreachable states are dropped and the survivors are renumbered in
    /// breadth-first order from the entry, so optimizing twice yields the
    /// same machine.
    pub fn optimize(&self, machine: &mut StateMachine) -> OptimizeReport {
        let states = machine.reachable_states();
        let mut position = vec![usize::MAX; machine.arena_len()];
        for (i, id) in states.iter().enumerate() {
            position[id.index()] = i;
        }

        let mut class = vec![0usize; states.len()];
        let mut class_count = 1;
        let mut rounds = 0;
        loop {
            rounds += 1;
            let (next, next_count) = self.refine(machine, &states, &position, &class);
            log::trace!("refinement round {rounds}: {class_count} -> {next_count} classes");
            class = next;
            if next_count == class_count {
                break;
            }
            class_count = next_count;
        }

        let report = OptimizeReport {
            states_before: states.len(),
            states_after: class_count,
            rounds,
        };
        *machine = rebuild(machine, &states, &position, &class, class_count);
        log::debug!(
            "optimized automaton: {} -> {} states in {} rounds",
            report.states_before,
            report.states_after,
            report.rounds
        );
        report
    }

    /// One refinement round. Class ids are assigned in state order.
    fn refine(
        &self,
        machine: &StateMachine,
        states: &[StateId],
        position: &[usize],
        class: &[usize],
    ) -> (Vec<usize>, usize) {
        let mut buckets: HashMap<u64, Vec<(StateSignature<'_>, usize)>> = HashMap::new();
        let mut next = Vec::with_capacity(states.len());
        let mut count = 0;
        for (i, &id) in states.iter().enumerate() {
            let signature = StateSignature {
                class: class[i],
                transitions: machine
                    .transitions(id)
                    .iter()
                    .map(|t| (&t.label, class[position[t.target.index()]]))
                    .collect(),
            };
            let bucket = buckets.entry(self.keyer.key(&signature)).or_default();
            let assigned = match bucket.iter().find(|(other, _)| *other == signature) {
                Some(&(_, existing)) => existing,
                None => {
                    bucket.push((signature, count));
                    count += 1;
                    count - 1
                }
            };
            next.push(assigned);
        }
        (next, count)
    }
}

/// Build the quotient machine, one state per class, numbered breadth-first.
fn rebuild(
    machine: &StateMachine,
    states: &[StateId],
    position: &[usize],
    class: &[usize],
    class_count: usize,
) -> StateMachine {
    // First member of each class stands for all of them.
    let mut representative = vec![None; class_count];
    for (i, &id) in states.iter().enumerate() {
        representative[class[i]].get_or_insert(id);
    }
    let class_of = |id: StateId| class[position[id.index()]];

    let entry_class = class_of(machine.entry());
    let mut number = vec![usize::MAX; class_count];
    let mut order = Vec::with_capacity(class_count);
    let mut queue = VecDeque::new();
    number[entry_class] = 0;
    queue.push_back(entry_class);
    while let Some(c) = queue.pop_front() {
        order.push(c);
        let Some(rep) = representative[c] else {
            continue;
        };
        for transition in machine.transitions(rep) {
            let target = class_of(transition.target);
            if number[target] == usize::MAX {
                number[target] = order.len() + queue.len();
                queue.push_back(target);
            }
        }
    }

    let arena = order
        .iter()
        .map(|&c| {
            representative[c]
                .map(|rep| {
                    machine
                        .transitions(rep)
                        .iter()
                        .map(|t| {
                            Transition::new(
                                t.label.clone(),
                                StateId::from_index(number[class_of(t.target)]),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();
    StateMachine::from_parts(arena, StateId::from_index(0), machine.direction())
}
