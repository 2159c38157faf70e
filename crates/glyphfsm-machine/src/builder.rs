// State machine builder: trie-style merging of transition paths.

use glyphfsm_core::ProcessingDirection;

use crate::BuildError;
use crate::machine::StateMachine;
use crate::transition::TransitionLabel;

/// Merges transition paths into one automaton rooted at a single entry state.
///
/// A new path follows an existing transition only when that transition is
/// the last alternative of its state and carries an identical label. Where
/// it cannot, the rest of the path is appended after every existing
/// alternative. Paths therefore share prefixes with the paths registered
/// just before them, and the depth-first order of accepting paths is always
/// registration order: a rule registered earlier keeps priority over every
/// rule registered later, even when a later rule shares a leading step with
/// an earlier one that an intermediate rule does not. Overlapping but
/// different predicates are not unioned: at run time the first registered
/// alternative that matches wins.
#[derive(Debug, Clone, Default)]
pub struct StateMachineBuilder {
    machine: StateMachine,
    path_count: usize,
}

impl StateMachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the processing direction.
    ///
    /// Succeeds before the first path is added, or when `direction` equals the
    /// direction already in force. Otherwise the build cannot continue.
    pub fn set_processing_direction(
        &mut self,
        direction: ProcessingDirection,
    ) -> Result<(), BuildError> {
        let fixed = self.machine.direction();
        if self.path_count > 0 && fixed != direction {
            return Err(BuildError::InvalidDirectionChange {
                fixed,
                requested: direction,
            });
        }
        self.machine.set_direction(direction);
        Ok(())
    }

    /// Merge one path into the automaton.
    ///
    /// An empty path adds nothing and does not lock the direction.
    pub fn add_path(&mut self, path: &[TransitionLabel]) {
        if path.is_empty() {
            return;
        }
        let mut current = self.machine.entry();
        let mut shared = 0;
        for label in path {
            let existing = self
                .machine
                .transitions(current)
                .last()
                .filter(|t| t.label == *label)
                .map(|t| t.target);
            current = match existing {
                Some(target) => {
                    shared += 1;
                    target
                }
                None => {
                    let target = self.machine.add_state();
                    self.machine.push_transition(current, label.clone(), target);
                    target
                }
            };
        }
        self.path_count += 1;
        log::trace!(
            "path {} merged: {} of {} steps shared",
            self.path_count,
            shared,
            path.len()
        );
    }

    /// Number of non-empty paths merged so far.
    pub fn path_count(&self) -> usize {
        self.path_count
    }

    pub fn direction(&self) -> ProcessingDirection {
        self.machine.direction()
    }

    /// The automaton built so far. Repeated calls observe the same machine.
    pub fn state_machine(&self) -> &StateMachine {
        &self.machine
    }

    /// Finish building and take the automaton.
    pub fn into_state_machine(self) -> StateMachine {
        log::debug!(
            "built automaton: {} paths, {} states, {} direction",
            self.path_count,
            self.machine.arena_len(),
            self.machine.direction()
        );
        self.machine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::{Action, GlyphMatcher};
    use glyphfsm_core::ProcessingDirection::{Backward, Forward};
    use glyphfsm_tables::LookupFlag;

    fn glyph(g: u16) -> TransitionLabel {
        TransitionLabel::matching(GlyphMatcher::Glyph(g), LookupFlag::empty())
    }

    fn replace(g: u16, delta: i16) -> TransitionLabel {
        TransitionLabel::acting(GlyphMatcher::Glyph(g), LookupFlag::empty(), Action::Delta(delta))
    }

    #[test]
    fn shared_prefix_is_not_duplicated() {
        let mut builder = StateMachineBuilder::new();
        builder.add_path(&[glyph(1), glyph(2), TransitionLabel::accept()]);
        builder.add_path(&[glyph(1), glyph(3), TransitionLabel::accept()]);

        let machine = builder.state_machine();
        // entry, after 1, after 1-2, after 1-2-accept, after 1-3, after 1-3-accept
        assert_eq!(machine.state_count(), 6);
        assert_eq!(machine.transitions(machine.entry()).len(), 1);
        let after_one = machine.transitions(machine.entry())[0].target;
        assert_eq!(machine.transitions(after_one).len(), 2);
    }

    #[test]
    fn identical_paths_merge_completely() {
        let mut builder = StateMachineBuilder::new();
        let path = vec![glyph(1), replace(2, 5), TransitionLabel::accept()];
        builder.add_path(&path);
        let before = builder.state_machine().state_count();
        builder.add_path(&path);
        assert_eq!(builder.state_machine().state_count(), before);
        assert_eq!(builder.path_count(), 2);
    }

    #[test]
    fn later_path_does_not_jump_an_intermediate_branch() {
        let mut builder = StateMachineBuilder::new();
        builder.add_path(&[glyph(10), glyph(11), TransitionLabel::accept()]);
        builder.add_path(&[replace(10, 100), TransitionLabel::accept()]);
        builder.add_path(&[glyph(10), glyph(12), TransitionLabel::accept()]);

        let machine = builder.state_machine();
        let entry = machine.transitions(machine.entry());
        assert_eq!(entry.len(), 3);
        assert_eq!(entry[0].label, glyph(10));
        assert_eq!(entry[1].label, replace(10, 100));
        assert_eq!(entry[2].label, glyph(10));
        assert_ne!(entry[0].target, entry[2].target);
        assert_eq!(machine.transitions(entry[0].target).len(), 1);
    }

    #[test]
    fn consecutive_paths_share_the_last_branch() {
        let mut builder = StateMachineBuilder::new();
        builder.add_path(&[glyph(1), glyph(2), TransitionLabel::accept()]);
        builder.add_path(&[glyph(1), glyph(3), TransitionLabel::accept()]);
        builder.add_path(&[glyph(1), glyph(3), glyph(4), TransitionLabel::accept()]);

        let machine = builder.state_machine();
        assert_eq!(machine.transitions(machine.entry()).len(), 1);
        let after_one = machine.transitions(machine.entry())[0].target;
        let branches = machine.transitions(after_one);
        assert_eq!(branches.len(), 2);
        assert_eq!(machine.transitions(branches[1].target).len(), 2);
    }

    #[test]
    fn same_predicate_different_action_branches() {
        let mut builder = StateMachineBuilder::new();
        builder.add_path(&[replace(1, 1), TransitionLabel::accept()]);
        builder.add_path(&[replace(1, 2), TransitionLabel::accept()]);
        let machine = builder.state_machine();
        let entry = machine.transitions(machine.entry());
        assert_eq!(entry.len(), 2);
        // first registered comes first
        assert_eq!(entry[0].action(), Some(&Action::Delta(1)));
        assert_eq!(entry[1].action(), Some(&Action::Delta(2)));
    }

    #[test]
    fn empty_path_is_a_no_op() {
        let mut builder = StateMachineBuilder::new();
        builder.add_path(&[]);
        assert_eq!(builder.path_count(), 0);
        assert!(builder.state_machine().is_empty());
        // direction is still free
        assert!(builder.set_processing_direction(Backward).is_ok());
        assert_eq!(builder.direction(), Backward);
    }

    #[test]
    fn direction_change_before_paths() {
        let mut builder = StateMachineBuilder::new();
        builder.set_processing_direction(Backward).unwrap();
        builder.set_processing_direction(Forward).unwrap();
        assert_eq!(builder.direction(), Forward);
    }

    #[test]
    fn direction_locked_after_path() {
        let mut builder = StateMachineBuilder::new();
        builder.set_processing_direction(Backward).unwrap();
        builder.add_path(&[glyph(1), TransitionLabel::accept()]);

        assert!(builder.set_processing_direction(Backward).is_ok());
        let err = builder.set_processing_direction(Forward).unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidDirectionChange {
                fixed: Backward,
                requested: Forward
            }
        );
        assert_eq!(builder.direction(), Backward);
    }

    #[test]
    fn default_direction_locks_to_forward() {
        let mut builder = StateMachineBuilder::new();
        builder.add_path(&[glyph(1), TransitionLabel::accept()]);
        assert!(builder.set_processing_direction(Backward).is_err());
    }

    #[test]
    fn state_machine_is_idempotent() {
        let mut builder = StateMachineBuilder::new();
        builder.add_path(&[glyph(1), TransitionLabel::accept()]);
        let first = builder.state_machine().clone();
        let second = builder.state_machine().clone();
        assert_eq!(first, second);
        assert_eq!(first.entry(), second.entry());
        assert_eq!(builder.into_state_machine(), first);
    }
}
