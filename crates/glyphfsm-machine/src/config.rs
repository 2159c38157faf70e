// Match configuration: the explicit DFS stack one rule search runs on.

use crate::MAX_LOOP_COUNT;
use crate::machine::StateId;

/// Depth-first search state for matching rules at one cursor position.
///
/// Depth `d` holds the state being explored and the index of the transition
/// tried there; `transition_stack[d]` doubles as the resume point when the
/// search backtracks into depth `d`. Glyphs consumed by match transitions and
/// glyphs hit by probes are kept on their own stacks so popping a depth also
/// drops what it recorded.
pub struct MatchConfig {
    pub buffer_size: usize,
    pub stack_depth: usize,

    /// State at each stack depth.
    pub state_stack: Vec<StateId>,
    /// Transition index at each stack depth.
    pub transition_stack: Vec<usize>,

    /// Sequence index of each consumed glyph, in consumption order.
    pub consumed_stack: Vec<usize>,
    /// `(offset, sequence index)` of each successful probe.
    pub probe_stack: Vec<(i16, usize)>,
}

impl MatchConfig {
    /// `buffer_size` bounds the path length a search may follow.
    ///
    /// Every descent costs a search step, so depths beyond `MAX_LOOP_COUNT`
    /// are unreachable and the buffer is capped there.
    pub fn new(buffer_size: usize) -> Self {
        let buffer_size = buffer_size.clamp(1, MAX_LOOP_COUNT as usize);
        Self {
            buffer_size,
            stack_depth: 0,
            state_stack: vec![StateId::from_index(0); buffer_size],
            transition_stack: vec![0; buffer_size],
            consumed_stack: Vec::with_capacity(buffer_size),
            probe_stack: Vec::new(),
        }
    }

    /// Start a new search from `entry`.
    #[inline]
    pub fn reset(&mut self, entry: StateId) {
        self.stack_depth = 0;
        self.state_stack[0] = entry;
        self.transition_stack[0] = 0;
        self.consumed_stack.clear();
        self.probe_stack.clear();
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.stack_depth + 1 >= self.buffer_size
    }

    /// Record that transition `index` was taken at the current depth and
    /// descend into `target`.
    #[inline]
    pub fn push(&mut self, index: usize, target: StateId) {
        self.transition_stack[self.stack_depth] = index;
        self.stack_depth += 1;
        self.state_stack[self.stack_depth] = target;
        self.transition_stack[self.stack_depth] = 0;
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> StateId {
        self.state_stack[self.stack_depth]
    }

    /// Transitions taken so far, as `(state, transition index)` pairs from
    /// the entry down to the current depth (exclusive).
    pub fn taken(&self) -> impl Iterator<Item = (StateId, usize)> + '_ {
        (0..self.stack_depth).map(|d| (self.state_stack[d], self.transition_stack[d]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_reset() {
        let mut config = MatchConfig::new(4);
        let entry = StateId::from_index(0);
        config.reset(entry);
        config.push(2, StateId::from_index(5));
        config.consumed_stack.push(7);
        assert_eq!(config.stack_depth, 1);
        assert_eq!(config.state(), StateId::from_index(5));
        assert_eq!(config.taken().collect::<Vec<_>>(), vec![(entry, 2)]);

        config.reset(entry);
        assert_eq!(config.stack_depth, 0);
        assert!(config.consumed_stack.is_empty());
        assert_eq!(config.taken().count(), 0);
    }

    #[test]
    fn buffer_is_capped_at_the_step_limit() {
        let config = MatchConfig::new(usize::MAX);
        assert_eq!(config.buffer_size, MAX_LOOP_COUNT as usize);
        assert_eq!(config.state_stack.len(), MAX_LOOP_COUNT as usize);
        assert_eq!(MatchConfig::new(0).buffer_size, 1);
    }

    #[test]
    fn full_at_buffer_end() {
        let mut config = MatchConfig::new(2);
        config.reset(StateId::from_index(0));
        assert!(!config.is_full());
        config.push(0, StateId::from_index(1));
        assert!(config.is_full());
    }
}
