// Processing direction shared by the builder, expander and simulator.

use serde::{Deserialize, Serialize};

/// The order in which an automaton consumes a glyph run.
///
/// Almost every lookup is processed `Forward` (logical order, head to tail).
/// Reverse-chaining substitutions are the exception and run `Backward`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingDirection {
    /// Head to tail.
    #[default]
    Forward,
    /// Tail to head.
    Backward,
}

impl std::fmt::Display for ProcessingDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingDirection::Forward => f.write_str("forward"),
            ProcessingDirection::Backward => f.write_str("backward"),
        }
    }
}
