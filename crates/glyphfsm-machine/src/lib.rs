//! Glyph state machine compiler and simulator.
//!
//! This crate turns an ordered list of layout lookups into a single merged
//! automaton, minimizes it, and executes it over glyph runs.
//!
//! # Architecture
//!
//! - [`transition`] -- predicates, actions and transitions
//! - [`machine`] -- the state arena and automaton type
//! - [`expander`] -- lookup payloads to transition paths
//! - [`builder`] -- trie-style merging of paths into one automaton
//! - [`optimizer`] -- order-preserving state minimization
//! - [`compare`] -- automaton equality by synchronized traversal
//! - [`config`] -- match configuration (explicit DFS stack)
//! - [`simulator`] -- execution over a glyph sequence
//! - [`packed`] -- flat plain-old-data tables for embedding
//! - [`compile`] -- the end-to-end pipeline

pub mod builder;
pub mod compare;
pub mod compile;
pub mod config;
pub mod expander;
pub mod machine;
pub mod optimizer;
pub mod packed;
pub mod simulator;
pub mod transition;

use glyphfsm_core::ProcessingDirection;

pub use builder::StateMachineBuilder;
pub use compare::machines_equal;
pub use compile::{CompileOptions, CompiledMachine, compile};
pub use expander::RuleExpander;
pub use machine::{StateId, StateMachine};
pub use optimizer::{EquivalenceKey, OptimizeReport, Optimizer};
pub use packed::PackedMachine;
pub use simulator::{SimulationReport, Simulator, SimulatorOptions};
pub use transition::{Action, GlyphMatcher, Predicate, Transition, TransitionLabel, TransitionPath};

/// Error raised while merging paths into an automaton.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("cannot change processing direction from {fixed} to {requested} once paths exist")]
    InvalidDirectionChange {
        fixed: ProcessingDirection,
        requested: ProcessingDirection,
    },
}

/// Error raised while expanding a lookup into transition paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    #[error("{kind} must be processed {required}, not {requested}")]
    DirectionMismatch {
        kind: &'static str,
        required: ProcessingDirection,
        requested: ProcessingDirection,
    },
}

/// Error raised by the compile pipeline, tagged with the offending lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("lookup {lookup_index} ({kind}): {source}")]
    Expand {
        lookup_index: usize,
        kind: &'static str,
        #[source]
        source: ExpandError,
    },
    #[error("lookup {lookup_index} ({kind}): {source}")]
    Build {
        lookup_index: usize,
        kind: &'static str,
        #[source]
        source: BuildError,
    },
    #[error("verification failed: {reason}")]
    VerificationFailed { reason: &'static str },
}

/// Maximum number of search steps the simulator spends at one cursor
/// position before giving up on a match.
pub const MAX_LOOP_COUNT: u32 = 100_000;
