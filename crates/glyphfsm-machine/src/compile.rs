// The end-to-end pipeline: lookups to a finished automaton.

use glyphfsm_tables::TransformationTable;
use serde::{Deserialize, Serialize};

use crate::CompileError;
use crate::builder::StateMachineBuilder;
use crate::compare::machines_equal;
use crate::expander::RuleExpander;
use crate::machine::StateMachine;
use crate::optimizer::{OptimizeReport, Optimizer};
use crate::packed::PackedMachine;

/// Compile pipeline options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Minimize the built automaton.
    pub optimize: bool,
    /// Check the result with the comparator: it must match the unoptimized
    /// build, and optimizing it again must change nothing.
    pub verify: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            verify: false,
        }
    }
}

/// A finished automaton with what it took to build it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledMachine {
    machine: StateMachine,
    path_count: usize,
    report: Option<OptimizeReport>,
}

impl CompiledMachine {
    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn into_machine(self) -> StateMachine {
        self.machine
    }

    /// Number of rule paths merged into the automaton.
    pub fn path_count(&self) -> usize {
        self.path_count
    }

    /// Optimizer summary, if the automaton was optimized.
    pub fn optimize_report(&self) -> Option<&OptimizeReport> {
        self.report.as_ref()
    }

    pub fn pack(&self) -> PackedMachine {
        PackedMachine::pack(&self.machine)
    }
}

/// Compile `lookups`, highest priority first, into one automaton.
///
/// Every lookup must share a processing direction; the first one to need a
/// different direction fails the build.
pub fn compile(
    lookups: &[TransformationTable],
    options: &CompileOptions,
) -> Result<CompiledMachine, CompileError> {
    let mut builder = StateMachineBuilder::new();
    for (lookup_index, table) in lookups.iter().enumerate() {
        let kind = table.kind().kind_name();
        let direction = table.kind().natural_direction();
        builder
            .set_processing_direction(direction)
            .map_err(|source| CompileError::Build {
                lookup_index,
                kind,
                source,
            })?;
        let paths = RuleExpander::new(direction)
            .expand(table)
            .map_err(|source| CompileError::Expand {
                lookup_index,
                kind,
                source,
            })?;
        log::trace!("lookup {lookup_index} ({kind}): {} paths", paths.len());
        for path in &paths {
            builder.add_path(path);
        }
    }

    let path_count = builder.path_count();
    let built = builder.into_state_machine();
    if !options.optimize {
        if options.verify && !machines_equal(&built, &optimized_copy(&built)) {
            return Err(CompileError::VerificationFailed {
                reason: "built automaton differs from its minimized form",
            });
        }
        return Ok(CompiledMachine {
            machine: built,
            path_count,
            report: None,
        });
    }

    let mut machine = built.clone();
    let report = Optimizer::new().optimize(&mut machine);
    if options.verify {
        if !machines_equal(&built, &machine) {
            return Err(CompileError::VerificationFailed {
                reason: "optimized automaton differs from the built automaton",
            });
        }
        if optimized_copy(&machine) != machine {
            return Err(CompileError::VerificationFailed {
                reason: "optimized automaton is not a fixed point of the optimizer",
            });
        }
    }
    log::debug!(
        "compiled {} lookups into {} paths, {} states",
        lookups.len(),
        path_count,
        report.states_after
    );
    Ok(CompiledMachine {
        machine,
        path_count,
        report: Some(report),
    })
}

fn optimized_copy(machine: &StateMachine) -> StateMachine {
    let mut copy = machine.clone();
    Optimizer::new().optimize(&mut copy);
    copy
}
