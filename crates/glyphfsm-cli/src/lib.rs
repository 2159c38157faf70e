// glyphfsm-cli: job files and shared utilities for the command-line tools.

pub mod directives;

use std::path::{Path, PathBuf};
use std::process;

use glyphfsm_core::{GlyphId, GlyphSequence};
use glyphfsm_machine::compile::CompiledMachine;
use glyphfsm_machine::packed::PackedMachine;
use glyphfsm_machine::{
    CompileError, CompileOptions, SimulationReport, Simulator, SimulatorOptions, compile,
};
use glyphfsm_tables::{GlyphClassDefinition, TransformationTable};
use serde::{Deserialize, Serialize};

pub use directives::{Directive, DirectiveViolation, validate_directives};

/// Error raised while loading or running a job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid job file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid directives: {}", join_violations(.0))]
    Directives(Vec<DirectiveViolation>),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("an output prefix was given but the job has no `pack` directive")]
    OutputWithoutPack,
}

fn join_violations(violations: &[DirectiveViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A compile job as read from JSON.
///
/// Lookups are listed highest priority first and are validated while the
/// file is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    pub directives: Vec<Directive>,
    #[serde(default)]
    pub options: SimulatorOptions,
    /// Glyph categories for lookup flags (1 base, 2 ligature, 3 mark,
    /// 4 component).
    #[serde(default)]
    pub glyph_categories: Option<GlyphClassDefinition>,
    pub lookups: Vec<TransformationTable>,
    #[serde(default)]
    pub input: Vec<GlyphId>,
}

impl Job {
    /// Parse and validate a job.
    pub fn from_json(json: &str) -> Result<Self, JobError> {
        let job: Job = serde_json::from_str(json)?;
        job.validate()?;
        Ok(job)
    }

    /// Read, parse and validate a job file.
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let json = std::fs::read_to_string(path).map_err(|source| JobError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), JobError> {
        let violations = validate_directives(&self.directives, self.input.len());
        if violations.is_empty() {
            Ok(())
        } else {
            Err(JobError::Directives(violations))
        }
    }

    /// Check that an output prefix, if any, has packed tables to receive.
    pub fn check_output(&self, output: Option<&str>) -> Result<(), JobError> {
        if output.is_some() && !self.has(Directive::Pack) {
            return Err(JobError::OutputWithoutPack);
        }
        Ok(())
    }

    pub fn has(&self, directive: Directive) -> bool {
        self.directives.contains(&directive)
    }

    /// Compile options implied by the directives.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            optimize: self.has(Directive::Optimize),
            verify: self.has(Directive::Verify),
        }
    }

    /// Run the job's lookups over `sequence`.
    pub fn simulate(&self, compiled: &CompiledMachine, sequence: &mut GlyphSequence) -> SimulationReport {
        let mut simulator = Simulator::new(compiled.machine()).with_options(self.options);
        if let Some(categories) = &self.glyph_categories {
            simulator = simulator.with_categories(categories);
        }
        simulator.run(sequence)
    }

    /// Run every directive.
    pub fn run(&self) -> Result<JobOutcome, JobError> {
        self.validate()?;
        let compiled = compile(&self.lookups, &self.compile_options())?;
        log::info!(
            "compiled {} lookups: {} states, {} transitions",
            self.lookups.len(),
            compiled.machine().state_count(),
            compiled.machine().transition_count()
        );

        let simulation = self.has(Directive::Simulate).then(|| {
            let mut sequence = GlyphSequence::from_ids(&self.input);
            let report = self.simulate(&compiled, &mut sequence);
            (sequence, report)
        });
        let packed = self.has(Directive::Pack).then(|| compiled.pack());
        Ok(JobOutcome {
            compiled,
            simulation,
            packed,
        })
    }
}

/// What running a job produced.
#[derive(Debug)]
pub struct JobOutcome {
    pub compiled: CompiledMachine,
    /// The transformed input and its report, for `simulate`.
    pub simulation: Option<(GlyphSequence, SimulationReport)>,
    pub packed: Option<PackedMachine>,
}

/// Format a sequence as `id@x_offset,y_offset+x_advance` items, dropping
/// zero positions.
pub fn format_sequence(sequence: &GlyphSequence) -> String {
    sequence
        .glyphs()
        .iter()
        .map(|g| {
            if g.position.is_zero() {
                g.id.to_string()
            } else {
                let p = g.position;
                format!("{}@{},{}+{}", g.id, p.x_offset, p.y_offset, p.x_advance)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse whitespace-separated glyph ids.
pub fn parse_glyphs(line: &str) -> Result<Vec<GlyphId>, String> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<GlyphId>()
                .map_err(|e| format!("invalid glyph id {token:?}: {e}"))
        })
        .collect()
}

/// Parse a `--name=VALUE` or `-n VALUE` argument from command line args.
///
/// Returns `(value, remaining_args)`.
pub fn parse_option(args: &[String], long: &str, short: &str) -> (Option<String>, Vec<String>) {
    let mut value = None;
    let mut remaining = Vec::new();
    let mut skip_next = false;
    let prefix = format!("{long}=");

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(val) = arg.strip_prefix(&prefix) {
            value = Some(val.to_string());
        } else if arg == long || arg == short {
            if i + 1 < args.len() {
                value = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                fatal(&format!("{arg} requires a value"));
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (value, remaining)
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = r#"{
        "directives": ["compile", "optimize", "verify", "simulate", "pack"],
        "options": {"max_match_depth": 64},
        "lookups": [
            {"kind": {"Ligature": {
                "coverage": {"List": {"glyphs": [10]}},
                "ligature_sets": [[{"glyph": 100, "components": [11]}]]
            }}},
            {"kind": {"SinglePosition": {
                "coverage": {"Range": {"ranges": [
                    {"first_coverage_index": 0, "min_glyph_id": 20, "max_glyph_id": 22}
                ]}},
                "values": {"Shared": {"x_advance": 15}}
            }}}
        ],
        "input": [10, 11, 21, 5]
    }"#;

    #[test]
    fn job_runs_every_directive() {
        let job = Job::from_json(JOB).unwrap();
        assert_eq!(job.options.max_match_depth, 64);
        assert_eq!(
            job.compile_options(),
            CompileOptions {
                optimize: true,
                verify: true
            }
        );

        let outcome = job.run().unwrap();
        let (sequence, report) = outcome.simulation.unwrap();
        assert_eq!(sequence.ids(), vec![100, 21, 5]);
        assert_eq!(report.applied, 2);
        assert_eq!(format_sequence(&sequence), "100 21@0,0+15 5");
        assert!(outcome.packed.is_some());
        assert!(outcome.compiled.optimize_report().is_some());
    }

    #[test]
    fn directive_violations_fail_the_load() {
        let json = r#"{"directives": ["simulate", "pack"], "lookups": []}"#;
        let err = Job::from_json(json).unwrap_err();
        let JobError::Directives(violations) = &err else {
            panic!("unexpected error {err}");
        };
        assert_eq!(violations.len(), 3);
        assert!(err.to_string().starts_with("invalid directives: "));
    }

    #[test]
    fn malformed_lookup_fails_the_load() {
        let json = r#"{
            "directives": ["compile"],
            "lookups": [{"kind": {"SingleDelta": {
                "coverage": {"List": {"glyphs": [4, 2]}},
                "delta": 1
            }}}]
        }"#;
        assert!(matches!(Job::from_json(json), Err(JobError::Json(_))));
    }

    #[test]
    fn output_prefix_needs_pack() {
        let unpacked = Job::from_json(r#"{"directives": ["compile"], "lookups": []}"#).unwrap();
        assert!(unpacked.check_output(None).is_ok());
        let err = unpacked.check_output(Some("out")).unwrap_err();
        assert!(matches!(err, JobError::OutputWithoutPack));

        let packed = Job::from_json(r#"{"directives": ["compile", "pack"], "lookups": []}"#).unwrap();
        assert!(packed.check_output(Some("out")).is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = r#"{"directives": ["compile"], "lookups": [], "script": "latn"}"#;
        assert!(Job::from_json(json).is_err());
    }

    #[test]
    fn glyph_parsing() {
        assert_eq!(parse_glyphs(" 1 2  300 ").unwrap(), vec![1, 2, 300]);
        assert!(parse_glyphs("1 x").is_err());
        assert!(parse_glyphs("70000").is_err());
    }

    #[test]
    fn option_parsing() {
        let args: Vec<String> = ["job.json", "-o", "out", "--verbose"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (value, rest) = parse_option(&args, "--output", "-o");
        assert_eq!(value.as_deref(), Some("out"));
        assert_eq!(rest, vec!["job.json", "--verbose"]);

        let args = vec!["--output=bin/x".to_string()];
        assert_eq!(parse_option(&args, "--output", "-o").0.as_deref(), Some("bin/x"));
    }
}
