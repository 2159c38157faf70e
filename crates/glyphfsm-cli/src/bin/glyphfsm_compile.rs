// glyphfsm-compile: Run a compile job file.
//
// Compiles the job's lookups into one automaton and runs the remaining
// directives. Prints a summary; with `pack` and an output prefix, writes the
// packed state and transition tables next to it.
//
// Usage:
//   glyphfsm-compile [OPTIONS] JOB.json
//
// Options:
//   -o, --output PREFIX   Write PREFIX.states.bin and PREFIX.transitions.bin
//                         (requires the `pack` directive)
//   -h, --help            Print help
//
// Set RUST_LOG=debug for build and optimizer details.

use std::io::{self, Write};

use glyphfsm_cli::{Job, format_sequence};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (output, args) = glyphfsm_cli::parse_option(&args, "--output", "-o");

    if glyphfsm_cli::wants_help(&args) || args.is_empty() {
        println!("glyphfsm-compile: Run a compile job file.");
        println!();
        println!("Usage: glyphfsm-compile [OPTIONS] JOB.json");
        println!();
        println!("Options:");
        println!("  -o, --output PREFIX   Write PREFIX.states.bin and PREFIX.transitions.bin");
        println!("                        (requires the `pack` directive)");
        println!("  -h, --help            Print this help");
        return;
    }

    let job = Job::load(args[0].as_ref()).unwrap_or_else(|e| glyphfsm_cli::fatal(&e.to_string()));
    job.check_output(output.as_deref())
        .unwrap_or_else(|e| glyphfsm_cli::fatal(&e.to_string()));
    let outcome = job.run().unwrap_or_else(|e| glyphfsm_cli::fatal(&e.to_string()));

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    let machine = outcome.compiled.machine();
    let _ = writeln!(out, "lookups:     {}", job.lookups.len());
    let _ = writeln!(out, "paths:       {}", outcome.compiled.path_count());
    let _ = writeln!(out, "direction:   {}", machine.direction());
    let _ = writeln!(out, "states:      {}", machine.state_count());
    let _ = writeln!(out, "transitions: {}", machine.transition_count());
    if let Some(report) = outcome.compiled.optimize_report() {
        let _ = writeln!(
            out,
            "optimized:   {} -> {} states in {} rounds",
            report.states_before, report.states_after, report.rounds
        );
    }
    if job.has(glyphfsm_cli::Directive::Verify) {
        let _ = writeln!(out, "verified:    ok");
    }

    if let Some((sequence, report)) = &outcome.simulation {
        let _ = writeln!(out, "applied:     {}", report.applied);
        let _ = writeln!(out, "output:      {}", format_sequence(sequence));
    }

    if let Some(packed) = &outcome.packed {
        let _ = writeln!(
            out,
            "packed:      {} + {} bytes, {} matchers, {} actions",
            packed.state_bytes().len(),
            packed.transition_bytes().len(),
            packed.matchers().len(),
            packed.actions().len()
        );
        if let Some(prefix) = output {
            for (suffix, bytes) in [
                ("states.bin", packed.state_bytes()),
                ("transitions.bin", packed.transition_bytes()),
            ] {
                let path = format!("{prefix}.{suffix}");
                std::fs::write(&path, bytes)
                    .unwrap_or_else(|e| glyphfsm_cli::fatal(&format!("failed to write {path}: {e}")));
                let _ = writeln!(out, "wrote:       {path}");
            }
        }
    }
}
