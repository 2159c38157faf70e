// glyphfsm-simulate: Apply a job's lookups to glyph runs from stdin.
//
// Compiles the job (directives other than `optimize` are ignored), then
// reads one glyph run per line as whitespace-separated glyph ids and prints
// the transformed run. Positioned glyphs print as id@x_offset,y_offset+advance.
//
// Usage:
//   glyphfsm-simulate [OPTIONS] JOB.json
//
// Options:
//   -r, --report   Also print the number of applied rules per line
//   -h, --help     Print help

use std::io::{self, BufRead, Write};

use glyphfsm_cli::{Directive, Job, format_sequence, parse_glyphs};
use glyphfsm_core::GlyphSequence;
use glyphfsm_machine::{CompileOptions, compile};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if glyphfsm_cli::wants_help(&args) || args.is_empty() {
        println!("glyphfsm-simulate: Apply a job's lookups to glyph runs from stdin.");
        println!();
        println!("Usage: glyphfsm-simulate [OPTIONS] JOB.json");
        println!();
        println!("Reads whitespace-separated glyph ids, one run per line.");
        println!();
        println!("Options:");
        println!("  -r, --report   Also print the number of applied rules per line");
        println!("  -h, --help     Print this help");
        return;
    }

    let show_report = args.iter().any(|a| a == "-r" || a == "--report");
    let Some(path) = args.iter().find(|a| !a.starts_with('-')) else {
        glyphfsm_cli::fatal("no job file given");
    };

    let job = Job::load(path.as_ref()).unwrap_or_else(|e| glyphfsm_cli::fatal(&e.to_string()));
    let options = CompileOptions {
        optimize: job.has(Directive::Optimize),
        verify: false,
    };
    let compiled = compile(&job.lookups, &options).unwrap_or_else(|e| glyphfsm_cli::fatal(&e.to_string()));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error reading stdin: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let glyphs = match parse_glyphs(&line) {
            Ok(glyphs) => glyphs,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };

        let mut sequence = GlyphSequence::from_ids(&glyphs);
        let report = job.simulate(&compiled, &mut sequence);
        if show_report {
            let _ = writeln!(out, "{}\t[{} applied]", format_sequence(&sequence), report.applied);
        } else {
            let _ = writeln!(out, "{}", format_sequence(&sequence));
        }
    }
}
