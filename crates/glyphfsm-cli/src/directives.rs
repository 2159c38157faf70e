// Job directives and the dependencies between them.

use serde::{Deserialize, Serialize};

/// One step a job asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directive {
    Compile,
    Optimize,
    Verify,
    Simulate,
    Pack,
}

impl Directive {
    pub fn name(self) -> &'static str {
        match self {
            Directive::Compile => "compile",
            Directive::Optimize => "optimize",
            Directive::Verify => "verify",
            Directive::Simulate => "simulate",
            Directive::Pack => "pack",
        }
    }

    /// Directives that must also be present for this one to run.
    pub fn requires(self) -> &'static [Directive] {
        match self {
            Directive::Compile => &[],
            Directive::Optimize => &[Directive::Compile],
            Directive::Verify => &[Directive::Optimize],
            Directive::Simulate => &[Directive::Compile],
            Directive::Pack => &[Directive::Compile],
        }
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A broken directive constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveViolation {
    #[error("no directives given")]
    Empty,
    #[error("`{0}` is listed more than once")]
    Duplicate(Directive),
    #[error("`{directive}` requires `{required}`")]
    MissingDependency {
        directive: Directive,
        required: Directive,
    },
    #[error("`simulate` requires a non-empty input")]
    EmptyInput,
}

/// Check every constraint and report all violations, in directive order.
pub fn validate_directives(directives: &[Directive], input_len: usize) -> Vec<DirectiveViolation> {
    let mut violations = Vec::new();
    if directives.is_empty() {
        violations.push(DirectiveViolation::Empty);
    }
    for (i, &directive) in directives.iter().enumerate() {
        if directives[..i].contains(&directive) {
            if !violations.contains(&DirectiveViolation::Duplicate(directive)) {
                violations.push(DirectiveViolation::Duplicate(directive));
            }
            continue;
        }
        for &required in directive.requires() {
            if !directives.contains(&required) {
                violations.push(DirectiveViolation::MissingDependency {
                    directive,
                    required,
                });
            }
        }
        if directive == Directive::Simulate && input_len == 0 {
            violations.push(DirectiveViolation::EmptyInput);
        }
    }
    violations
}
