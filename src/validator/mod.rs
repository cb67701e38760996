//! Static pre-execution screening of candidate code.
//!
//! The validator parses candidate source into an AST and walks every node,
//! refusing the known sandbox-escape primitives before anything runs:
//! imports, dynamic evaluation, dunder attribute access, and scope escapes,
//! plus two hardening rules (literal `while True:` loops and reflective
//! dunder lookups). Everything else is allowed through; the namespace
//! boundary is allow-listed at execution time while the tree itself is only
//! deny-listed here.

pub mod rules;
mod walk;

use rustpython_parser::{ast, Parse};

pub use rules::Violation;

/// The outcome of validating one piece of candidate code.
///
/// Terminal: a rejected verdict short-circuits execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    /// Whether the code may be executed.
    pub accepted: bool,
    /// The violated rule, or an informational note on acceptance.
    pub reason: String,
}

impl ValidationVerdict {
    fn accepted() -> Self {
        Self {
            accepted: true,
            reason: "code appears safe".to_string(),
        }
    }

    fn rejected(reason: String) -> Self {
        Self {
            accepted: false,
            reason,
        }
    }
}

/// Static safety screen for candidate code.
///
/// Pure: the verdict depends only on the source text and the fixed deny
/// lists in [`rules`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeValidator;

impl CodeValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Parse and screen `code`, without executing it.
    pub fn validate(&self, code: &str) -> ValidationVerdict {
        let suite = match ast::Suite::parse(code, "<candidate>") {
            Ok(suite) => suite,
            Err(err) => {
                tracing::debug!(error = %err, "candidate code failed to parse");
                return ValidationVerdict::rejected(format!("code could not be parsed: {err}"));
            }
        };

        match walk::walk_suite(&suite) {
            Ok(()) => ValidationVerdict::accepted(),
            Err(violation) => {
                tracing::debug!(%violation, "candidate code rejected");
                ValidationVerdict::rejected(violation.to_string())
            }
        }
    }
}
