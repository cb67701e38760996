//! Failure taxonomy and diagnostic helpers for the sandbox.

use std::time::Duration;

use thiserror::Error;

/// The ways a single execution call can fail.
///
/// Every variant is reported inside an
/// [`ExecutionResult`](crate::sandbox::executor::ExecutionResult); candidate
/// code never raises through the caller's frame. The `Rejected` variant means
/// the code was refused before running (edit the request); the others mean it
/// ran and went wrong (edit the generated code).
#[derive(Error, Debug)]
pub enum ExecutionFailure {
    /// Static validation refused the code; it never reached the interpreter.
    #[error("code rejected before running: {reason}")]
    Rejected {
        /// The validator's reason, naming the violated rule.
        reason: String,
    },

    /// The execution exceeded the configured wall-clock timeout.
    #[error("execution timed out after {timeout:?}")]
    Timeout {
        /// The configured timeout that elapsed.
        timeout: Duration,
    },

    /// The candidate code raised an exception while running.
    #[error("error during code execution: {message}")]
    Script {
        /// Exception summary, e.g. "ZeroDivisionError: division by zero".
        message: String,
        /// The full formatted traceback.
        traceback: String,
    },

    /// The host bridge failed to take or restore a checkpoint.
    #[error("host checkpoint failure: {0}")]
    Host(#[source] anyhow::Error),

    /// The execution worker itself failed (e.g. panicked).
    #[error("executor worker failed: {0}")]
    Worker(String),
}

impl ExecutionFailure {
    /// Check if this failure is a pre-execution rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ExecutionFailure::Rejected { .. })
    }

    /// Check if this failure is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutionFailure::Timeout { .. })
    }

    /// Check if this failure is an exception raised by the candidate code.
    pub fn is_script_error(&self) -> bool {
        matches!(self, ExecutionFailure::Script { .. })
    }
}

/// Pull the final `SomeError: message` line out of a Python traceback.
///
/// RustPython prints the exception type and message as the last non-indented
/// line of the traceback; that line is what the user should see first.
/// Returns `None` when no such line is found.
pub fn exception_summary(traceback: &str) -> Option<String> {
    let mut summary = None;
    for line in traceback.lines() {
        if line.is_empty() || line.starts_with(' ') || line.starts_with("Traceback") {
            continue;
        }
        if looks_like_exception(line) {
            summary = Some(line.trim().to_string());
        }
    }
    summary
}

/// Check if a line looks like the `Type: message` head of a Python exception.
fn looks_like_exception(line: &str) -> bool {
    let exception_suffixes = ["Error", "Exception", "Warning"];
    let standalone_exceptions = [
        "KeyboardInterrupt",
        "SystemExit",
        "StopIteration",
        "GeneratorExit",
    ];

    let first_char = line.chars().next();
    if !first_char.map(|c| c.is_ascii_uppercase()).unwrap_or(false) {
        return false;
    }

    let head = line.split(':').next().unwrap_or(line).trim();
    if standalone_exceptions.contains(&head) {
        return true;
    }
    exception_suffixes
        .iter()
        .any(|suffix| head.ends_with(suffix))
}

/// Heuristic hint for the most common mistakes in generated scene scripts.
///
/// Matches on the exception message only; returns `None` when no hint
/// applies.
pub fn hint_for(message: &str) -> Option<&'static str> {
    if message.contains("'NoneType' object has no attribute") {
        return Some(
            "hint: a lookup returned no object; check the object name before accessing attributes",
        );
    }
    if message.contains("is not defined") {
        return Some(
            "hint: only the allow-listed modules, builtins, and capability objects exist in the sandbox namespace",
        );
    }
    if message.contains("is not available in the sandbox") {
        return Some("hint: that builtin is denied by the sandbox policy");
    }
    None
}
