//! Core acceptance-and-execution engine.

use std::sync::Arc;
use std::time::Instant;

use crate::error::{exception_summary, hint_for, ExecutionFailure};
use crate::host::{HostBridge, HostCheckpoint};
use crate::sandbox::config::SandboxConfig;
use crate::sandbox::io::CapturedOutput;
use crate::sandbox::manifest::CapabilityManifest;
use crate::sandbox::vm;
use crate::validator::{CodeValidator, ValidationVerdict};

/// Result of one execution call.
///
/// Every path through the executor produces one of these; candidate-code
/// failures never surface as Rust errors.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Whether the code ran to completion and was committed.
    pub success: bool,
    /// Human-readable outcome, distinguishing "rejected before running"
    /// from "ran but failed".
    pub message: String,
    /// Output captured from the redirected stdout/stderr stream
    /// (buffer-so-far on failure paths).
    pub captured_output: String,
    /// Classification of the failure path, when there is one.
    pub failure: Option<ExecutionFailure>,
}

impl ExecutionResult {
    /// Check if the execution was committed.
    pub fn is_success(&self) -> bool {
        self.success
    }

    fn committed(captured_output: String) -> Self {
        Self {
            success: true,
            message: "code executed successfully".to_string(),
            captured_output,
            failure: None,
        }
    }

    fn failed(failure: ExecutionFailure, message: String, captured_output: String) -> Self {
        Self {
            success: false,
            message,
            captured_output,
            failure: Some(failure),
        }
    }
}

/// A sandboxed execution environment for scene scripts.
///
/// Holds the static pieces: config, capability manifest, validator, and the
/// host bridge. Each [`execute`](Self::execute) call owns its namespace, output
/// buffer, and checkpoint exclusively and discards them at the end; the
/// caller is expected to run one execution at a time against a given host.
pub struct SceneScriptSandbox {
    config: SandboxConfig,
    manifest: Arc<CapabilityManifest>,
    validator: CodeValidator,
    host: Arc<dyn HostBridge>,
}

impl SceneScriptSandbox {
    /// Create a new sandbox over the given host bridge.
    pub fn new(
        config: SandboxConfig,
        manifest: CapabilityManifest,
        host: Arc<dyn HostBridge>,
    ) -> Self {
        Self {
            config,
            manifest: Arc::new(manifest),
            validator: CodeValidator::new(),
            host,
        }
    }

    /// Statically screen candidate code without executing it.
    pub fn validate(&self, code: &str) -> ValidationVerdict {
        self.validator.validate(code)
    }

    /// Validate and execute candidate code against the host.
    ///
    /// On any failure (rejection, timeout, exception, host fault) the
    /// checkpoint taken before the run is restored and the result reports
    /// the failure with whatever output was captured up to that point.
    pub async fn execute(&self, code: &str) -> ExecutionResult {
        let verdict = self.validator.validate(code);
        if !verdict.accepted {
            tracing::info!(reason = %verdict.reason, "candidate code rejected");
            let failure = ExecutionFailure::Rejected {
                reason: verdict.reason,
            };
            let message = failure.to_string();
            return ExecutionResult::failed(failure, message, String::new());
        }

        let checkpoint = match self.host.begin_checkpoint() {
            Ok(checkpoint) => checkpoint,
            Err(err) => {
                tracing::error!(error = %err, "failed to take host checkpoint");
                let failure = ExecutionFailure::Host(err);
                let message = failure.to_string();
                return ExecutionResult::failed(failure, message, String::new());
            }
        };

        let output = CapturedOutput::new(self.config.max_output_bytes);
        let started = Instant::now();

        let worker = {
            let code = code.to_string();
            let source_name = self.config.source_name.clone();
            let manifest = Arc::clone(&self.manifest);
            let host = Arc::clone(&self.host);
            let output = output.clone();
            tokio::task::spawn_blocking(move || {
                vm::run_candidate(&code, &source_name, &manifest, host.as_ref(), output)
            })
        };

        let timeout = self.config.timeout;
        tokio::select! {
            joined = worker => match joined {
                Ok(outcome) => match outcome.error {
                    None => {
                        self.host.refresh();
                        tracing::info!(elapsed = ?started.elapsed(), "execution committed");
                        ExecutionResult::committed(output.to_string_lossy())
                    }
                    Some(trace) => {
                        let failure = self.script_failure(trace);
                        let message = self.script_message(&failure);
                        self.fail_and_rollback(checkpoint, failure, message, &output)
                    }
                },
                Err(join_err) => {
                    let failure = ExecutionFailure::Worker(join_err.to_string());
                    let message = failure.to_string();
                    self.fail_and_rollback(checkpoint, failure, message, &output)
                }
            },
            _ = tokio::time::sleep(timeout) => {
                // The worker thread cannot be force-killed; it is abandoned
                // and the host state is restored underneath it.
                let failure = ExecutionFailure::Timeout { timeout };
                let message = failure.to_string();
                self.fail_and_rollback(checkpoint, failure, message, &output)
            }
        }
    }

    /// Build the `Script` failure, preferring the traceback's final
    /// exception line over the raw message.
    fn script_failure(&self, trace: vm::ScriptTrace) -> ExecutionFailure {
        let message = exception_summary(&trace.traceback).unwrap_or(trace.message);
        ExecutionFailure::Script {
            message,
            traceback: trace.traceback,
        }
    }

    /// Format the user-facing message for a script failure: summary line,
    /// optional heuristic hint, then the full traceback.
    fn script_message(&self, failure: &ExecutionFailure) -> String {
        let ExecutionFailure::Script { message, traceback } = failure else {
            return failure.to_string();
        };
        let mut formatted = failure.to_string();
        if let Some(hint) = hint_for(message) {
            formatted.push('\n');
            formatted.push_str(hint);
        }
        if !traceback.is_empty() {
            formatted.push_str("\n\n");
            formatted.push_str(traceback);
        }
        formatted
    }

    /// Restore the pre-execution checkpoint and assemble the failed result.
    fn fail_and_rollback(
        &self,
        checkpoint: HostCheckpoint,
        failure: ExecutionFailure,
        message: String,
        output: &CapturedOutput,
    ) -> ExecutionResult {
        tracing::warn!(%failure, "execution failed, rolling back host state");
        if let Err(err) = self.host.restore_checkpoint(checkpoint) {
            tracing::error!(error = %err, "host checkpoint restore failed");
            let failure = ExecutionFailure::Host(err);
            let message = format!("{message}\n{failure}");
            return ExecutionResult::failed(failure, message, output.to_string_lossy());
        }
        ExecutionResult::failed(failure, message, output.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::scene::SceneGraph;

    fn sandbox(scene: &SceneGraph) -> SceneScriptSandbox {
        SceneScriptSandbox::new(
            SandboxConfig::default(),
            CapabilityManifest::default(),
            Arc::new(scene.clone()),
        )
    }

    #[tokio::test]
    async fn test_rejected_code_short_circuits() {
        let scene = SceneGraph::new();
        let sandbox = sandbox(&scene);

        let result = sandbox.execute("import os").await;
        assert!(!result.is_success());
        assert!(result.message.contains("rejected before running"));
        assert!(result.message.contains("import"));
        assert!(result.captured_output.is_empty());
        assert!(result.failure.unwrap().is_rejection());
        // Rejection happens before any checkpoint or refresh.
        assert_eq!(scene.revision(), 0);
    }

    #[tokio::test]
    async fn test_validate_passthrough() {
        let scene = SceneGraph::new();
        let sandbox = sandbox(&scene);
        assert!(sandbox.validate("x = 1").accepted);
        assert!(!sandbox.validate("eval('x')").accepted);
    }
}
