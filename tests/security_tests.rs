//! Security and end-to-end tests for the scene script sandbox.
//!
//! These cover the acceptance properties of the core: escape attempts are
//! rejected before running, honest scripts run with captured output, and
//! every failure path leaves the host scene exactly as it was.

use std::sync::Arc;
use std::time::Duration;

use scene_script_sandbox::prelude::*;

/// Helper to build a sandbox over a fresh in-memory scene.
fn scene_sandbox() -> (SceneScriptSandbox, SceneGraph) {
    let scene = SceneGraph::new();
    let sandbox = SceneScriptSandbox::new(
        SandboxConfig::builder()
            .timeout(Duration::from_secs(10))
            .build(),
        CapabilityManifest::default(),
        Arc::new(scene.clone()),
    );
    (sandbox, scene)
}

// ── Validator: rejections ────────────────────────────────────────────────────

#[test]
fn import_statement_rejected() {
    let validator = CodeValidator::new();
    let verdict = validator.validate("import os");
    assert!(!verdict.accepted);
    assert!(verdict.reason.contains("import"));
}

#[test]
fn from_import_rejected() {
    let verdict = CodeValidator::new().validate("from subprocess import run");
    assert!(!verdict.accepted);
    assert!(verdict.reason.contains("import"));
}

#[test]
fn denied_functions_rejected_by_name() {
    let validator = CodeValidator::new();
    for name in ["eval", "exec", "open", "compile", "input"] {
        let verdict = validator.validate(&format!("{name}('x')"));
        assert!(!verdict.accepted, "{name} should be rejected");
        assert!(
            verdict.reason.contains(name),
            "reason should name '{name}', got: {}",
            verdict.reason
        );
    }
}

#[test]
fn dunder_attribute_rejected() {
    let verdict = CodeValidator::new().validate("x.__class__.__mro__");
    assert!(!verdict.accepted);
    assert!(verdict.reason.contains("dunder"));
}

#[test]
fn while_true_literal_rejected_without_running() {
    let verdict = CodeValidator::new().validate("while True:\n    pass");
    assert!(!verdict.accepted);
}

#[test]
fn reflective_dunder_access_rejected() {
    let verdict = CodeValidator::new().validate("getattr(x, '__globals__')");
    assert!(!verdict.accepted);
    assert!(verdict.reason.contains("__globals__"));
}

#[test]
fn safe_arithmetic_accepted() {
    let verdict = CodeValidator::new().validate("total = sum(i * i for i in range(10))");
    assert!(verdict.accepted);
    assert_eq!(verdict.reason, "code appears safe");
}

// ── Executor: end-to-end ─────────────────────────────────────────────────────

#[tokio::test]
async fn hello_world_end_to_end() {
    let (sandbox, scene) = scene_sandbox();
    let before = scene.objects();

    let result = sandbox.execute("print(\"hello\")").await;
    assert!(result.is_success(), "unexpected failure: {}", result.message);
    assert_eq!(result.captured_output, "hello\n");
    assert_eq!(scene.objects(), before);
}

#[tokio::test]
async fn arithmetic_output_captured() {
    let (sandbox, _scene) = scene_sandbox();

    let result = sandbox.execute("print(2 + 2)").await;
    assert!(result.is_success(), "unexpected failure: {}", result.message);
    assert_eq!(result.captured_output, "4\n");
}

#[tokio::test]
async fn import_os_end_to_end_rejected() {
    let (sandbox, scene) = scene_sandbox();

    let result = sandbox.execute("import os").await;
    assert!(!result.is_success());
    assert!(result.message.contains("import"));
    assert!(result.captured_output.is_empty());
    // Rejection short-circuits: no run, no commit.
    assert_eq!(scene.revision(), 0);
}

#[tokio::test]
async fn scene_object_created_through_capability() {
    let (sandbox, scene) = scene_sandbox();

    let code = "scene.add_object(\"cube\", 1.0, 2.0, 3.0)\nprint(scene.object_count())";
    let result = sandbox.execute(code).await;
    assert!(result.is_success(), "unexpected failure: {}", result.message);
    assert_eq!(scene.object_count(), 1);
    assert_eq!(result.captured_output, "1\n");

    // No hidden dedup: the same code adds exactly one more.
    let result = sandbox.execute(code).await;
    assert!(result.is_success());
    assert_eq!(scene.object_count(), 2);
    assert_eq!(result.captured_output, "2\n");
}

#[tokio::test]
async fn successful_run_refreshes_host() {
    let (sandbox, scene) = scene_sandbox();
    assert_eq!(scene.revision(), 0);

    let result = sandbox.execute("x = 1").await;
    assert!(result.is_success());
    assert_eq!(scene.revision(), 1);
}

#[tokio::test]
async fn runtime_exception_rolls_back_scene() {
    let (sandbox, scene) = scene_sandbox();
    scene.add_object("existing", [0.0, 0.0, 0.0]);
    let before = scene.objects();

    // Mutates the scene, then raises.
    let code = "scene.add_object(\"cube\")\n1 / 0";
    let result = sandbox.execute(code).await;

    assert!(!result.is_success());
    assert!(
        result.message.to_lowercase().contains("division"),
        "expected division error, got: {}",
        result.message
    );
    assert!(result.failure.unwrap().is_script_error());
    assert_eq!(scene.objects(), before, "scene must be restored exactly");
}

#[tokio::test]
async fn output_before_exception_is_reported() {
    let (sandbox, _scene) = scene_sandbox();

    let result = sandbox.execute("print(\"before\")\n1 / 0").await;
    assert!(!result.is_success());
    assert!(result.captured_output.contains("before\n"));
}

#[tokio::test]
async fn name_outside_namespace_fails_with_hint() {
    let (sandbox, scene) = scene_sandbox();

    let result = sandbox.execute("bpy.ops.mesh.primitive_cube_add()").await;
    assert!(!result.is_success());
    assert!(result.message.contains("hint"));
    assert_eq!(scene.object_count(), 0);
}

#[tokio::test]
async fn timeout_aborts_and_rolls_back() {
    let scene = SceneGraph::new();
    let sandbox = SceneScriptSandbox::new(
        SandboxConfig::builder()
            .timeout(Duration::from_millis(250))
            .build(),
        CapabilityManifest::default(),
        Arc::new(scene.clone()),
    );
    let before = scene.objects();

    let started = std::time::Instant::now();
    let code = "scene.add_object(\"cube\")\nfor _ in range(10 ** 8):\n    pass";
    let result = sandbox.execute(code).await;
    let elapsed = started.elapsed();

    assert!(!result.is_success());
    assert!(
        result.message.contains("timed out"),
        "expected timeout, got: {}",
        result.message
    );
    assert!(result.failure.unwrap().is_timeout());
    // Bounded margin: the deadline plus scheduling slack, not the loop's
    // natural runtime.
    assert!(
        elapsed < Duration::from_secs(5),
        "timeout took too long: {elapsed:?}"
    );
    assert_eq!(scene.objects(), before, "scene must be restored after timeout");
}

#[tokio::test]
async fn allowed_builtin_rebinding_works() {
    let (sandbox, _scene) = scene_sandbox();

    let code = "f = abs\nprint(f(-1))";
    let result = sandbox.execute(code).await;
    assert!(result.is_success(), "unexpected failure: {}", result.message);
    assert_eq!(result.captured_output, "1\n");
}

#[tokio::test]
async fn aliased_denied_builtin_fails_at_runtime() {
    let (sandbox, scene) = scene_sandbox();
    scene.add_object("existing", [0.0; 3]);
    let before = scene.objects();

    // Referencing `eval` without calling it slips past the static call
    // rule; the restricted namespace and runtime guards stop it instead.
    let code = "scene.add_object(\"cube\")\nf = eval\nf(\"1 + 1\")";
    let result = sandbox.execute(code).await;

    assert!(!result.is_success());
    assert!(result.failure.unwrap().is_script_error());
    assert_eq!(scene.objects(), before, "scene must be restored");
}

#[tokio::test]
async fn allow_listed_builtins_resolved_into_namespace() {
    let (sandbox, _scene) = scene_sandbox();

    let result = sandbox.execute("print(sorted([3, 1, 2]))").await;
    assert!(result.is_success(), "unexpected failure: {}", result.message);
    assert_eq!(result.captured_output, "[1, 2, 3]\n");
}

#[tokio::test]
async fn allowed_math_module_usable() {
    let (sandbox, _scene) = scene_sandbox();

    let result = sandbox.execute("print(math.floor(3.7))").await;
    assert!(result.is_success(), "unexpected failure: {}", result.message);
    assert_eq!(result.captured_output, "3\n");
}

#[tokio::test]
async fn move_capability_mutates_and_commits() {
    let (sandbox, scene) = scene_sandbox();
    scene.add_object("cube", [0.0, 0.0, 0.0]);

    let result = sandbox
        .execute("scene.move_object(\"cube\", 1.0, 0.0, -2.0)")
        .await;
    assert!(result.is_success(), "unexpected failure: {}", result.message);
    assert_eq!(scene.objects()[0].position, [1.0, 0.0, -2.0]);
}
