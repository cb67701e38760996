//! Demonstrates checkpoint/rollback bracketing around failing scripts.
//!
//! Run with: cargo run --example scene_rollback

use std::sync::Arc;
use std::time::Duration;

use scene_script_sandbox::prelude::*;

#[tokio::main]
async fn main() {
    let scene = SceneGraph::new();
    scene.add_object("floor", [0.0, 0.0, 0.0]);

    let sandbox = SceneScriptSandbox::new(
        SandboxConfig::builder()
            .timeout(Duration::from_millis(500))
            .build(),
        CapabilityManifest::default(),
        Arc::new(scene.clone()),
    );

    println!("before: {} objects", scene.object_count());

    // Mutates the scene and then raises; everything is undone.
    let result = sandbox
        .execute("scene.add_object(\"a\")\nscene.add_object(\"b\")\nmissing()")
        .await;
    println!("raise -> success={} ({} objects remain)", result.success, scene.object_count());

    // Burns the clock until the deadline fires; also undone.
    let result = sandbox
        .execute("scene.add_object(\"c\")\nfor _ in range(10 ** 8):\n    pass")
        .await;
    println!("timeout -> success={} ({} objects remain)", result.success, scene.object_count());

    // A clean run commits.
    let result = sandbox.execute("scene.add_object(\"lamp\", 0.0, 0.0, 2.0)").await;
    println!("commit -> success={} ({} objects remain)", result.success, scene.object_count());
}
