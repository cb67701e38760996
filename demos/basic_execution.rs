//! Basic example of validating and executing a scene script.
//!
//! Run with: cargo run --example basic_execution

use std::sync::Arc;
use std::time::Duration;

use scene_script_sandbox::prelude::*;

#[tokio::main]
async fn main() {
    let scene = SceneGraph::new();
    let sandbox = SceneScriptSandbox::new(
        SandboxConfig::builder()
            .timeout(Duration::from_secs(5))
            .build(),
        CapabilityManifest::default(),
        Arc::new(scene.clone()),
    );

    println!("=== Test 1: Simple arithmetic ===");
    let result = sandbox.execute("print(1 + 1)").await;
    println!("success: {}", result.success);
    println!("output: {}", result.captured_output);

    println!("=== Test 2: Scene manipulation ===");
    let code = r#"
for i in range(3):
    scene.add_object("cube_" + str(i), i * 2.0, 0.0, 0.0)
print("objects:", scene.object_count())
"#;
    let result = sandbox.execute(code).await;
    println!("success: {}", result.success);
    println!("output: {}", result.captured_output);
    println!("host sees {} objects, revision {}", scene.object_count(), scene.revision());

    println!("=== Test 3: Script error rolls back ===");
    let result = sandbox.execute("scene.add_object(\"doomed\")\n1 / 0").await;
    println!("success: {}", result.success);
    println!("message:\n{}", result.message);
    println!("host still sees {} objects", scene.object_count());
}
